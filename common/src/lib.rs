//! Shared library for the tman template tools.
//!
//! The heart of the crate is [`replicate`]: a recursive directory copy that
//! renames path segments carrying the hidden-file marker (see
//! [`rename::DOTS_LONG`]) and rewrites symbolic links whose targets fall
//! inside the tree being copied. Everything else (template enumeration, the
//! project origin record, the confirmation prompt, subtree removal) is glue
//! around that engine.

mod config;
pub mod origin;
pub mod prompt;
pub mod rename;
pub mod replicate;
pub mod rm;
pub mod templates;
#[cfg(test)]
pub(crate) mod testutils;

pub use config::OutputConfig;
pub use rename::{rename_name, Direction, DOTS_LONG};
pub use replicate::{replicate, retarget};
pub use templates::SHARED_SUBTREE;

fn init_tracing(output: &OutputConfig) {
    let default_level = match output.verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Entry helper for the binaries: sets up tracing, builds a current-thread
/// runtime (all traversal is strictly sequential) and runs `func` on it.
///
/// Returns `None` on failure after reporting the error; the caller decides the
/// exit code.
pub fn run<Fut, Summary>(output: &OutputConfig, func: impl FnOnce() -> Fut) -> Option<Summary>
where
    Fut: std::future::Future<Output = anyhow::Result<Summary>>,
    Summary: std::fmt::Display,
{
    init_tracing(output);
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            if !output.quiet {
                eprintln!("ERROR: failed starting the runtime: {error:#}");
            }
            return None;
        }
    };
    match runtime.block_on(func()) {
        Ok(summary) => {
            if output.print_summary {
                println!("{summary}");
            }
            Some(summary)
        }
        Err(error) => {
            if !output.quiet {
                eprintln!("ERROR: {error:#}");
            }
            None
        }
    }
}
