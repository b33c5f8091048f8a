use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;

use common::origin::Origin;
use common::replicate::Summary;
use common::{Direction, SHARED_SUBTREE};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tman",
    version,
    about = "Manage projects instantiated from template directory trees",
    long_about = "`tman` creates new project directories from templates and keeps the \
well-known `shared` subtree synchronized between a template and the projects made from it.

Templates store would-be hidden files under a visible `DOT_` prefix (e.g. `DOT_gitignore`); \
instantiated projects get the real dot-file names back. Symbolic links pointing inside a \
template are rewritten to point at the matching (renamed) location inside the project, and \
vice versa; links pointing elsewhere are copied as-is.

EXAMPLES:
    # List available templates
    tman list

    # Create a new project from the 'thesis' template in the current directory
    tman new thesis

    # Refresh this project's shared/ subtree from its template
    tman pull

    # Publish this project's shared/ subtree back to its template
    tman push --yes"
)]
struct Args {
    /// Directory containing the templates (default: $TMAN_TEMPLATES, else
    /// ~/.local/share/tman/templates)
    #[arg(long, value_name = "DIR", global = true, help_heading = "Template options")]
    templates: Option<std::path::PathBuf>,

    /// Assume 'yes' for every confirmation prompt
    #[arg(short = 'y', long, global = true, help_heading = "Template options")]
    yes: bool,

    /// Verbose level (implies "summary"): -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true, help_heading = "Progress & output")]
    verbose: u8,

    /// Print summary at the end
    #[arg(long, global = true, help_heading = "Progress & output")]
    summary: bool,

    /// Quiet mode, don't report errors
    #[arg(short = 'q', long = "quiet", global = true, help_heading = "Progress & output")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// List available templates
    List,
    /// Create a new project based on a given template
    New {
        /// Name of the template to instantiate
        template: String,
        /// Name for the new project directory (default: name of the template)
        #[arg(short = 'n', long, value_name = "NAME")]
        name: Option<String>,
        /// Directory to create the new project in (default: current working directory)
        #[arg(short = 'd', long, value_name = "DIR")]
        dir: Option<std::path::PathBuf>,
    },
    /// Overwrite this project's shared subtree with the template's copy
    Pull {
        /// Project directory (default: current working directory)
        #[arg(short = 'd', long, value_name = "DIR")]
        dir: Option<std::path::PathBuf>,
    },
    /// Overwrite the template's shared subtree with this project's copy
    Push {
        /// Project directory (default: current working directory)
        #[arg(short = 'd', long, value_name = "DIR")]
        dir: Option<std::path::PathBuf>,
    },
}

fn template_root(args: &Args) -> Result<std::path::PathBuf> {
    args.templates
        .clone()
        .or_else(common::templates::default_root)
        .ok_or_else(|| anyhow!("no template directory; set --templates or $TMAN_TEMPLATES"))
}

/// Asks for confirmation unless --yes was given. Declining is not an error.
fn confirmed(args: &Args, message: &str) -> Result<bool> {
    if args.yes {
        return Ok(true);
    }
    let proceed = common::prompt::confirm(message)?;
    if !proceed {
        println!("Aborted.");
    }
    Ok(proceed)
}

fn report(args: &Args, result: Result<Summary, common::replicate::Error>) -> Result<Summary> {
    match result {
        Ok(summary) => Ok(summary),
        Err(error) => {
            tracing::error!("{:#}", &error);
            if args.summary {
                return Err(anyhow!("{}\n\n{}", error, &error.summary));
            }
            Err(anyhow!("{}", error))
        }
    }
}

#[instrument(skip(args))]
async fn exec_list(args: &Args) -> Result<Summary> {
    let root = template_root(args)?;
    let templates = common::templates::template_dirs(&root).await?;
    println!("Available templates:");
    for name in templates.keys() {
        println!("* {name}");
    }
    Ok(Summary::default())
}

#[instrument(skip(args))]
async fn exec_new(
    args: &Args,
    template: &str,
    name: Option<&str>,
    dir: Option<&std::path::Path>,
) -> Result<Summary> {
    let root = template_root(args)?;
    let templates = common::templates::template_dirs(&root).await?;
    let template_dir = templates
        .get(template)
        .ok_or_else(|| anyhow!("template {template:?} not found in {root:?}"))?;
    let superdir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let project_dir = superdir.join(name.unwrap_or(template));
    if project_dir.exists() {
        return Err(anyhow!(
            "destination {project_dir:?} already exists, refusing to overwrite it"
        ));
    }
    if !confirmed(
        args,
        &format!("About to create a project in:\n{}\nContinue?", project_dir.display()),
    )? {
        return Ok(Summary::default());
    }
    let summary = report(
        args,
        common::replicate(template_dir, &project_dir, Direction::Reveal).await,
    )?;
    Origin {
        template: template.to_string(),
        template_dir: template_dir.clone(),
    }
    .store(&project_dir)
    .await?;
    Ok(summary)
}

/// Replaces `destination` entirely with a renamed copy of `source`.
///
/// Both sync directions funnel through here; only the roots and the rename
/// direction differ.
async fn sync(
    args: &Args,
    source: &std::path::Path,
    destination: &std::path::Path,
    direction: Direction,
) -> Result<Summary> {
    if !source.is_dir() {
        return Err(anyhow!("shared subtree {source:?} does not exist"));
    }
    if destination.exists() {
        let removed = common::rm::rm(destination).await?;
        tracing::info!("cleared {:?}:\n{}", destination, &removed);
    }
    report(args, common::replicate(source, destination, direction).await)
}

#[instrument(skip(args))]
async fn exec_pull(args: &Args, dir: Option<&std::path::Path>) -> Result<Summary> {
    let project_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let origin = Origin::load(&project_dir).await?;
    let project_shared = project_dir.join(SHARED_SUBTREE);
    if !confirmed(
        args,
        &format!(
            "About to overwrite:\n{}\nwith the shared subtree of template '{}'. Continue?",
            project_shared.display(),
            &origin.template
        ),
    )? {
        return Ok(Summary::default());
    }
    sync(
        args,
        &origin.template_dir.join(SHARED_SUBTREE),
        &project_shared,
        Direction::Reveal,
    )
    .await
}

#[instrument(skip(args))]
async fn exec_push(args: &Args, dir: Option<&std::path::Path>) -> Result<Summary> {
    let project_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let origin = Origin::load(&project_dir).await?;
    let template_shared = origin.template_dir.join(SHARED_SUBTREE);
    if !confirmed(
        args,
        &format!(
            "About to overwrite the shared subtree of template '{}':\n{}\nContinue?",
            &origin.template,
            template_shared.display(),
        ),
    )? {
        return Ok(Summary::default());
    }
    sync(
        args,
        &project_dir.join(SHARED_SUBTREE),
        &template_shared,
        Direction::Hide,
    )
    .await
}

async fn async_main(args: Args) -> Result<Summary> {
    match args.command.clone() {
        Command::List => exec_list(&args).await,
        Command::New {
            template,
            name,
            dir,
        } => exec_new(&args, &template, name.as_deref(), dir.as_deref()).await,
        Command::Pull { dir } => exec_pull(&args, dir.as_deref()).await,
        Command::Push { dir } => exec_push(&args, dir.as_deref()).await,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary || args.verbose > 0,
    };
    let func = {
        let args = args.clone();
        || async_main(args)
    };
    if common::run(&output, func).is_none() {
        std::process::exit(1);
    }
    Ok(())
}
