use anyhow::{anyhow, Context};
use async_recursion::async_recursion;
use tracing::instrument;

use crate::rename::{rename_name, Direction};

/// Paths longer than this are elided to a trailing suffix in progress lines.
const MAX_PATH_DISPLAY_LEN: usize = 50;

/// Error type for replicate operations that preserves operation summary even on failure.
#[derive(Debug, thiserror::Error)]
#[error("{source:#}")]
pub struct Error {
    #[source]
    pub source: anyhow::Error,
    pub summary: Summary,
}

impl Error {
    #[must_use]
    pub fn new(source: anyhow::Error, summary: Summary) -> Self {
        Error { source, summary }
    }
}

#[derive(Copy, Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    pub bytes_copied: u64,
    pub files_copied: usize,
    pub symlinks_created: usize,
    pub directories_created: usize,
}

impl std::ops::Add for Summary {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            bytes_copied: self.bytes_copied + other.bytes_copied,
            files_copied: self.files_copied + other.files_copied,
            symlinks_created: self.symlinks_created + other.symlinks_created,
            directories_created: self.directories_created + other.directories_created,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "bytes copied: {}\n\
            files copied: {}\n\
            symlinks created: {}\n\
            directories created: {}",
            bytesize::ByteSize(self.bytes_copied),
            self.files_copied,
            self.symlinks_created,
            self.directories_created,
        )
    }
}

/// The two fixed roots of a replication job.
///
/// Both are fully resolved before the traversal starts and passed through every
/// recursive call; they are used only to classify symlink targets as inside or
/// outside the tree being copied and to re-root internal targets.
#[derive(Debug)]
struct TreeRoots {
    source: std::path::PathBuf,
    destination: std::path::PathBuf,
}

/// Computes the destination target for a symlink whose source-side target
/// resolved to `resolved_target`.
///
/// An internal target (inside `source_root`) has every root-relative segment
/// renamed via the rename rule and is re-rooted under `destination_root`; a
/// target pointing at `source_root` itself maps to `destination_root` itself.
/// An external target is returned verbatim.
#[must_use]
pub fn retarget(
    direction: Direction,
    resolved_target: &std::path::Path,
    source_root: &std::path::Path,
    destination_root: &std::path::Path,
) -> std::path::PathBuf {
    let Ok(relative) = resolved_target.strip_prefix(source_root) else {
        // the link points outside the tree being copied, keep it as is
        return resolved_target.to_path_buf();
    };
    let mut new_target = destination_root.to_path_buf();
    for segment in relative.components() {
        new_target.push(rename_name(direction, segment.as_os_str()));
    }
    new_target
}

fn elide(path: &std::path::Path) -> String {
    let text = path.display().to_string();
    let len = text.chars().count();
    if len <= MAX_PATH_DISPLAY_LEN {
        return text;
    }
    let suffix: String = text.chars().skip(len - MAX_PATH_DISPLAY_LEN).collect();
    format!("...{suffix}")
}

/// Recursively copies `source_dir` under `destination_dir`, renaming every path
/// segment through the rename rule selected by `direction` and rewriting
/// symbolic links whose targets fall inside the source tree.
///
/// The destination directory and any missing intermediate segments are created
/// before files are written into them; directory creation is idempotent. Any
/// filesystem failure is fatal and aborts the remaining traversal, leaving a
/// partially populated destination behind.
///
/// Circular symbolic links inside the source tree are not detected; resolving
/// one surfaces the underlying OS error.
#[instrument]
pub async fn replicate(
    source_dir: &std::path::Path,
    destination_dir: &std::path::Path,
    direction: Direction,
) -> Result<Summary, Error> {
    let source_metadata = tokio::fs::symlink_metadata(source_dir)
        .await
        .with_context(|| format!("source directory {source_dir:?} does not exist"))
        .map_err(|err| Error::new(err, Default::default()))?;
    if !source_metadata.is_dir() {
        return Err(Error::new(
            anyhow!("source {source_dir:?} is not a directory"),
            Default::default(),
        ));
    }
    let mut summary = Summary::default();
    if !destination_dir.exists() {
        tracing::info!("making directory {}", elide(destination_dir));
        tokio::fs::create_dir_all(destination_dir)
            .await
            .with_context(|| format!("cannot create directory {destination_dir:?}"))
            .map_err(|err| Error::new(err, summary))?;
        summary.directories_created += 1;
    }
    // resolve both roots up front; every link target classification is a prefix
    // match against the resolved source root
    let roots = TreeRoots {
        source: tokio::fs::canonicalize(source_dir)
            .await
            .with_context(|| format!("failed resolving source directory {source_dir:?}"))
            .map_err(|err| Error::new(err, summary))?,
        destination: tokio::fs::canonicalize(destination_dir)
            .await
            .with_context(|| format!("failed resolving destination directory {destination_dir:?}"))
            .map_err(|err| Error::new(err, summary))?,
    };
    let walk = replicate_dir(&roots, &roots.source, &roots.destination, direction)
        .await
        .map_err(|err| Error::new(err.source, summary + err.summary))?;
    Ok(summary + walk)
}

#[async_recursion]
async fn replicate_dir(
    roots: &TreeRoots,
    source_dir: &std::path::Path,
    destination_dir: &std::path::Path,
    direction: Direction,
) -> Result<Summary, Error> {
    tracing::debug!("process contents of {:?}", source_dir);
    let mut entries = tokio::fs::read_dir(source_dir)
        .await
        .with_context(|| format!("cannot open directory {source_dir:?} for reading"))
        .map_err(|err| Error::new(err, Default::default()))?;
    let mut summary = Summary::default();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("failed traversing directory {source_dir:?}"))
        .map_err(|err| Error::new(err, summary))?
    {
        let entry_path = entry.path();
        let entry_name = entry_path.file_name().unwrap();
        let new_path = destination_dir.join(rename_name(direction, entry_name));
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("failed reading file type of {entry_path:?}"))
            .map_err(|err| Error::new(err, summary))?;
        // a symlink is always handled as a link, even when its target is a
        // directory or a file
        if file_type.is_symlink() {
            let resolved_target = tokio::fs::canonicalize(&entry_path)
                .await
                .with_context(|| format!("failed resolving symlink {entry_path:?}"))
                .map_err(|err| Error::new(err, summary))?;
            let new_target = retarget(direction, &resolved_target, &roots.source, &roots.destination);
            tracing::info!(
                "symlink {} -> {} (target {})",
                elide(&entry_path),
                elide(&new_path),
                elide(&new_target),
            );
            tokio::fs::symlink(&new_target, &new_path)
                .await
                .with_context(|| format!("failed creating symlink {new_path:?}"))
                .map_err(|err| Error::new(err, summary))?;
            summary.symlinks_created += 1;
        } else if file_type.is_dir() {
            tracing::info!("directory {} -> {}", elide(&entry_path), elide(&new_path));
            match tokio::fs::create_dir(&new_path).await {
                Ok(()) => summary.directories_created += 1,
                // running twice into the same destination must not fail on the
                // directories that already exist
                Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(error) => {
                    return Err(Error::new(
                        anyhow::Error::new(error)
                            .context(format!("cannot create directory {new_path:?}")),
                        summary,
                    ));
                }
            }
            summary = summary
                + replicate_dir(roots, &entry_path, &new_path, direction)
                    .await
                    .map_err(|err| Error::new(err.source, summary + err.summary))?;
        } else {
            tracing::info!("file {} -> {}", elide(&entry_path), elide(&new_path));
            let bytes = tokio::fs::copy(&entry_path, &new_path)
                .await
                .with_context(|| format!("failed copying {entry_path:?} to {new_path:?}"))
                .map_err(|err| Error::new(err, summary))?;
            summary.bytes_copied += bytes;
            summary.files_copied += 1;
        }
    }
    Ok(summary)
}
