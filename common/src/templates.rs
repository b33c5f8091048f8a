use anyhow::{anyhow, Context, Result};

/// Fixed name of the subtree kept in sync between a template and the
/// projects instantiated from it.
pub const SHARED_SUBTREE: &str = "shared";

/// Template root used when `--templates` is not given: `$TMAN_TEMPLATES`,
/// falling back to `$HOME/.local/share/tman/templates`.
pub fn default_root() -> Option<std::path::PathBuf> {
    if let Some(dir) = std::env::var_os("TMAN_TEMPLATES") {
        return Some(std::path::PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .map(|home| std::path::PathBuf::from(home).join(".local/share/tman/templates"))
}

/// Maps every template found under `root` to its directory.
///
/// Each immediate subdirectory of the template root is one template; other
/// entries are ignored. A missing root or an empty one is an error.
pub async fn template_dirs(
    root: &std::path::Path,
) -> Result<std::collections::BTreeMap<String, std::path::PathBuf>> {
    let mut entries = tokio::fs::read_dir(root)
        .await
        .with_context(|| format!("template directory {root:?} not found"))?;
    let mut templates = std::collections::BTreeMap::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("failed traversing template directory {root:?}"))?
    {
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("failed reading file type of {:?}", entry.path()))?;
        if !file_type.is_dir() {
            continue;
        }
        templates.insert(entry.file_name().to_string_lossy().into_owned(), entry.path());
    }
    if templates.is_empty() {
        return Err(anyhow!("no templates found in {root:?}"));
    }
    Ok(templates)
}
