use anyhow::{Context, Result};

/// Name of the record written at a project root after instantiation.
pub const ORIGIN_FILE: &str = ".tman-origin.json";

/// Remembers which template a project was created from and where that
/// template lives, so `pull` and `push` can find the master copy again.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Origin {
    pub template: String,
    pub template_dir: std::path::PathBuf,
}

impl Origin {
    pub async fn load(project_dir: &std::path::Path) -> Result<Self> {
        let path = project_dir.join(ORIGIN_FILE);
        let contents = tokio::fs::read_to_string(&path).await.with_context(|| {
            format!(
                "cannot read {path:?}; was this project created with 'tman new'?"
            )
        })?;
        serde_json::from_str(&contents).with_context(|| format!("cannot parse {path:?}"))
    }

    pub async fn store(&self, project_dir: &std::path::Path) -> Result<()> {
        let path = project_dir.join(ORIGIN_FILE);
        let contents = serde_json::to_string_pretty(self).context("cannot serialize origin")?;
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("cannot write {path:?}"))
    }
}

#[cfg(test)]
mod origin_tests {
    use crate::testutils;

    use super::*;

    #[tokio::test]
    async fn store_then_load_roundtrips() -> Result<()> {
        let tmp_dir = testutils::create_temp_dir().await?;
        let origin = Origin {
            template: "thesis".to_string(),
            template_dir: std::path::PathBuf::from("/somewhere/templates/thesis"),
        };
        origin.store(&tmp_dir).await?;
        let loaded = Origin::load(&tmp_dir).await?;
        assert_eq!(loaded, origin);
        Ok(())
    }

    #[tokio::test]
    async fn load_without_record_explains_the_path() -> Result<()> {
        let tmp_dir = testutils::create_temp_dir().await?;
        let error = Origin::load(&tmp_dir)
            .await
            .expect_err("load must fail without a record");
        assert!(format!("{error:#}").contains(ORIGIN_FILE));
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() -> Result<()> {
        let tmp_dir = testutils::create_temp_dir().await?;
        tokio::fs::write(tmp_dir.join(ORIGIN_FILE), "not json").await?;
        assert!(Origin::load(&tmp_dir).await.is_err());
        Ok(())
    }
}
