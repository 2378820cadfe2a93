use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub snapshot_path: PathBuf,
    pub data_dir: PathBuf,
    /// Base URL of the badge service, from `OTTRCAL_BADGE_URL`.
    pub badge_service_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "ottrcal").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let snapshot_path = data_dir.join("progress.json");
        let badge_service_url = std::env::var("OTTRCAL_BADGE_URL").ok();

        Ok(Config {
            snapshot_path,
            data_dir,
            badge_service_url,
        })
    }

    /// Load the persistent user id from disk, or generate one.
    ///
    /// The badge service keys unlock records by `(user_id, badge_id)`;
    /// the id is a UUID minted on first use and kept in the data dir.
    pub fn load_or_create_user_id(&self) -> Result<String> {
        let path = self.data_dir.join("user_id");

        if path.exists() {
            let id = std::fs::read_to_string(&path).context("Failed to read user id file")?;
            let id = id.trim().to_string();
            if !id.is_empty() {
                return Ok(id);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        std::fs::write(&path, &id).context("Failed to write user id file")?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_stable_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            snapshot_path: dir.path().join("progress.json"),
            data_dir: dir.path().to_path_buf(),
            badge_service_url: None,
        };

        let first = config.load_or_create_user_id().unwrap();
        let second = config.load_or_create_user_id().unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
