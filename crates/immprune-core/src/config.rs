use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ImmpruneError;

pub const CONFIG_FILENAME: &str = "config.json";
pub const ENV_URL: &str = "IMMPRUNE_URL";
pub const ENV_KEY: &str = "IMMPRUNE_KEY";

/// Immich credentials, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub immich_url: String,
    pub immich_key: String,
}

/// `<config dir>/immprune/config.json`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("immprune").join(CONFIG_FILENAME))
}

impl Config {
    pub fn new(immich_url: &str, immich_key: &str) -> Self {
        Self {
            immich_url: immich_url.trim().trim_end_matches('/').to_string(),
            immich_key: immich_key.trim().to_string(),
        }
    }

    /// Read the config file. `Ok(None)` when it does not exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)
            .map_err(|e| ImmpruneError::Config(format!("cannot open {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ImmpruneError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        Ok(Some(Config::new(&config.immich_url, &config.immich_key)))
    }

    /// Write through a temp file, then rename. Owner-only permissions on Unix.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| ImmpruneError::Config(format!("invalid config path {}", path.display())))?;
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

        let temp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&temp_path)?;
            restrict_permissions(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Environment values win over the file. Returns `None` if nothing is set anywhere.
    pub fn with_overrides(base: Option<Self>, url: Option<String>, key: Option<String>) -> Option<Self> {
        match (base, url, key) {
            (None, None, None) => None,
            (base, url, key) => {
                let base = base.unwrap_or(Config { immich_url: String::new(), immich_key: String::new() });
                Some(Config::new(
                    url.as_deref().unwrap_or(&base.immich_url),
                    key.as_deref().unwrap_or(&base.immich_key),
                ))
            }
        }
    }

    /// Load `path` and apply `IMMPRUNE_URL` / `IMMPRUNE_KEY`.
    pub fn resolve(path: &Path) -> anyhow::Result<Option<Self>> {
        let base = Self::load(path)?;
        let env = |name: &str| std::env::var(name).ok().filter(|v: &String| !v.trim().is_empty());
        Ok(Self::with_overrides(base, env(ENV_URL), env(ENV_KEY)))
    }

    pub fn validate(&self) -> Result<(), ImmpruneError> {
        if self.immich_url.is_empty() {
            return Err(ImmpruneError::Config("Immich URL is empty".to_string()));
        }
        if !self.immich_url.starts_with("http://") && !self.immich_url.starts_with("https://") {
            return Err(ImmpruneError::Config(format!(
                "Immich URL must start with http:// or https:// (got {})",
                self.immich_url
            )));
        }
        if self.immich_key.is_empty() {
            return Err(ImmpruneError::Config("Immich API key is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("immprune").join(CONFIG_FILENAME);
        assert!(Config::load(&path).unwrap().is_none());

        let config = Config::new("https://immich.example.org/", "secret");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap().unwrap();
        assert_eq!(loaded.immich_url, "https://immich.example.org");
        assert_eq!(loaded.immich_key, "secret");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        Config::new("https://a", "b").save(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_unreadable_config_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "immich_url: yaml-not-json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<ImmpruneError>(), Some(ImmpruneError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let file = Some(Config::new("https://file", "file-key"));
        assert!(Config::with_overrides(None, None, None).is_none());

        let merged = Config::with_overrides(file.clone(), Some("https://env/".into()), None).unwrap();
        assert_eq!(merged, Config::new("https://env", "file-key"));

        let env_only = Config::with_overrides(None, None, Some("k".into())).unwrap();
        assert!(env_only.validate().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Config::new("https://immich.local", "k").validate().is_ok());
        assert!(Config::new("immich.local", "k").validate().is_err());
        assert!(Config::new("https://immich.local", " ").validate().is_err());
    }
}
