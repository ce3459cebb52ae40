//! Config file discovery and loading.

use std::path::{Path, PathBuf};

use crate::types::{ApiConfig, SerenConfig};
use crate::Result;

/// Environment variable overriding the configured base URL.
pub const BASE_URL_ENV: &str = "SEREN_BASE_URL";

/// Config file name within the user config directory.
const CONFIG_FILE: &str = "config.toml";

/// Path of the user config file (`~/.config/seren/config.toml` on Linux).
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("seren").join(CONFIG_FILE))
}

/// Load config from an explicit path, applying the env override.
pub fn load_from(path: &Path) -> Result<SerenConfig> {
    let content = std::fs::read_to_string(path)?;
    let mut config = SerenConfig::from_toml(&content)?;
    apply_env_override(&mut config);
    Ok(config)
}

/// Load the user config, falling back to defaults when no file exists.
///
/// A missing file is not an error; an unreadable or malformed one is.
pub fn load() -> Result<SerenConfig> {
    let mut config = match config_path() {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            SerenConfig::from_toml(&content)?
        }
        _ => SerenConfig::default(),
    };
    apply_env_override(&mut config);
    Ok(config)
}

fn apply_env_override(config: &mut SerenConfig) {
    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        if !base_url.is_empty() {
            let mut api = config.api.take().unwrap_or_else(ApiConfig::default);
            api.base_url = base_url;
            config.api = Some(api);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"https://example.com\"").unwrap();

        let config = load_from(file.path()).unwrap();
        assert_eq!(config.api().base_url, "https://example.com");
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/seren/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_toml_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url =").unwrap();

        assert!(load_from(file.path()).is_err());
    }
}
