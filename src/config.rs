//! Configuration for textanchor.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TEXTANCHOR_HOME, TEXTANCHOR_STRATEGY)
//! 2. Config file (.textanchor/config.yaml)
//! 3. Defaults (~/.textanchor, sha256 checksums, exact strategy)
//!
//! Config file discovery:
//! - Searches current directory and parents for .textanchor/config.yaml
//! - `paths.home` is relative to the .textanchor/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::anchor::{AnchorSettings, ChecksumAlgorithm, Strategy};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Capture and relocation parameters
    #[serde(default)]
    pub anchoring: AnchorSettings,
    /// Checksum algorithm name (md5, sha1, sha256, length)
    #[serde(default)]
    pub checksum: Option<String>,
    /// Default relocation strategy (exact, fuzzy)
    #[serde(default)]
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Store directory (relative to .textanchor/)
    pub home: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory holding anchors.jsonl
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Capture and relocation parameters
    pub anchoring: AnchorSettings,
    /// Checksum algorithm for new captures
    pub checksum: ChecksumAlgorithm,
    /// Strategy used when none is given on the command line
    pub strategy: Strategy,
}

/// Environment overrides
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    home: Option<String>,
    strategy: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            home: std::env::var("TEXTANCHOR_HOME").ok(),
            strategy: std::env::var("TEXTANCHOR_STRATEGY").ok(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".textanchor").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn parse_strategy(name: &str) -> Result<Strategy> {
    name.parse::<Strategy>().map_err(anyhow::Error::msg)
}

/// Merge a parsed config file, environment overrides and defaults
fn resolve_config(
    file: Option<(PathBuf, ConfigFile)>,
    env: EnvOverrides,
    default_home: PathBuf,
) -> Result<ResolvedConfig> {
    let (config_file, config) = match file {
        Some((path, config)) => (Some(path), Some(config)),
        None => (None, None),
    };

    let home = if let Some(env_home) = env.home {
        PathBuf::from(env_home)
    } else if let (Some(path), Some(home)) = (
        config_file.as_ref(),
        config.as_ref().and_then(|c| c.paths.home.as_ref()),
    ) {
        let textanchor_dir = path.parent().unwrap_or(Path::new("."));
        resolve_path(textanchor_dir, home)
    } else {
        default_home
    };

    let anchoring = config.as_ref().map(|c| c.anchoring).unwrap_or_default();
    anchoring
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid anchoring settings in config file")?;

    let checksum = match config.as_ref().and_then(|c| c.checksum.as_deref()) {
        Some(name) => name
            .parse::<ChecksumAlgorithm>()
            .context("Invalid checksum in config file")?,
        None => ChecksumAlgorithm::default(),
    };

    let strategy = if let Some(name) = env.strategy {
        parse_strategy(&name).context("Invalid TEXTANCHOR_STRATEGY")?
    } else if let Some(name) = config.as_ref().and_then(|c| c.strategy.as_deref()) {
        parse_strategy(name).context("Invalid strategy in config file")?
    } else {
        Strategy::default()
    };

    Ok(ResolvedConfig {
        home,
        config_file,
        anchoring,
        checksum,
        strategy,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".textanchor");

    let file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    resolve_config(file, EnvOverrides::from_env(), default_home)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the textanchor home directory
pub fn textanchor_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, body: &str) -> PathBuf {
        let dir = temp.path().join(".textanchor");
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", body).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, EnvOverrides::default(), PathBuf::from("/home/u/.textanchor")).unwrap();

        assert_eq!(config.home, PathBuf::from("/home/u/.textanchor"));
        assert!(config.config_file.is_none());
        assert_eq!(config.anchoring, AnchorSettings::default());
        assert_eq!(config.checksum, ChecksumAlgorithm::Sha256);
        assert_eq!(config.strategy, Strategy::Exact);
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            r#"
version: "1.0"
paths:
  home: ./store
anchoring:
  window_size: 32
  fallback_tolerance: 8
checksum: MD5
strategy: fuzzy
"#,
        );

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./store".to_string()));
        assert_eq!(config.anchoring.window_size, 32);
        assert_eq!(config.anchoring.percent_storage, 0.15);

        let resolved = resolve_config(
            Some((config_path.clone(), config)),
            EnvOverrides::default(),
            PathBuf::from("/unused"),
        )
        .unwrap();
        assert_eq!(resolved.home, config_path.parent().unwrap().join("./store"));
        assert_eq!(resolved.anchoring.fallback_tolerance, 8);
        assert_eq!(resolved.checksum, ChecksumAlgorithm::Md5);
        assert_eq!(resolved.strategy, Strategy::Fuzzy);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "version: \"1.0\"\nstrategy: fuzzy\n");
        let config = load_config_file(&config_path).unwrap();

        let env = EnvOverrides {
            home: Some("/tmp/anchors".to_string()),
            strategy: Some("exact".to_string()),
        };
        let resolved = resolve_config(Some((config_path, config)), env, PathBuf::from("/unused")).unwrap();
        assert_eq!(resolved.home, PathBuf::from("/tmp/anchors"));
        assert_eq!(resolved.strategy, Strategy::Exact);
    }

    #[test]
    fn test_unsupported_checksum_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "version: \"1.0\"\nchecksum: crc32\n");
        let config = load_config_file(&config_path).unwrap();

        let err = resolve_config(Some((config_path, config)), EnvOverrides::default(), PathBuf::from("/unused"))
            .unwrap_err();
        let root = err.downcast_ref::<crate::AnchorError>().unwrap();
        assert_eq!(root, &crate::AnchorError::UnsupportedAlgorithm("crc32".to_string()));
    }

    #[test]
    fn test_out_of_range_percent_storage_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "version: \"1.0\"\nanchoring:\n  percent_storage: 3.0\n");
        let config = load_config_file(&config_path).unwrap();

        let err = resolve_config(Some((config_path, config)), EnvOverrides::default(), PathBuf::from("/unused"))
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid anchoring settings"));
        assert!(message.contains("percent_storage"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
