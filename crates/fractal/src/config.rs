//! Scene configuration loading

use std::path::{Path, PathBuf};

use shared::SceneConfig;

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.json";

/// `<config_dir>/fractal-gen/config.json` for the current user
#[cfg(not(target_arch = "wasm32"))]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "fractal-gen", "fractal-gen")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(target_arch = "wasm32")]
pub fn default_config_path() -> Option<PathBuf> {
    None
}

/// Parse a JSON config; missing fields take their defaults
pub fn parse(json: &str, origin: &Path) -> Result<SceneConfig, ConfigError> {
    serde_json::from_str(json).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })
}

pub fn load_from(path: &Path) -> Result<SceneConfig, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&json, path)?;
    tracing::info!("config: loaded {}", path.display());
    Ok(config)
}

/// Load `explicit` if given, else the per-user file when it exists, else defaults.
///
/// An explicit path must exist; a broken per-user file is an error too.
pub fn load(explicit: Option<&Path>) -> Result<SceneConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_from(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => {
            tracing::debug!("config: no config file, using defaults");
            Ok(SceneConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ExportFormat, SceneVariant};

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, r#"{"variant": "sierpinski", "export_format": "json"}"#).unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.variant, SceneVariant::Sierpinski);
        assert_eq!(config.export_format, ExportFormat::Json);
        assert_eq!(config.sierpinski.params.position, [0.0, 12.0, 0.0]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse("{ not json", Path::new("broken.json")).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
