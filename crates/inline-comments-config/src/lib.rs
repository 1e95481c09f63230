use inline_comments_engine::{EditorOptions, HighlightPalette};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period after the last edit before the document is saved
    pub persist_debounce_ms: u64,
    /// Content path comments are scoped to
    pub content_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub spell_check: bool,
    /// Document opened when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_document: Option<PathBuf>,
    pub palette: HighlightPalette,
}

impl Default for Config {
    fn default() -> Self {
        let options = EditorOptions::default();
        Self {
            persist_debounce_ms: options.persist_debounce.as_millis() as u64,
            content_path: "body".to_string(),
            placeholder: options.placeholder,
            spell_check: options.spell_check,
            default_document: None,
            palette: options.palette,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.default_document = config
            .default_document
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/inline-comments");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Editor options for a surface built from this config
    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            persist_debounce: Duration::from_millis(self.persist_debounce_ms),
            palette: self.palette.clone(),
            placeholder: self.placeholder.clone(),
            spell_check: self.spell_check,
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/inline-comments/config.toml"));
    }

    #[test]
    fn test_defaults_match_editor_defaults() {
        let config = Config::default();
        assert_eq!(config.persist_debounce_ms, 250);
        assert_eq!(config.content_path, "body");
        assert_eq!(config.editor_options(), EditorOptions::default());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r##"
persist_debounce_ms = 1000

[palette]
focused = "#ff0000"
"##,
        )
        .unwrap();

        assert_eq!(config.content_path, "body");
        assert_eq!(config.palette.focused, "#ff0000");
        assert_eq!(config.palette.standard, HighlightPalette::default().standard);
        assert_eq!(
            config.editor_options().persist_debounce,
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("INLINE_COMMENTS_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$INLINE_COMMENTS_TEST_VAR/doc.json");
        let expanded = Config::expand_path(&path).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/doc.json"));

        unsafe {
            env::remove_var("INLINE_COMMENTS_TEST_VAR");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "persist_debounce_ms = \"soon\"").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            persist_debounce_ms: 500,
            content_path: "intro".to_string(),
            default_document: Some(PathBuf::from("/tmp/doc.json")),
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_default_document_is_expanded_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "default_document = \"~/notes/doc.json\"").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        let document = config.default_document.unwrap();

        assert!(!document.to_string_lossy().starts_with('~'));
        assert!(document.to_string_lossy().ends_with("notes/doc.json"));
    }
}
