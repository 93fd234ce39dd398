use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level importer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub parser: ParserConfig,
    pub vocabulary: VocabularyConfig,
    pub logging: LoggingConfig,
}

/// How the assembler treats a title-looking sentence right after another title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsecutiveTitles {
    /// The second title becomes the first sentence of the first title's body.
    #[default]
    SecondIsBody,
    /// Both open pairs; an empty pair is then folded into its predecessor.
    OpenBoth,
}

/// Sentence assembly policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub consecutive_titles: ConsecutiveTitles,
    /// Wrap bullet-separated bodies in `<p>` paragraphs.
    pub html_paragraphs: bool,
}

/// Additions to the closed vocabularies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Extra language tokens recognized as known languages.
    pub extra_languages: Vec<String>,
}

/// Logging output settings for the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Also write JSON logs to a daily file under the data directory.
    pub log_to_file: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            consecutive_titles: ConsecutiveTitles::default(),
            html_paragraphs: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl ImporterConfig {
    /// Load configuration from `~/.config/statblock-import/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path. Unlike [`load`](Self::load),
    /// a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("statblock-import").join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("statblock-import").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ImporterConfig::default();
        assert_eq!(config.parser.consecutive_titles, ConsecutiveTitles::SecondIsBody);
        assert!(config.parser.html_paragraphs);
        assert!(config.vocabulary.extra_languages.is_empty());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.log_to_file);
    }

    #[test]
    fn test_config_load_missing_file() {
        // Should return defaults without panicking
        let config = ImporterConfig::load();
        assert!(!config.logging.level.is_empty());
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[parser]\nconsecutive_titles = \"open_both\"\n\n[vocabulary]\nextra_languages = [\"Slaad\"]"
        )
        .unwrap();

        let config = ImporterConfig::load_from(file.path()).unwrap();
        assert_eq!(config.parser.consecutive_titles, ConsecutiveTitles::OpenBoth);
        assert!(config.parser.html_paragraphs);
        assert_eq!(config.vocabulary.extra_languages, vec!["Slaad".to_string()]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser\nnot toml").unwrap();

        let err = ImporterConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImporterConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ImporterConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ImporterConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.parser.consecutive_titles, config.parser.consecutive_titles);
        assert_eq!(parsed.logging.level, config.logging.level);
    }
}
