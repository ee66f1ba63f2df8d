use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Default separator between key parts.
pub const DEFAULT_KEY_SEPARATOR: char = ':';

/// Default first-cell tag marking a glossary row.
pub const DEFAULT_GLOSSARY_TAG: &str = "GLOSSARY";

/// Default culture that authored text is written in.
pub const DEFAULT_INPUT_CULTURE: &str = "en";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    // Grid file
    pub grid_path: PathBuf,
    pub backup_path: Option<PathBuf>,

    // Keys
    pub key_separator: char,
    pub glossary_tag: String,

    // Cultures
    pub input_culture: String,
    pub decorate_headers: bool,
}

impl StoreConfig {
    /// Create a configuration for the given grid file with default settings.
    pub fn new(grid_path: impl Into<PathBuf>) -> Self {
        Self {
            grid_path: grid_path.into(),
            backup_path: None,
            key_separator: DEFAULT_KEY_SEPARATOR,
            glossary_tag: DEFAULT_GLOSSARY_TAG.to_string(),
            input_culture: DEFAULT_INPUT_CULTURE.to_string(),
            decorate_headers: false,
        }
    }

    /// Capture a copy of the grid here on first access.
    pub fn with_backup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_path = Some(path.into());
        self
    }

    pub fn with_key_separator(mut self, separator: char) -> Self {
        self.key_separator = separator;
        self
    }

    pub fn with_glossary_tag(mut self, tag: impl Into<String>) -> Self {
        self.glossary_tag = tag.into();
        self
    }

    pub fn with_input_culture(mut self, tag: impl Into<String>) -> Self {
        self.input_culture = tag.into();
        self
    }

    /// Write new language headers as "Native name (tag)".
    pub fn with_decorated_headers(mut self, decorate: bool) -> Self {
        self.decorate_headers = decorate;
        self
    }

    pub fn from_env() -> Result<Self> {
        let grid_path = std::env::var("L10N_GRID_PATH").context("L10N_GRID_PATH not set")?;

        let key_separator = match std::env::var("L10N_KEY_SEPARATOR") {
            Ok(value) => parse_separator(&value)?,
            Err(_) => DEFAULT_KEY_SEPARATOR,
        };

        Ok(Self {
            grid_path: PathBuf::from(grid_path),
            backup_path: std::env::var("L10N_BACKUP_PATH").ok().map(PathBuf::from),

            key_separator,
            glossary_tag: std::env::var("L10N_GLOSSARY_TAG")
                .unwrap_or_else(|_| DEFAULT_GLOSSARY_TAG.to_string()),

            input_culture: std::env::var("L10N_INPUT_CULTURE")
                .unwrap_or_else(|_| DEFAULT_INPUT_CULTURE.to_string()),
            decorate_headers: std::env::var("L10N_DECORATE_HEADERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }
}

fn parse_separator(value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => bail!(
            "L10N_KEY_SEPARATOR must be exactly one character, got '{}'",
            value
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "L10N_GRID_PATH",
            "L10N_BACKUP_PATH",
            "L10N_KEY_SEPARATOR",
            "L10N_GLOSSARY_TAG",
            "L10N_INPUT_CULTURE",
            "L10N_DECORATE_HEADERS",
        ] {
            std::env::remove_var(var);
        }
    }

    // ==================== Builder Tests ====================

    #[test]
    fn test_new_uses_defaults() {
        let config = StoreConfig::new("strings.csv");
        assert_eq!(config.grid_path, PathBuf::from("strings.csv"));
        assert_eq!(config.key_separator, ':');
        assert_eq!(config.glossary_tag, "GLOSSARY");
        assert_eq!(config.input_culture, "en");
        assert!(config.backup_path.is_none());
        assert!(!config.decorate_headers);
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = StoreConfig::new("strings.csv")
            .with_backup_path("strings.bak.csv")
            .with_key_separator('|')
            .with_glossary_tag("GLOSS")
            .with_input_culture("sv")
            .with_decorated_headers(true);

        assert_eq!(config.backup_path, Some(PathBuf::from("strings.bak.csv")));
        assert_eq!(config.key_separator, '|');
        assert_eq!(config.glossary_tag, "GLOSS");
        assert_eq!(config.input_culture, "sv");
        assert!(config.decorate_headers);
    }

    // ==================== Environment Tests ====================

    #[test]
    #[serial]
    fn test_from_env_requires_grid_path() {
        clear_env();
        let result = StoreConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("L10N_GRID_PATH"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_all_variables() {
        clear_env();
        std::env::set_var("L10N_GRID_PATH", "/data/strings.csv");
        std::env::set_var("L10N_BACKUP_PATH", "/data/strings.bak.csv");
        std::env::set_var("L10N_KEY_SEPARATOR", "|");
        std::env::set_var("L10N_GLOSSARY_TAG", "TERMS");
        std::env::set_var("L10N_INPUT_CULTURE", "de");
        std::env::set_var("L10N_DECORATE_HEADERS", "true");

        let config = StoreConfig::from_env().expect("Should load config");
        assert_eq!(config.grid_path, PathBuf::from("/data/strings.csv"));
        assert_eq!(
            config.backup_path,
            Some(PathBuf::from("/data/strings.bak.csv"))
        );
        assert_eq!(config.key_separator, '|');
        assert_eq!(config.glossary_tag, "TERMS");
        assert_eq!(config.input_culture, "de");
        assert!(config.decorate_headers);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_long_separator() {
        clear_env();
        std::env::set_var("L10N_GRID_PATH", "strings.csv");
        std::env::set_var("L10N_KEY_SEPARATOR", "::");

        let result = StoreConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_unparseable_bool() {
        clear_env();
        std::env::set_var("L10N_GRID_PATH", "strings.csv");
        std::env::set_var("L10N_DECORATE_HEADERS", "yes please");

        let config = StoreConfig::from_env().expect("Should load config");
        assert!(!config.decorate_headers);

        clear_env();
    }
}
