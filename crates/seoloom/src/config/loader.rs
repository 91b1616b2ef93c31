use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub const DATABASE_ENV: &str = "SEOLOOM_DATABASE";
pub const MODEL_ENV: &str = "SEOLOOM_MODEL";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Rejects unknown keys and wrongly typed values before decoding.
fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
        .map_err(|e| invalid(format!("Invalid embedded schema JSON: {}", e)))?;

    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| invalid(format!("Failed to compile JSON schema: {}", e)))?;

    let errors: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: errors.join("; "),
        });
    }

    Ok(())
}

/// `~/.seoloom/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".seoloom").join("config.json"))
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    }
}

/// Loads the explicit config file, else the default one when it exists, else
/// built-in defaults. Environment overrides are applied last.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                log::debug!("Using config file {}", path.display());
                load_config(path)?
            }
            None => Config::default(),
        },
    };

    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Applies `SEOLOOM_DATABASE` and `SEOLOOM_MODEL` when set and non-empty.
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(path) = env_value(DATABASE_ENV) {
        config.database_path = Some(path);
    }
    if let Some(model) = env_value(MODEL_ENV) {
        config.llm.model = model;
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    let generation = &config.generation;
    if generation.default_word_count == 0 {
        return Err(invalid("generation.default_word_count must be positive"));
    }
    if !(generation.word_count_tolerance > 0.0 && generation.word_count_tolerance < 1.0) {
        return Err(invalid(format!(
            "generation.word_count_tolerance must be in (0, 1), got {}",
            generation.word_count_tolerance
        )));
    }

    let seo = &config.seo;
    if !(seo.density_min >= 0.0 && seo.density_min < seo.density_max) {
        return Err(invalid(format!(
            "seo.density_min ({}) must be non-negative and below seo.density_max ({})",
            seo.density_min, seo.density_max
        )));
    }
    if seo.internal_links_min > seo.internal_links_max {
        return Err(invalid("seo.internal_links_min exceeds seo.internal_links_max"));
    }
    if seo.external_links_min > seo.external_links_max {
        return Err(invalid("seo.external_links_min exceeds seo.external_links_max"));
    }
    if seo.title_tag_max == 0 || seo.meta_description_max == 0 {
        return Err(invalid("seo length limits must be positive"));
    }

    let retry = &config.retry;
    if retry.max_attempts == 0 {
        return Err(invalid("retry.max_attempts must be at least 1"));
    }
    if !(retry.multiplier.is_finite() && retry.multiplier >= 1.0) {
        return Err(invalid(format!(
            "retry.multiplier must be at least 1.0, got {}",
            retry.multiplier
        )));
    }

    if config.llm.model.trim().is_empty() {
        return Err(invalid("llm.model must not be empty"));
    }
    if config.serp.result_count == 0 {
        return Err(invalid("serp.result_count must be positive"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/key"), PathBuf::from("/abs/key"));
        assert_eq!(expand_home("~other/key"), PathBuf::from("~other/key"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/key"), home.join("key"));
            assert_eq!(expand_home("~"), home);
        }
    }

    #[test]
    fn test_load_valid_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "database_path": "/tmp/jobs.db",
            "generation": { "default_word_count": 2000, "word_count_tolerance": 0.05 },
            "seo": { "density_min": 0.5, "density_max": 2.5 },
            "retry": { "max_attempts": 5, "base_delay_ms": 10 },
            "llm": { "provider": "offline" }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.database_path.as_deref(), Some("/tmp/jobs.db"));
        assert_eq!(config.generation.default_word_count, 2000);
        assert_eq!(config.generation.language, "en");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.multiplier, 2.0);
    }

    #[test]
    fn test_unsupported_version() {
        let err = load_config_from_str(r#"{"version": "2.0"}"#).unwrap_err();
        assert!(err.to_string().contains("Unsupported config version"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            load_config_from_str("{ not json"),
            Err(ConfigError::ParseJson(_))
        ));
    }

    #[test]
    fn test_schema_rejects_misspelled_key() {
        let err = load_config_from_str(r#"{"generation": {"word_count_tolernce": 0.2}}"#)
            .unwrap_err();
        match err {
            ConfigError::SchemaValidation { errors } => {
                assert!(errors.contains("word_count_tolernce"), "{}", errors)
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_rejects_wrong_type() {
        let err = load_config_from_str(r#"{"retry": {"max_attempts": "three"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_density_bounds_validated() {
        let err = load_config_from_str(r#"{"seo": {"density_min": 3.0, "density_max": 1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_tolerance_validated() {
        assert!(load_config_from_str(r#"{"generation": {"word_count_tolerance": 0}}"#).is_err());
        assert!(load_config_from_str(r#"{"generation": {"word_count_tolerance": 1.5}}"#).is_err());
    }

    #[test]
    fn test_link_bounds_and_retry_validated() {
        assert!(load_config_from_str(r#"{"seo": {"internal_links_min": 6}}"#).is_err());
        assert!(load_config_from_str(r#"{"seo": {"external_links_min": 5}}"#).is_err());
        assert!(load_config_from_str(r#"{"retry": {"max_attempts": 0}}"#).is_err());
        assert!(load_config_from_str(r#"{"retry": {"multiplier": 0.5}}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/seoloom.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    #[serial]
    fn test_resolve_config_with_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"llm": {{"model": "from-file"}}}}"#).unwrap();

        std::env::set_var(DATABASE_ENV, "/tmp/override.db");
        std::env::set_var(MODEL_ENV, "from-env");
        let config = resolve_config(Some(file.path())).unwrap();
        std::env::remove_var(DATABASE_ENV);
        std::env::remove_var(MODEL_ENV);

        assert_eq!(config.database_path.as_deref(), Some("/tmp/override.db"));
        assert_eq!(config.llm.model, "from-env");
    }

    #[test]
    #[serial]
    fn test_blank_env_values_ignored() {
        std::env::set_var(MODEL_ENV, "  ");
        let mut config = Config::default();
        apply_env_overrides(&mut config);
        std::env::remove_var(MODEL_ENV);

        assert_eq!(config.llm.model, crate::config::schema::DEFAULT_MODEL);
    }
}
