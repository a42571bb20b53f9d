use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AttendConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub socket_path: String,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/attend.sock".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExtractorConfig {
    /// JSON file mapping PERSON / ORG / GPE to name lists. `~` is expanded.
    pub gazetteer_path: Option<String>,
    pub max_input_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            gazetteer_path: None,
            max_input_chars: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TranslationConfig {
    /// Minutes subtracted from every recognized clock time (330 = 5h30m).
    pub utc_offset_minutes: i64,
    pub case_insensitive: bool,
    pub recognizer_time_fallback: bool,
    pub date_formats: Vec<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            case_insensitive: false,
            recognizer_time_fallback: false,
            date_formats: vec!["%B %d, %Y".to_string(), "%Y-%m-%d".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchemaConfig {
    pub table: String,
    pub check_in_column: String,
    pub check_out_column: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            table: "Employee".to_string(),
            check_in_column: "check_in".to_string(),
            check_out_column: "check_out".to_string(),
        }
    }
}

impl AttendConfig {
    /// Load from a TOML file (optional) with `ATTEND__SECTION__KEY` env overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("ATTEND")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_schema() {
        let config = AttendConfig::default();
        assert_eq!(config.schema.table, "Employee");
        assert_eq!(config.schema.check_in_column, "check_in");
        assert_eq!(config.translation.utc_offset_minutes, 330);
        assert!(!config.translation.case_insensitive);
        assert_eq!(config.http.port, 5001);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[translation]\ncase_insensitive = true\n\n[http]\nenabled = false\nhost = \"127.0.0.1\"\nport = 9000").unwrap();

        let config = AttendConfig::load(file.path().to_str().unwrap()).unwrap();
        assert!(config.translation.case_insensitive);
        assert_eq!(config.translation.utc_offset_minutes, 330);
        assert_eq!(config.http.port, 9000);
        assert!(!config.http.enabled);
        assert_eq!(config.schema.check_out_column, "check_out");
    }

    #[test]
    fn test_load_partial_service_section() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[service]\nlog_level = \"debug\"").unwrap();

        let config = AttendConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.service.socket_path, "/tmp/attend.sock");
    }

    #[test]
    fn test_single_env_override_keeps_section_defaults() {
        std::env::set_var("ATTEND__HTTP__PORT", "9000");
        let loaded = AttendConfig::load("/nonexistent/attend-env-config");
        std::env::remove_var("ATTEND__HTTP__PORT");

        let config = loaded.unwrap();
        assert_eq!(config.http.port, 9000);
        assert!(config.http.enabled);
        assert_eq!(config.http.host, "0.0.0.0");
    }

    #[test]
    fn test_load_missing_file_is_all_defaults() {
        let config = AttendConfig::load("/nonexistent/attend-config").unwrap();
        assert_eq!(config.service.socket_path, "/tmp/attend.sock");
        assert_eq!(config.extractor.max_input_chars, 2000);
    }
}
