//! INI file configuration adapter.
//!
//! Recognised sections: `[ingest]`, `[backtest]`, `[output]`. Unknown keys are
//! ignored; missing keys fall back to the caller's default.

use crate::domain::error::SispError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SispError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| SispError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SispError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SispError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Configuration with no keys; every lookup yields its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_all_sections() {
        let content = r#"
[ingest]
max_upload_bytes = 1048576
min_bars = 100

[backtest]
initial_capital = 25000.5
trades_sample_size = 4

[output]
format = csv
pretty = no
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_int("ingest", "max_upload_bytes", 0), 1_048_576);
        assert_eq!(adapter.get_int("ingest", "min_bars", 0), 100);
        assert_eq!(adapter.get_double("backtest", "initial_capital", 0.0), 25000.5);
        assert_eq!(adapter.get_int("backtest", "trades_sample_size", 0), 4);
        assert_eq!(adapter.get_string("output", "format"), Some("csv".to_string()));
        assert!(!adapter.get_bool("output", "pretty", true));
    }

    #[test]
    fn empty_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("output", "format"), None);
        assert_eq!(adapter.get_int("ingest", "min_bars", 60), 60);
        assert_eq!(adapter.get_double("backtest", "initial_capital", 1.5), 1.5);
        assert!(adapter.get_bool("output", "pretty", true));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[ingest]\nmin_bars = abc\n").unwrap();
        assert_eq!(adapter.get_int("ingest", "min_bars", 42), 42);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = not_a_number\n")
                .unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_capital", 99.9), 99.9);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[output]\na = true\nb = YES\nc = 1\nd = off\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("output", "a", false));
        assert!(adapter.get_bool("output", "b", false));
        assert!(adapter.get_bool("output", "c", false));
        assert!(!adapter.get_bool("output", "d", true));
        assert!(!adapter.get_bool("output", "e", true));
        assert!(!adapter.get_bool("output", "f", true));
    }

    #[test]
    fn get_bool_returns_default_for_garbage() {
        let adapter = FileConfigAdapter::from_string("[output]\npretty = maybe\n").unwrap();
        assert!(adapter.get_bool("output", "pretty", true));
        assert!(!adapter.get_bool("output", "pretty", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[output]\nformat = json\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("output", "format"), Some("json".to_string()));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/sisp.ini");
        match result {
            Err(SispError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/path/sisp.ini")
            }
            _ => panic!("expected ConfigParse error"),
        }
    }
}
