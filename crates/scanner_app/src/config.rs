use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use scanner_core::{IsbnRule, MessageTtl, ScannerSettings};
use scanner_engine::LookupSettings;
use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogDestination;

const DEFAULT_CONFIG_FILE: &str = "scanner.ron";
const CONFIG_ENV: &str = "ISBN_SCANNER_CONFIG";
const DEFAULT_TICK_MS: u64 = 75;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid log level {0:?}")]
    LogLevel(String),
}

/// Everything the host needs, mapped onto the crates' own settings types.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scanner: ScannerSettings,
    pub lookup: LookupSettings,
    /// Start scanning without waiting for `:start`.
    pub autostart: bool,
    /// External decoder output (file or FIFO), one code per line.
    pub decoder_input: Option<PathBuf>,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
    pub tick: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerSettings::default(),
            lookup: LookupSettings::default(),
            autostart: false,
            decoder_input: None,
            log_destination: LogDestination::default(),
            log_level: LevelFilter::Info,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    scan: ScanSection,
    lookup: LookupSection,
    app: AppSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ScanSection {
    threshold: u32,
    isbn_prefixes: Vec<String>,
    isbn_length: usize,
    verify_checksum: bool,
    success_message_ms: u64,
    error_message_ms: u64,
    stop_after_accept: bool,
}

impl Default for ScanSection {
    fn default() -> Self {
        let settings = ScannerSettings::default();
        Self {
            threshold: settings.threshold,
            isbn_prefixes: settings.rule.prefixes,
            isbn_length: settings.rule.length,
            verify_checksum: settings.rule.verify_checksum,
            success_message_ms: settings.message_ttl.success.as_millis() as u64,
            error_message_ms: settings.message_ttl.error.as_millis() as u64,
            stop_after_accept: settings.stop_after_accept,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct LookupSection {
    endpoint: String,
    api_key: Option<String>,
    connect_timeout_ms: u64,
    request_timeout_ms: u64,
    max_bytes: u64,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl Default for LookupSection {
    fn default() -> Self {
        let settings = LookupSettings::default();
        Self {
            endpoint: settings.endpoint,
            api_key: settings.api_key,
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            max_bytes: settings.max_bytes,
            max_retries: settings.max_retries,
            retry_backoff_ms: settings.retry_backoff.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct AppSection {
    autostart: bool,
    decoder_input: Option<PathBuf>,
    log_destination: LogDestination,
    log_level: String,
    tick_ms: u64,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            autostart: false,
            decoder_input: None,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl FileConfig {
    fn into_app_config(self) -> Result<AppConfig, ConfigError> {
        let log_level = self
            .app
            .log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::LogLevel(self.app.log_level.clone()))?;

        let scan = self.scan;
        let scanner = ScannerSettings {
            threshold: scan.threshold,
            rule: IsbnRule {
                prefixes: scan.isbn_prefixes,
                length: scan.isbn_length,
                verify_checksum: scan.verify_checksum,
            },
            message_ttl: MessageTtl {
                success: Duration::from_millis(scan.success_message_ms),
                error: Duration::from_millis(scan.error_message_ms),
            },
            stop_after_accept: scan.stop_after_accept,
        };

        let lookup = self.lookup;
        let lookup = LookupSettings {
            endpoint: lookup.endpoint,
            api_key: lookup.api_key.filter(|key| !key.is_empty()),
            connect_timeout: Duration::from_millis(lookup.connect_timeout_ms),
            request_timeout: Duration::from_millis(lookup.request_timeout_ms),
            max_bytes: lookup.max_bytes,
            max_retries: lookup.max_retries,
            retry_backoff: Duration::from_millis(lookup.retry_backoff_ms),
        };

        Ok(AppConfig {
            scanner,
            lookup,
            autostart: self.app.autostart,
            decoder_input: self.app.decoder_input,
            log_destination: self.app.log_destination,
            log_level,
            tick: Duration::from_millis(self.app.tick_ms.max(1)),
        })
    }
}

/// Loads `$ISBN_SCANNER_CONFIG`, or `./scanner.ron` when that is unset.
///
/// A missing default file means defaults; a missing file that was named
/// explicitly is an error.
pub fn load() -> Result<AppConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_from(Path::new(&path), true),
        None => load_from(Path::new(DEFAULT_CONFIG_FILE), false),
    }
}

pub fn load_from(path: &Path, required: bool) -> Result<AppConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse(&text, path)
}

fn parse(text: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let file: FileConfig = ron::from_str(text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    file.into_app_config()
}
