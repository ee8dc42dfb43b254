use std::fmt;
use std::path::{Path, PathBuf};

use crate::digest::{DigestSchedule, DEFAULT_CRON, DEFAULT_TIMEZONE};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the env file.
    EnvFile { path: PathBuf, source: dotenvy::Error },
    /// A variable that must hold a numeric id does not.
    InvalidId { var: &'static str, value: String },
    /// Invalid digest cron expression or timezone.
    InvalidSchedule(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvFile { path, source } => {
                write!(f, "failed to read env file '{}': {}", path.display(), source)
            }
            Self::InvalidId { var, value } => {
                write!(f, "{} must be a numeric id, got '{}'", var, value)
            }
            Self::InvalidSchedule(msg) => write!(f, "invalid digest schedule: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EnvFile { source, .. } => Some(source),
            Self::InvalidId { .. } | Self::InvalidSchedule(_) => None,
        }
    }
}

pub struct Config {
    pub bot_token: String,
    pub notion_secret: String,
    pub database_id: String,
    /// Telegram user ids allowed past `/start`.
    pub authorized_ids: Vec<u64>,
    /// Chat that receives the daily digest; `None` disables it.
    pub digest_chat_id: Option<i64>,
    pub digest_schedule: DigestSchedule,
    /// Chat that receives WARN/ERROR logs.
    pub log_chat_id: Option<i64>,
    /// Directory for log files.
    pub data_dir: PathBuf,
}

/// Load variables from `path`, or from `./.env` if present when `path` is `None`.
/// Variables already set in the environment win.
///
/// An explicit `path` must exist. The default `.env` may be absent, but one
/// that exists and fails to parse is still an error.
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(p) => dotenvy::from_path(p)
            .map_err(|e| ConfigError::EnvFile { path: p.to_path_buf(), source: e }),
        None => allow_missing(Path::new(".env"), dotenvy::dotenv()),
    }
}

fn allow_missing<T>(path: &Path, result: dotenvy::Result<T>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::EnvFile { path: path.to_path_buf(), source: e }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from a variable lookup.
    ///
    /// Missing secrets become empty strings: the bot starts and its calls
    /// fail. See [`Config::missing_settings`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get("BOT_TOKEN").unwrap_or_default();
        let notion_secret = get("NOTION_SECRET").unwrap_or_default();
        let database_id = get("DATABASE_ID").unwrap_or_default();

        let authorized_ids = match get("AUTHORIZED_IDS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_id::<u64>("AUTHORIZED_IDS", s))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let digest_chat_id = match get("DIGEST_CHAT_ID") {
            Some(v) => Some(parse_id::<i64>("DIGEST_CHAT_ID", &v)?),
            None => authorized_ids.first().map(|id| *id as i64),
        };

        let cron = get("DIGEST_CRON").unwrap_or_else(|| DEFAULT_CRON.to_string());
        let tz = get("DIGEST_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let digest_schedule =
            DigestSchedule::parse(&cron, &tz).map_err(ConfigError::InvalidSchedule)?;

        let log_chat_id = get("LOG_CHAT_ID")
            .map(|v| parse_id::<i64>("LOG_CHAT_ID", &v))
            .transpose()?;

        let data_dir = get("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            bot_token,
            notion_secret,
            database_id,
            authorized_ids,
            digest_chat_id,
            digest_schedule,
            log_chat_id,
            data_dir,
        })
    }

    /// Settings left empty, for logging once the subscriber is up.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.bot_token.is_empty() {
            missing.push("BOT_TOKEN");
        }
        if self.notion_secret.is_empty() {
            missing.push("NOTION_SECRET");
        }
        if self.database_id.is_empty() {
            missing.push("DATABASE_ID");
        }
        if self.authorized_ids.is_empty() {
            missing.push("AUTHORIZED_IDS");
        }
        missing
    }
}

fn parse_id<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidId { var, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_full_config() {
        let config = load(&[
            ("BOT_TOKEN", "123456789:ABCdef"),
            ("NOTION_SECRET", "secret_abc"),
            ("DATABASE_ID", "db-1"),
            ("AUTHORIZED_IDS", "476, 999"),
            ("DIGEST_CHAT_ID", "-100200"),
            ("DIGEST_CRON", "0 8 * * 1-5"),
            ("DIGEST_TIMEZONE", "Europe/London"),
            ("LOG_CHAT_ID", "-42"),
            ("DATA_DIR", "/var/lib/taskbot"),
        ])
        .expect("should load full config");
        assert_eq!(config.bot_token, "123456789:ABCdef");
        assert_eq!(config.notion_secret, "secret_abc");
        assert_eq!(config.database_id, "db-1");
        assert_eq!(config.authorized_ids, vec![476, 999]);
        assert_eq!(config.digest_chat_id, Some(-100200));
        assert_eq!(config.digest_schedule.to_string(), "0 8 * * 1-5 (Europe/London)");
        assert_eq!(config.log_chat_id, Some(-42));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/taskbot"));
    }

    #[test]
    fn test_missing_secrets_default_to_empty() {
        let config = load(&[]).expect("empty env still loads");
        assert_eq!(config.bot_token, "");
        assert_eq!(config.notion_secret, "");
        assert_eq!(config.database_id, "");
        assert!(config.authorized_ids.is_empty());
        assert_eq!(config.digest_chat_id, None);
        assert_eq!(config.digest_schedule.to_string(), "30 9 * * * (Europe/Bucharest)");
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(
            config.missing_settings(),
            vec!["BOT_TOKEN", "NOTION_SECRET", "DATABASE_ID", "AUTHORIZED_IDS"]
        );
    }

    #[test]
    fn test_digest_chat_defaults_to_first_authorized() {
        let config = load(&[("AUTHORIZED_IDS", "476,999")]).unwrap();
        assert_eq!(config.digest_chat_id, Some(476));
    }

    #[test]
    fn test_invalid_authorized_id() {
        let err = assert_err(load(&[("AUTHORIZED_IDS", "476,adrian")]));
        assert!(matches!(err, ConfigError::InvalidId { var: "AUTHORIZED_IDS", .. }));
        assert!(err.to_string().contains("adrian"));
    }

    #[test]
    fn test_negative_authorized_id() {
        let err = assert_err(load(&[("AUTHORIZED_IDS", "-5")]));
        assert!(matches!(err, ConfigError::InvalidId { .. }));
    }

    #[test]
    fn test_invalid_log_chat() {
        let err = assert_err(load(&[("LOG_CHAT_ID", "logs")]));
        assert!(matches!(err, ConfigError::InvalidId { var: "LOG_CHAT_ID", .. }));
    }

    #[test]
    fn test_invalid_cron() {
        let err = assert_err(load(&[("DIGEST_CRON", "every morning")]));
        assert!(matches!(err, ConfigError::InvalidSchedule(_)));
    }

    #[test]
    fn test_invalid_timezone() {
        let err = assert_err(load(&[("DIGEST_TIMEZONE", "Nowhere/Land")]));
        assert!(matches!(err, ConfigError::InvalidSchedule(_)));
        assert!(err.to_string().contains("Nowhere/Land"));
    }

    #[test]
    fn test_env_file_not_found() {
        let err = assert_err(load_env_file(Some(Path::new("/nonexistent/path/.env"))));
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }

    #[test]
    fn test_env_file_loads() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"TASKBOT_CONFIG_TEST_MARKER=loaded\n").unwrap();
        load_env_file(Some(file.path())).expect("should load env file");
        assert_eq!(std::env::var("TASKBOT_CONFIG_TEST_MARKER").unwrap(), "loaded");
    }

    #[test]
    fn test_default_env_file_may_be_absent() {
        let missing = Path::new("/nonexistent/path/.env");
        assert!(allow_missing(missing, dotenvy::from_path(missing)).is_ok());
    }

    #[test]
    fn test_malformed_default_env_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"TASKBOT_BROKEN=\"unterminated\n").unwrap();
        let result = allow_missing(file.path(), dotenvy::from_path(file.path()));
        match assert_err(result) {
            ConfigError::EnvFile { path, source } => {
                assert_eq!(path, file.path());
                assert!(!source.not_found());
            }
            other => panic!("expected EnvFile, got {other}"),
        }
    }
}
