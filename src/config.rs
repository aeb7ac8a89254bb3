/*
 * Responsibility
 * - Command line flags (environment selection)
 * - Load `.env.<env>` then `.env`, then read settings from the environment
 * - Validate values (missing / invalid → startup failure)
 */
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use clap::{Parser, ValueEnum};

use crate::middleware::cors::CorsConfig;
use crate::services::auth::DEFAULT_TOKEN_TTL_SECONDS;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BUCKET_REGION: &str = "eu-north-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "api-scaffold", version, about = "HTTP API scaffold")]
pub struct Cli {
    /// Environment to run in; selects the `.env.<env>` file.
    #[arg(long = "env", value_enum, env = "APP_ENV", default_value = "development")]
    pub env: AppEnv,
}

impl Cli {
    /// Load `.env.<env>` and then `.env` from the working directory and
    /// return the files that were read. Values already present in the process
    /// environment win, then the environment-specific file.
    ///
    /// Runs before tracing is installed; the caller logs the result.
    pub fn load_env_files(&self) -> Vec<PathBuf> {
        self.load_env_files_from(Path::new("."))
    }

    fn load_env_files_from(&self, dir: &Path) -> Vec<PathBuf> {
        [format!(".env.{}", self.env.as_str()), ".env".to_owned()]
            .into_iter()
            .map(|name| dir.join(name))
            .filter(|path| dotenvy::from_path(path).is_ok())
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub client_url: Option<String>,
    pub debug: bool,

    pub database_url: String,

    pub jwt_secret: String,
    pub token_ttl: TimeDelta,

    pub cors: CorsConfig,

    pub aws_bucket: String,
    pub aws_region: String,
    pub mail_from: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret or credentials embedded in the database URL
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("client_url", &self.client_url)
            .field("debug", &self.debug)
            .field("token_ttl", &self.token_ttl)
            .field("cors", &self.cors)
            .field("aws_bucket", &self.aws_bucket)
            .field("aws_region", &self.aws_region)
            .field("mail_from", &self.mail_from)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env(app_env: AppEnv) -> Result<Self, ConfigError> {
        Self::from_lookup(app_env, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(app_env: AppEnv, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = get("API_HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("API_HOST"))?;

        let port: u16 = match get("API_PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("API_PORT"))?,
            None => DEFAULT_PORT,
        };

        let client_url = get("CLIENT_URL");

        let debug = match get("DEBUG") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("DEBUG"))?,
            None => false,
        };

        let database_url = get("DB_URL").ok_or(ConfigError::Missing("DB_URL"))?;

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl_seconds = match get("TOKEN_TTL_SECONDS") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid("TOKEN_TTL_SECONDS"))?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };
        let token_ttl = TimeDelta::try_seconds(token_ttl_seconds)
            .ok_or(ConfigError::Invalid("TOKEN_TTL_SECONDS"))?;

        let mut allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_default();
        if allowed_origins.is_empty()
            && app_env.is_production()
            && let Some(client_url) = &client_url
        {
            allowed_origins.push(client_url.clone());
        }

        let credentials = match get("CORS_ALLOW_CREDENTIALS") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("CORS_ALLOW_CREDENTIALS"))?,
            None => false,
        };

        let max_age = match get("CORS_MAX_AGE_SECONDS") {
            Some(v) => Some(Duration::from_secs(
                v.parse()
                    .map_err(|_| ConfigError::Invalid("CORS_MAX_AGE_SECONDS"))?,
            )),
            None => None,
        };

        let cors = CorsConfig {
            allowed_origins,
            allowed_methods: get("CORS_ALLOWED_METHODS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            allowed_headers: get("CORS_ALLOWED_HEADERS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            credentials,
            max_age,
        };

        let aws_bucket = get("AWS_BUCKET").ok_or(ConfigError::Missing("AWS_BUCKET"))?;
        let aws_region =
            get("AWS_BUCKET_REGION").unwrap_or_else(|| DEFAULT_BUCKET_REGION.to_string());
        let mail_from = get("MAIL_FROM").ok_or(ConfigError::Missing("MAIL_FROM"))?;

        Ok(Self {
            addr: SocketAddr::new(host, port),
            app_env,
            client_url,
            debug,
            database_url,
            jwt_secret,
            token_ttl,
            cors,
            aws_bucket,
            aws_region,
            mail_from,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DB_URL", "postgres://localhost/app"),
        ("JWT_SECRET", "s3cret"),
        ("AWS_BUCKET", "media"),
        ("MAIL_FROM", "noreply@example.com"),
    ];

    fn with_required(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(extra);
        pairs
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(AppEnv::Development, lookup(&REQUIRED)).unwrap();

        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.token_ttl, TimeDelta::seconds(3600));
        assert_eq!(config.aws_region, "eu-north-1");
        assert!(!config.debug);
        assert_eq!(config.cors, CorsConfig::default());
    }

    #[test]
    fn reports_missing_required_values() {
        let err = Config::from_lookup(AppEnv::Development, lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DB_URL"));

        let pairs = [
            ("DB_URL", "postgres://localhost/app"),
            ("JWT_SECRET", "  "),
        ];
        let err = Config::from_lookup(AppEnv::Development, lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn rejects_invalid_values() {
        let pairs = with_required(&[("API_PORT", "http")]);
        let err = Config::from_lookup(AppEnv::Development, lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("API_PORT"));

        let pairs = with_required(&[("TOKEN_TTL_SECONDS", "0")]);
        let err = Config::from_lookup(AppEnv::Development, lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("TOKEN_TTL_SECONDS"));

        let pairs = with_required(&[("TOKEN_TTL_SECONDS", "9223372036854775807")]);
        let err = Config::from_lookup(AppEnv::Development, lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("TOKEN_TTL_SECONDS"));

        let pairs = with_required(&[("DEBUG", "maybe")]);
        let err = Config::from_lookup(AppEnv::Development, lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("DEBUG"));
    }

    #[test]
    fn parses_cors_settings() {
        let pairs = with_required(&[
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("CORS_ALLOWED_METHODS", "GET,POST"),
            ("CORS_ALLOW_CREDENTIALS", "true"),
            ("CORS_MAX_AGE_SECONDS", "600"),
        ]);
        let config = Config::from_lookup(AppEnv::Development, lookup(&pairs)).unwrap();

        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.cors.allowed_methods, vec!["GET", "POST"]);
        assert!(config.cors.allowed_headers.is_empty());
        assert!(config.cors.credentials);
        assert_eq!(config.cors.max_age, Some(Duration::from_secs(600)));
    }

    #[test]
    fn production_defaults_origins_to_client_url() {
        let pairs = with_required(&[("CLIENT_URL", "https://app.example")]);

        let prod = Config::from_lookup(AppEnv::Production, lookup(&pairs)).unwrap();
        assert_eq!(prod.cors.allowed_origins, vec!["https://app.example"]);

        let dev = Config::from_lookup(AppEnv::Development, lookup(&pairs)).unwrap();
        assert!(dev.cors.allowed_origins.is_empty());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::from_lookup(AppEnv::Development, lookup(&REQUIRED)).unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("postgres://"));
    }

    #[test]
    fn env_specific_file_wins_over_base_file() {
        let dir = std::env::temp_dir().join(format!("api-scaffold-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(".env.production"),
            "API_SCAFFOLD_LAYERED=production\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(".env"),
            "API_SCAFFOLD_LAYERED=base\nAPI_SCAFFOLD_BASE_ONLY=yes\n",
        )
        .unwrap();

        let cli = Cli {
            env: AppEnv::Production,
        };
        let loaded = cli.load_env_files_from(&dir);

        assert_eq!(loaded, vec![dir.join(".env.production"), dir.join(".env")]);
        assert_eq!(
            std::env::var("API_SCAFFOLD_LAYERED").as_deref(),
            Ok("production")
        );
        assert_eq!(std::env::var("API_SCAFFOLD_BASE_ONLY").as_deref(), Ok("yes"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_env_files_are_skipped() {
        let cli = Cli {
            env: AppEnv::Development,
        };
        let dir = std::env::temp_dir().join("api-scaffold-env-missing");

        assert!(cli.load_env_files_from(&dir).is_empty());
    }

    #[test]
    fn parses_env_flag() {
        let cli = Cli::try_parse_from(["api-scaffold", "--env", "production"]).unwrap();
        assert_eq!(cli.env, AppEnv::Production);
    }
}
