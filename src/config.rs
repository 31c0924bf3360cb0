/*
 * Responsibility
 * - 環境変数の読み込み (DATABASE_URL, CORS, Auth0 domain / audience / algorithms)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - Authorizer に注入する AuthSettings の組み立て
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
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

/// Everything the Authorizer needs to verify a token.
///
/// Built once at startup and injected; nothing under `services::auth` reads
/// the environment itself.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Identity-provider host, e.g. `dev-xxxx.us.auth0.com`.
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
    pub jwks_cache_ttl: Duration,
    pub jwks_timeout: Duration,
    /// Minimum spacing of refetches triggered by an unknown `kid`.
    pub jwks_min_refresh: Duration,
}

impl AuthSettings {
    /// `iss` every accepted token must carry.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    pub auth: AuthSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 5000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = Duration::from_secs(seconds_or("REQUEST_TIMEOUT_SECONDS", 30)?);

        let domain = std::env::var("AUTH0_DOMAIN")
            .map_err(|_| ConfigError::Missing("AUTH0_DOMAIN"))?
            .trim()
            .trim_end_matches('/')
            .to_string();
        if domain.is_empty() || domain.contains("://") {
            return Err(ConfigError::Invalid("AUTH0_DOMAIN"));
        }

        let audience =
            std::env::var("API_AUDIENCE").map_err(|_| ConfigError::Missing("API_AUDIENCE"))?;
        if audience.trim().is_empty() {
            return Err(ConfigError::Invalid("API_AUDIENCE"));
        }

        let algorithms =
            parse_algorithms(&std::env::var("ALGORITHMS").unwrap_or_else(|_| "RS256".into()))?;

        let auth = AuthSettings {
            domain,
            audience,
            algorithms,
            leeway_seconds: seconds_or("TOKEN_LEEWAY_SECONDS", 0)?,
            jwks_cache_ttl: Duration::from_secs(seconds_or("JWKS_CACHE_TTL_SECONDS", 300)?),
            jwks_timeout: Duration::from_secs(seconds_or("JWKS_TIMEOUT_SECONDS", 5)?.max(1)),
            jwks_min_refresh: Duration::from_secs(seconds_or("JWKS_MIN_REFRESH_SECONDS", 30)?),
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            request_timeout,
            auth,
        })
    }
}

fn seconds_or(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    parse_seconds(key, std::env::var(key).ok().as_deref(), default)
}

/// Unset means `default`; set but not a whole number of seconds is an error.
fn parse_seconds(key: &'static str, raw: Option<&str>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid(key)),
    }
}

/// Parses a comma separated algorithm list.
///
/// Keys are rebuilt from RSA `n`/`e` components, so only the RSA family
/// (`RS*`, `PS*`) is accepted. Symmetric algorithms would let anyone holding
/// the public key mint tokens.
fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();

    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg = Algorithm::from_str(name).map_err(|_| ConfigError::Invalid("ALGORITHMS"))?;
        match alg {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => {
                if !algorithms.contains(&alg) {
                    algorithms.push(alg);
                }
            }
            _ => return Err(ConfigError::Invalid("ALGORITHMS")),
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("ALGORITHMS"));
    }

    Ok(algorithms)
}
