/// Configuration management for the API server
///
/// Configuration is read from environment variables, with a `.env` file
/// loaded first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma separated origins, `*` for any (default: `*`)
/// - `API_PRODUCTION`: enables HSTS (default: false)
/// - `JWT_SECRET`: token signing secret, at least 32 characters (required)
/// - `JWT_TTL_HOURS`: access token lifetime (default: 24)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `BOOTSTRAP_ADMIN_EMAIL`, `BOOTSTRAP_ADMIN_PASSWORD`, `BOOTSTRAP_ADMIN_NAME`:
///   first admin account, created at startup when the user table is empty
/// - `RUST_LOG`: log filter (default: `taskdesk_api=debug,tower_http=debug`)
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::env;
use std::str::FromStr;

use taskdesk_shared::auth::jwt::DEFAULT_TTL_HOURS;

/// Minimum JWT secret length, in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub log: LogConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (HTTPS only)
    pub production: bool,
}

impl ApiConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret. Generate with `openssl rand -hex 32`.
    pub secret: String,

    /// Access token lifetime in hours
    pub ttl_hours: i64,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

/// First admin account
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = get_or("API_HOST", "0.0.0.0");
        let port = get_or("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let cors_origins = get_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        let production = get_or("API_PRODUCTION", "false")
            .parse::<bool>()
            .context("API_PRODUCTION must be 'true' or 'false'")?;

        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;
        let max_connections = get_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret =
            lookup("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }
        let ttl_hours = get_or("JWT_TTL_HOURS", &DEFAULT_TTL_HOURS.to_string())
            .parse::<i64>()
            .context("JWT_TTL_HOURS must be an integer")?;
        if ttl_hours <= 0 {
            anyhow::bail!("JWT_TTL_HOURS must be positive");
        }

        let format = get_or("LOG_FORMAT", "pretty").parse::<LogFormat>()?;

        let bootstrap_admin = match (lookup("BOOTSTRAP_ADMIN_EMAIL"), lookup("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: get_or("BOOTSTRAP_ADMIN_NAME", "Administrator"),
                email,
                password,
            }),
            (None, None) => None,
            _ => anyhow::bail!(
                "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
            ),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_hours,
            },
            log: LogConfig { format },
            bootstrap_admin,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/t"), ("JWT_SECRET", SECRET)])
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.ttl_hours, 24);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert!(config.api.allows_any_origin());
        assert!(!config.api.production);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/t"),
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("JWT_TTL_HOURS", "2"),
            ("LOG_FORMAT", "json"),
            ("BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.api.allows_any_origin());
        assert_eq!(config.jwt.ttl_hours, 2);
        assert_eq!(config.log.format, LogFormat::Json);

        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.name, "Administrator");
        assert_eq!(admin.email, "root@example.com");
    }

    #[test]
    fn test_missing_required() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgres://localhost/t")]).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/t"), ("JWT_SECRET", "short")])
            .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [("DATABASE_URL", "postgres://localhost/t"), ("JWT_SECRET", SECRET)];

        let mut vars = base.to_vec();
        vars.push(("API_PORT", "http"));
        assert!(load(&vars).is_err());

        let mut vars = base.to_vec();
        vars.push(("LOG_FORMAT", "xml"));
        assert!(load(&vars).is_err());

        let mut vars = base.to_vec();
        vars.push(("JWT_TTL_HOURS", "0"));
        assert!(load(&vars).is_err());

        let mut vars = base.to_vec();
        vars.push(("BOOTSTRAP_ADMIN_EMAIL", "root@example.com"));
        assert!(load(&vars).is_err());
    }
}
