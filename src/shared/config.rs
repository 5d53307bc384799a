use dotenvy::dotenv;
use log::warn;
use std::env;
use std::path::PathBuf;

const DEFAULT_JWT_SECRET: &str = "dev-secret-key-change-in-production-minimum-32-chars";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
    /// When false the bearer-token guard is skipped entirely. AUTH_REQUIRED=true
    /// turns the login boundary on.
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Directory holding the built SPA bundle. Static hosting is mounted only
    /// when this directory exists.
    pub dist_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default development secret - DO NOT USE IN PRODUCTION");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
            auth: AuthConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
                jwt_secret,
                required: env::var("AUTH_REQUIRED")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
            ui: UiConfig {
                dist_dir: env::var("UI_DIST_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("ui/dist")),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fills_defaults() {
        env::set_var("DATABASE_URL", "postgres://localhost/salesdesk_test");
        env::remove_var("PORT");
        env::remove_var("ADMIN_USERNAME");
        env::remove_var("AUTH_REQUIRED");
        let cfg = AppConfig::load().expect("config should load with defaults");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.auth.username, "admin");
        assert!(!cfg.auth.required);
    }
}
