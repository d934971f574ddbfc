use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub payment_gateway: PaymentGatewayConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentGatewayConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MailerConfig {
    pub base_url: String,
    pub api_key: String,
    pub from_address: String,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // No config file means we run entirely on environment variables
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // The database URL has no sensible default
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    payment_gateway: PaymentGatewayConfig {
                        base_url: get_env("PAYMENT_GATEWAY_BASE_URL")
                            .unwrap_or_else(|| "https://api.paiement.example.sn".to_string()),
                        api_key: get_env("PAYMENT_GATEWAY_API_KEY").unwrap_or_default(),
                    },
                    mailer: MailerConfig {
                        base_url: get_env("MAILER_BASE_URL").unwrap_or_default(),
                        api_key: get_env("MAILER_API_KEY").unwrap_or_default(),
                        from_address: get_env("MAILER_FROM_ADDRESS").unwrap_or_default(),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Environment variables win even when the file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("PAYMENT_GATEWAY_BASE_URL") {
            config.payment_gateway.base_url = v;
        }
        if let Ok(v) = env::var("PAYMENT_GATEWAY_API_KEY") {
            config.payment_gateway.api_key = v;
        }
        if let Ok(v) = env::var("MAILER_BASE_URL") {
            config.mailer.base_url = v;
        }
        if let Ok(v) = env::var("MAILER_API_KEY") {
            config.mailer.api_key = v;
        }
        if let Ok(v) = env::var("MAILER_FROM_ADDRESS") {
            config.mailer.from_address = v;
        }

        Ok(config)
    }
}
