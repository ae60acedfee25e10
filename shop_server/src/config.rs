use std::env;

use log::*;
use order_engine::sqlite_db::db_url;
use wallet_gateway::WalletGatewayConfig;

const DEFAULT_SHOP_HOST: &str = "127.0.0.1";
const DEFAULT_SHOP_PORT: u16 = 8360;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The size of the database connection pool
    pub max_connections: u32,
    /// External wallet provider configuration. It is handed to the provider client once, at start-up.
    pub wallet: WalletGatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SHOP_HOST.to_string(),
            port: DEFAULT_SHOP_PORT,
            database_url: String::default(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            wallet: WalletGatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SHOP_HOST").ok().unwrap_or_else(|| DEFAULT_SHOP_HOST.into());
        let port = parse_port(env::var("SHOP_PORT").ok());
        let database_url = db_url();
        let max_connections = parse_max_connections(env::var("SHOP_DB_MAX_CONNECTIONS").ok());
        let wallet = WalletGatewayConfig::new_from_env_or_default();
        Self { host, port, database_url, max_connections, wallet }
    }
}

fn parse_port(value: Option<String>) -> u16 {
    value
        .map(|s| {
            s.parse::<u16>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid port for SHOP_PORT. {e} Using the default, {DEFAULT_SHOP_PORT}, instead.");
                DEFAULT_SHOP_PORT
            })
        })
        .unwrap_or(DEFAULT_SHOP_PORT)
}

fn parse_max_connections(value: Option<String>) -> u32 {
    match value.map(|s| s.parse::<u32>()) {
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            warn!(
                "🪛️ Invalid configuration value for SHOP_DB_MAX_CONNECTIONS. Using the default of \
                 {DEFAULT_DB_MAX_CONNECTIONS}."
            );
            DEFAULT_DB_MAX_CONNECTIONS
        },
        None => DEFAULT_DB_MAX_CONNECTIONS,
    }
}
