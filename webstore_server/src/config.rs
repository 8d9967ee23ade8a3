use std::env;

use log::*;
use ws_common::Secret;

const DEFAULT_WSS_HOST: &str = "127.0.0.1";
const DEFAULT_WSS_PORT: u16 = 4450;
const DEFAULT_STORE_NAME: &str = "The Webstore";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret for the administrative routes. Requests present it in the `x-admin-auth` header. When unset,
    /// every admin request is rejected.
    pub admin_api_key: Option<Secret<String>>,
    /// Store name used in order-confirmation mail.
    pub store_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WSS_HOST.to_string(),
            port: DEFAULT_WSS_PORT,
            database_url: String::default(),
            admin_api_key: None,
            store_name: DEFAULT_STORE_NAME.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("WSS_HOST").ok().unwrap_or_else(|| DEFAULT_WSS_HOST.into());
        let port = env::var("WSS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for WSS_PORT. {e} Using the default, {DEFAULT_WSS_PORT}, instead."
                    );
                    DEFAULT_WSS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_WSS_PORT);
        let database_url = env::var("WSS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ WSS_DATABASE_URL is not set. Please set it to the URL for the store database.");
            String::default()
        });
        let admin_api_key = match env::var("WSS_ADMIN_API_KEY") {
            Ok(s) if !s.is_empty() => Some(Secret::new(s)),
            _ => {
                warn!(
                    "🪛️ WSS_ADMIN_API_KEY is not set. Administrative routes will reject every request until it is \
                     configured."
                );
                None
            },
        };
        let store_name = env::var("WSS_STORE_NAME").ok().unwrap_or_else(|| {
            info!("🪛️ WSS_STORE_NAME is not set. Using the default, \"{DEFAULT_STORE_NAME}\".");
            DEFAULT_STORE_NAME.into()
        });
        Self { host, port, database_url, admin_api_key, store_name }
    }
}
