use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

/// Password the admin identity is provisioned with when none is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Deserialize)]
pub struct KeywardConfig {
    pub hostname: String,
    pub port: u16,
    pub public_url: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    /// Optional TLS configuration for automatic Let's Encrypt certificates.
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Password the singleton admin is created with on first start. Ignored
    /// once the identity exists; rotate through the panel instead.
    #[serde(default = "default_initial_password")]
    pub initial_password: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// How often the expired-session sweeper runs.
    #[serde(default = "default_session_sweep_minutes")]
    pub session_sweep_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// Domains to obtain certificates for, e.g. ["keys.example.com"]
    pub domains: Vec<String>,
    /// ACME contact email, e.g. "admin@example.com"
    pub contact_email: String,
    /// Directory to cache certificates (default: "data/certs")
    #[serde(default = "default_cert_cache")]
    pub cert_cache: String,
    /// Use Let's Encrypt production directory (default: false = staging)
    #[serde(default)]
    pub production: bool,
}

fn default_initial_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

fn default_session_ttl_hours() -> i64 {
    24
}

fn default_session_sweep_minutes() -> u64 {
    60
}

fn default_cert_cache() -> String {
    "data/certs".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            initial_password: default_initial_password(),
            session_ttl_hours: default_session_ttl_hours(),
            session_sweep_minutes: default_session_sweep_minutes(),
        }
    }
}

impl KeywardConfig {
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("KEYWARD_").split("__"))
            .extract()
    }
}
