//! # Shop Configuration
//!
//! Configuration for the terminal and its services.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VOLTA_BACKEND=sqlite                                               │
//! │     VOLTA_ADVISOR_API_KEY=...                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/volta-terminal/volta.toml (Linux)                        │
//! │     ~/Library/Application Support/com.volta.terminal/volta.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! phone = "01711-000000"
//! name = { en = "Volta Electric & Solar", bn = "ভোল্টা ইলেকট্রিক অ্যান্ড সোলার" }
//! address = { en = "12 Elephant Road, Dhaka", bn = "১২ এলিফ্যান্ট রোড, ঢাকা" }
//!
//! [locale]
//! default_language = "bn"
//!
//! [delivery]
//! inside_city_taka = 60
//! outside_city_taka = 120
//!
//! [remote]
//! backend = "sqlite"
//! database_path = "/var/lib/volta/volta.db"
//! timeout_ms = 10000
//!
//! [[staff]]
//! username = "admin"
//! password_hash = "$argon2id$v=19$..."
//! role = "admin"
//!
//! [advisor]
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! model = "gemini-1.5-flash"
//!
//! [session]
//! dir = "/var/lib/volta/session"
//!
//! [server]
//! bind_addr = "127.0.0.1:8787"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use volta_core::checkout::DeliveryFees;
use volta_core::invoice::StoreInfo;
use volta_core::{Bilingual, Language, Money, Role};

use crate::error::{ShopError, ShopResult};

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleSettings {
    #[serde(default)]
    pub default_language: Language,
}

/// Flat delivery fee per zone, in whole taka.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySettings {
    #[serde(default = "default_inside_city")]
    pub inside_city_taka: i64,
    #[serde(default = "default_outside_city")]
    pub outside_city_taka: i64,
}

fn default_inside_city() -> i64 {
    volta_core::DEFAULT_FEE_INSIDE_CITY_TAKA
}

fn default_outside_city() -> i64 {
    volta_core::DEFAULT_FEE_OUTSIDE_CITY_TAKA
}

impl Default for DeliverySettings {
    fn default() -> Self {
        DeliverySettings {
            inside_city_taka: default_inside_city(),
            outside_city_taka: default_outside_city(),
        }
    }
}

impl DeliverySettings {
    pub fn fees(&self) -> DeliveryFees {
        DeliveryFees {
            inside_city: Money::from_taka(self.inside_city_taka),
            outside_city: Money::from_taka(self.outside_city_taka),
        }
    }
}

/// Which document store adapter backs the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Process memory. Data is lost on restart.
    Memory,
    #[default]
    Sqlite,
}

impl std::str::FromStr for Backend {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Backend::Memory),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(ShopError::InvalidConfig(format!(
                "Unknown backend: '{}'. Valid options: memory, sqlite",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub backend: Backend,

    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Bound on every remote call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            backend: Backend::default(),
            database_path: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// A configured staff login. Staff accounts never live in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAccount {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSettings {
    #[serde(default = "default_advisor_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_advisor_model")]
    pub model: String,

    /// Only read from `VOLTA_ADVISOR_API_KEY`; never written to the file.
    #[serde(skip)]
    pub api_key: Option<String>,

    #[serde(default = "default_advisor_timeout")]
    pub timeout_secs: u64,
}

fn default_advisor_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_advisor_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_advisor_timeout() -> u64 {
    20
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        AdvisorSettings {
            endpoint: default_advisor_endpoint(),
            model: default_advisor_model(),
            api_key: None,
            timeout_secs: default_advisor_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Directory of the session slot files. `None` keeps sessions in memory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_store_info() -> StoreInfo {
    StoreInfo {
        name: Bilingual::new("Volta Electric & Solar", "ভোল্টা ইলেকট্রিক অ্যান্ড সোলার"),
        address: Bilingual::new("Dhaka, Bangladesh", "ঢাকা, বাংলাদেশ"),
        phone: String::new(),
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default = "default_store_info")]
    pub store: StoreInfo,

    #[serde(default)]
    pub locale: LocaleSettings,

    #[serde(default)]
    pub delivery: DeliverySettings,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub staff: Vec<StaffAccount>,

    #[serde(default)]
    pub advisor: AdvisorSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            store: default_store_info(),
            locale: LocaleSettings::default(),
            delivery: DeliverySettings::default(),
            remote: RemoteSettings::default(),
            staff: Vec::new(),
            advisor: AdvisorSettings::default(),
            session: SessionSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl ShopConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (volta.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ShopResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ShopError::ConfigLoadFailed(e.to_string()))?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> ShopResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `VOLTA_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(lang) = lookup("VOLTA_LANGUAGE") {
            match lang.parse::<Language>() {
                Ok(parsed) => self.locale.default_language = parsed,
                Err(_) => warn!(lang = %lang, "Unknown language in environment"),
            }
        }

        if let Some(backend) = lookup("VOLTA_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding backend from environment");
                    self.remote.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown backend in environment"),
            }
        }

        if let Some(path) = lookup("VOLTA_DATABASE_PATH") {
            self.remote.database_path = Some(PathBuf::from(path));
        }

        if let Some(ms) = lookup("VOLTA_REMOTE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.remote.timeout_ms = ms;
        }

        if let Some(fee) = lookup("VOLTA_FEE_INSIDE_CITY").and_then(|v| v.parse().ok()) {
            self.delivery.inside_city_taka = fee;
        }

        if let Some(fee) = lookup("VOLTA_FEE_OUTSIDE_CITY").and_then(|v| v.parse().ok()) {
            self.delivery.outside_city_taka = fee;
        }

        if let Some(endpoint) = lookup("VOLTA_ADVISOR_ENDPOINT") {
            self.advisor.endpoint = endpoint;
        }

        if let Some(key) = lookup("VOLTA_ADVISOR_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.advisor.api_key = Some(key);
        }

        if let Some(dir) = lookup("VOLTA_SESSION_DIR") {
            self.session.dir = Some(PathBuf::from(dir));
        }

        if let Some(addr) = lookup("VOLTA_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ShopResult<()> {
        if self.delivery.inside_city_taka < 0 || self.delivery.outside_city_taka < 0 {
            return Err(ShopError::InvalidConfig(
                "delivery fees must not be negative".into(),
            ));
        }

        if self.remote.timeout_ms == 0 {
            return Err(ShopError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if self.remote.backend == Backend::Sqlite && self.database_path().is_none() {
            return Err(ShopError::InvalidConfig(
                "sqlite backend needs database_path".into(),
            ));
        }

        let mut usernames = HashSet::new();
        for account in &self.staff {
            let username = account.username.trim().to_lowercase();
            if username.is_empty() {
                return Err(ShopError::InvalidConfig("staff username is empty".into()));
            }
            if !matches!(account.role, Role::Admin | Role::Pos) {
                return Err(ShopError::InvalidConfig(format!(
                    "staff account '{}' must have role admin or pos",
                    account.username
                )));
            }
            if !usernames.insert(username) {
                return Err(ShopError::InvalidConfig(format!(
                    "duplicate staff username '{}'",
                    account.username
                )));
            }
        }

        let endpoint = Url::parse(&self.advisor.endpoint)
            .map_err(|e| ShopError::InvalidConfig(format!("advisor endpoint: {}", e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ShopError::InvalidConfig(format!(
                "advisor endpoint must be http or https, got: {}",
                self.advisor.endpoint
            )));
        }

        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ShopError::InvalidConfig(format!("bind_addr: {}", e)))?;

        Ok(())
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "volta", "terminal")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("volta.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Configured or platform-default SQLite path.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.remote
            .database_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("volta.db")))
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote.timeout_ms)
    }

    pub fn delivery_fees(&self) -> DeliveryFees {
        self.delivery.fees()
    }

    pub fn bind_addr(&self) -> ShopResult<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .map_err(|e| ShopError::InvalidConfig(format!("bind_addr: {}", e)))
    }
}
