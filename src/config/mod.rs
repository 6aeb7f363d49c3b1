pub mod service_config;
pub mod toml_config;

pub use service_config::{ServiceConfig, StoreBackend};
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "listing-service")]
#[command(about = "Property listing API backed by MongoDB")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to listen on [default: 127.0.0.1:3000]")]
    pub listen_addr: Option<String>,

    #[arg(long, help = "MongoDB connection string (falls back to MONGODB_URI)")]
    pub database_url: Option<String>,

    #[arg(long, help = "Database name [default: real_estate]")]
    pub database_name: Option<String>,

    #[arg(long, help = "Collection holding listings [default: listings]")]
    pub collection: Option<String>,

    #[arg(long, value_enum, help = "Storage backend [default: mongo]")]
    pub backend: Option<StoreBackend>,

    #[arg(long, help = "Upper bound for the `limit` query parameter")]
    pub max_page_size: Option<usize>,

    #[arg(long, help = "Enable permissive CORS")]
    pub cors: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併設定：預設值 < 設定檔 < 命令列參數 < MONGODB_URI (僅補缺)
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let base = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.to_service_config(),
            None => ServiceConfig::default(),
        };
        Ok(self
            .apply_overrides(base)
            .with_env_fallback(|key| std::env::var(key).ok()))
    }

    fn apply_overrides(&self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(addr) = &self.listen_addr {
            config.listen_addr = addr.clone();
        }
        if self.database_url.is_some() {
            config.database_url = self.database_url.clone();
        }
        if let Some(name) = &self.database_name {
            config.database_name = name.clone();
        }
        if let Some(collection) = &self.collection {
            config.collection = collection.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(max) = self.max_page_size {
            config.max_page_size = max;
        }
        config.cors_enabled |= self.cors;
        config.json_logs |= self.json_logs;
        config.verbose |= self.verbose;
        config
    }
}
