use crate::config::service_config::{ServiceConfig, StoreBackend};
use crate::utils::error::{ListingError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub database: Option<DatabaseSection>,
    pub query: Option<QuerySection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub listen_addr: Option<String>,
    pub cors: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub backend: Option<StoreBackend>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySection {
    pub max_page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub json: Option<bool>,
    pub verbose: Option<bool>,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ListingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ListingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MONGODB_URI})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        placeholder_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Layers the file's values over the built-in defaults.
    pub fn to_service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::default();

        if let Some(server) = &self.server {
            if let Some(addr) = &server.listen_addr {
                config.listen_addr = addr.clone();
            }
            config.cors_enabled = server.cors.unwrap_or(config.cors_enabled);
        }

        if let Some(database) = &self.database {
            config.backend = database.backend.unwrap_or(config.backend);
            if database.url.is_some() {
                config.database_url = database.url.clone();
            }
            if let Some(name) = &database.name {
                config.database_name = name.clone();
            }
            if let Some(collection) = &database.collection {
                config.collection = collection.clone();
            }
        }

        if let Some(query) = &self.query {
            config.max_page_size = query.max_page_size.unwrap_or(config.max_page_size);
        }

        if let Some(logging) = &self.logging {
            config.json_logs = logging.json.unwrap_or(config.json_logs);
            config.verbose = logging.verbose.unwrap_or(config.verbose);
        }

        config
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_service_config().validate()
    }
}
