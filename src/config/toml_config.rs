use crate::utils::error::{ResolverError, Result};
use crate::utils::validation::{
    validate_api_path, validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "coord-resolver.toml";
pub const DEFAULT_API_BASE: &str = "https://dualsubstrate-commercial.fly.dev";
pub const MIN_HOPS: u32 = 1;
pub const MAX_HOPS: u32 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub api: ApiConfig,
    pub walk: WalkConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub decode_path: String,
    pub walk_path: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub headers: HashMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            decode_path: "/web4/decode".to_string(),
            walk_path: "/api/chat/coord/walk".to_string(),
            timeout_seconds: Some(30),
            retry_attempts: 0,
            retry_delay_ms: 500,
            headers: HashMap::new(),
        }
    }
}

impl ApiConfig {
    pub fn decode_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.decode_path)
    }

    pub fn walk_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.walk_path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub max_hops: u32,
    pub current_coherence: f64,
    pub show_hop_numbers: bool,
    pub show_inspection: bool,
    /// 每一跳之間的停頓 (毫秒)，dashboard 用來呈現逐步展開的效果
    pub hop_delay_ms: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_hops: 5,
            current_coherence: 0.8,
            show_hop_numbers: true,
            show_inspection: true,
            hop_delay_ms: 0,
        }
    }
}

impl WalkConfig {
    pub fn hop_delay(&self) -> Duration {
        Duration::from_millis(self.hop_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"))
}

impl ResolverConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ResolverError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 指定路徑時必須存在；未指定時嘗試目前目錄下的預設檔，找不到就用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("📁 Loading configuration from: {}", path.display());
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::debug!("📁 Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${LEDGER_TOKEN})；未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_api_path("api.decode_path", &self.api.decode_path)?;
        validate_api_path("api.walk_path", &self.api.walk_path)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 600)?;
        }
        validate_range("api.retry_attempts", self.api.retry_attempts, 0, 10)?;

        validate_range("walk.max_hops", self.walk.max_hops, MIN_HOPS, MAX_HOPS)?;
        validate_range(
            "walk.current_coherence",
            self.walk.current_coherence,
            0.0,
            1.0,
        )?;

        validate_non_empty_string("server.host", &self.server.host)?;

        Ok(())
    }
}

impl Validate for ResolverConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let config = ResolverConfig::from_toml_str("").unwrap();

        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(
            config.api.decode_url(),
            "https://dualsubstrate-commercial.fly.dev/web4/decode"
        );
        assert_eq!(config.walk.max_hops, 5);
        assert_eq!(config.walk.current_coherence, 0.8);
        assert!(config.walk.show_hop_numbers);
        assert_eq!(config.server.port, 8501);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[api]
base_url = "http://localhost:9000/"
timeout_seconds = 5
retry_attempts = 2

[api.headers]
x-ledger-client = "resolver"

[walk]
max_hops = 3
show_inspection = false
"#;

        let config = ResolverConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.walk_url(), "http://localhost:9000/api/chat/coord/walk");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.api.retry_attempts, 2);
        assert_eq!(
            config.api.headers.get("x-ledger-client").map(String::as_str),
            Some("resolver")
        );
        assert_eq!(config.walk.max_hops, 3);
        assert!(!config.walk.show_inspection);
        assert!(config.walk.show_hop_numbers);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COORD_RESOLVER_TEST_BASE", "https://ledger.test");

        let toml_content = r#"
[api]
base_url = "${COORD_RESOLVER_TEST_BASE}"
"#;

        let config = ResolverConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://ledger.test");

        std::env::remove_var("COORD_RESOLVER_TEST_BASE");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = ResolverConfig::from_toml_str("[api]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let too_many_hops = ResolverConfig::from_toml_str("[walk]\nmax_hops = 11\n").unwrap();
        assert!(too_many_hops.validate().is_err());

        let bad_path = ResolverConfig::from_toml_str("[api]\ndecode_path = \"decode\"\n").unwrap();
        assert!(bad_path.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ResolverConfig::from_toml_str("[walk\nmax_hops = 3").unwrap_err();
        assert!(matches!(err, ResolverError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 9100\n")
            .unwrap();

        let config = ResolverConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
