//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `KIOSK__*` 覆盖（双下划线表示嵌套，如 `KIOSK__APP__USE_MOCK_DATA=false`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::agent::registry::PRODUCT_CATALOGUE_AGENT;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub query: QuerySection,
    #[serde(default)]
    pub auth: AuthSection,
}

/// [app] 段：终端名称、数据模式、数据目录
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// true 时所有数据服务调用返回内置样例数据，不访问后端
    #[serde(default = "default_use_mock_data")]
    pub use_mock_data: bool,
    /// 样例模式下模拟的网络延迟
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
    /// 会话文件与日志所在目录，未设置时用 ./data
    pub data_dir: Option<PathBuf>,
    /// 登录框留空时使用的测试标识
    #[serde(default = "default_identifier")]
    pub default_identifier: String,
}

fn default_app_name() -> String {
    "Banking Kiosk".to_string()
}

fn default_use_mock_data() -> bool {
    true
}

fn default_mock_delay_ms() -> u64 {
    500
}

fn default_identifier() -> String {
    "TEST123".to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            use_mock_data: default_use_mock_data(),
            mock_delay_ms: default_mock_delay_ms(),
            data_dir: None,
            default_identifier: default_identifier(),
        }
    }
}

impl AppSection {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }
}

/// [api] 段：后端地址与超时
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// [agent] 段：智能体事件通道。endpoint 为空时，样例模式用 Mock 通道，否则禁用
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSection {
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default = "default_account_id")]
    pub account_id: String,
    #[serde(default = "default_widget_key")]
    pub widget_key: String,
}

fn default_app_id() -> String {
    PRODUCT_CATALOGUE_AGENT.widget.app_id.to_string()
}

fn default_account_id() -> String {
    PRODUCT_CATALOGUE_AGENT.widget.account_id.to_string()
}

fn default_widget_key() -> String {
    PRODUCT_CATALOGUE_AGENT.widget.widget_key.to_string()
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            app_id: default_app_id(),
            account_id: default_account_id(),
            widget_key: default_widget_key(),
        }
    }
}

/// [query] 段：页面数据拉取的重试与缓存
#[derive(Debug, Clone, Deserialize)]
pub struct QuerySection {
    #[serde(default = "default_retry")]
    pub retry: u32,
    /// 首次重试前的等待，之后指数退避，上限 30 秒
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,
}

fn default_retry() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_stale_secs() -> u64 {
    5 * 60
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            retry: default_retry(),
            retry_delay_ms: default_retry_delay_ms(),
            stale_secs: default_stale_secs(),
        }
    }
}

/// [auth] 段
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    /// OTP 倒计时窗口（秒），归零后允许重发
    #[serde(default = "default_otp_window_secs")]
    pub otp_window_secs: u32,
}

fn default_otp_window_secs() -> u32 {
    300
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            otp_window_secs: default_otp_window_secs(),
        }
    }
}

/// 默认配置文件的候选位置，取第一个存在的
const DEFAULT_CONFIG_FILES: [&str; 3] = ["config/default.toml", "../config/default.toml", "default.toml"];

/// 环境变量前缀；`KIOSK__APP__USE_MOCK_DATA=false` 覆盖 [app].use_mock_data
pub const ENV_PREFIX: &str = "KIOSK";

pub fn default_config_file() -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// 加载配置：默认文件（可无）→ 显式指定的文件（必须存在）→ 环境变量 KIOSK__*
///
/// 终端通常由运维指定配置文件启动，路径写错时直接报错，不静默回落到默认值。
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = default_config_file() {
        builder = builder.add_source(config::File::from(path));
    }
    if let Some(path) = config_path {
        if !path.is_file() {
            return Err(config::ConfigError::NotFound(path.display().to_string()));
        }
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
