use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "form_submit.toml";

/// 表单字段 id 与按钮选择器
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormLayout {
    pub customer_field: String,
    pub item_field: String,
    pub quantity_field: String,
    /// 下拉框
    pub category_field: String,
    /// 保存按钮的 CSS 选择器
    pub save_button: String,
    /// 清空按钮的 CSS 选择器
    pub clear_button: String,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            customer_field: "cliente".to_string(),
            item_field: "produto".to_string(),
            quantity_field: "quantidade".to_string(),
            category_field: "categoria".to_string(),
            save_button: "button.btn-save".to_string(),
            clear_button: "button.btn-clear".to_string(),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 目标表单 URL
    pub target_url: String,
    /// 默认读取的表格文件
    pub input_file: PathBuf,
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 设置后连接已打开的浏览器而不是启动新浏览器
    pub browser_debug_port: Option<u16>,
    pub chrome_executable: Option<PathBuf>,
    /// 打开页面的超时
    pub navigation_timeout_ms: u64,
    /// 等待元素出现的超时
    pub element_timeout_ms: u64,
    /// 打开页面后的等待时间
    pub navigation_settle_ms: u64,
    /// 每次填写字段后的等待时间
    pub fill_delay_ms: u64,
    /// 点击保存后的等待时间
    pub submit_delay_ms: u64,
    /// 点击清空后的等待时间
    pub action_delay_ms: u64,
    pub form: FormLayout,
    /// 输出日志文件，不设置则只输出到控制台
    pub log_file: Option<PathBuf>,
    /// 失败明细文件
    pub failure_report_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://devaprender-contabil.netlify.app/".to_string(),
            input_file: PathBuf::from("data.xlsx"),
            headless: false,
            browser_debug_port: None,
            chrome_executable: None,
            navigation_timeout_ms: 30_000,
            element_timeout_ms: 10_000,
            navigation_settle_ms: 2_000,
            fill_delay_ms: 300,
            submit_delay_ms: 1_000,
            action_delay_ms: 500,
            form: FormLayout::default(),
            log_file: Some(PathBuf::from("form_submit.log")),
            failure_report_file: PathBuf::from("failures.txt"),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    ///
    /// 配置文件路径取 `FORM_SUBMIT_CONFIG`，否则为当前目录下的 `form_submit.toml`，
    /// 文件不存在时跳过。
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FORM_SUBMIT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            debug!("配置文件 {} 不存在，使用默认配置", path.display());
            Self::default()
        };

        config.apply_env()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("TARGET_URL") {
            self.target_url = url;
        }
        if let Ok(path) = std::env::var("INPUT_FILE") {
            self.input_file = PathBuf::from(path);
        }
        if let Some(headless) = env_parse::<bool>("HEADLESS", "bool")? {
            self.headless = headless;
        }
        if let Some(port) = env_parse::<u16>("BROWSER_DEBUG_PORT", "port number")? {
            self.browser_debug_port = Some(port);
        }
        if let Ok(path) = std::env::var("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(PathBuf::from(path));
        }
        if let Some(ms) = env_parse::<u64>("NAVIGATION_TIMEOUT_MS", "u64")? {
            self.navigation_timeout_ms = ms;
        }
        if let Some(ms) = env_parse::<u64>("NAVIGATION_SETTLE_MS", "u64")? {
            self.navigation_settle_ms = ms;
        }
        if let Some(ms) = env_parse::<u64>("ACTION_DELAY_MS", "u64")? {
            self.action_delay_ms = ms;
        }
        if let Some(ms) = env_parse::<u64>("ELEMENT_TIMEOUT_MS", "u64")? {
            self.element_timeout_ms = ms;
        }
        if let Some(ms) = env_parse::<u64>("FILL_DELAY_MS", "u64")? {
            self.fill_delay_ms = ms;
        }
        if let Some(ms) = env_parse::<u64>("SUBMIT_DELAY_MS", "u64")? {
            self.submit_delay_ms = ms;
        }
        if let Ok(path) = std::env::var("OUTPUT_LOG_FILE") {
            self.log_file = Some(PathBuf::from(path));
        }
        Ok(self)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    pub fn fill_delay(&self) -> Duration {
        Duration::from_millis(self.fill_delay_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }
}

fn env_parse<T: FromStr>(
    var_name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
        Err(_) => Ok(None),
    }
}
