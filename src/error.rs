//! 错误类型
//!
//! 按来源划分：记录校验、表单驱动、表格读取、配置。
//! 单行相关的错误在行级别被吸收，只有导航和表格读取失败会终止整批。

use thiserror::Error;

/// 单条记录的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// 四个必填字段中有空值
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// 数量无法转换为整数
    #[error("quantity is not an integer: '{value}'")]
    InvalidQuantity { value: String },
}

/// 表单驱动错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// 打开目标页面失败（超时或网络错误）
    #[error("failed to open {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// 字段无法定位或写入
    #[error("field '{field}' could not be filled: {reason}")]
    Field { field: String, reason: String },

    /// 保存按钮无法定位或点击
    #[error("form submit failed: {0}")]
    Submit(String),

    /// 清空表单失败（非致命）
    #[error("form clear failed: {0}")]
    Clear(String),

    /// 浏览器会话已关闭或不可用
    #[error("browser session unavailable: {0}")]
    Session(String),
}

impl DriverError {
    pub fn field(field: impl Into<String>, reason: impl ToString) -> Self {
        DriverError::Field {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    pub fn navigation(url: impl Into<String>, reason: impl ToString) -> Self {
        DriverError::Navigation {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// 表格读取错误
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not open workbook {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("workbook {path} has no worksheets")]
    NoSheet { path: String },

    #[error("could not read worksheet '{sheet}': {reason}")]
    Sheet { sheet: String, reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {var_name}: '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DriverError::Session(err.to_string())
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = RecordError::MissingField { field: "category" };
        assert_eq!(err.to_string(), "missing required field: category");
    }

    #[test]
    fn test_driver_error_into_app_error() {
        let err: AppError = DriverError::field("cliente", "timeout").into();
        assert!(err.to_string().contains("cliente"));
        assert!(err.to_string().contains("timeout"));
    }
}
