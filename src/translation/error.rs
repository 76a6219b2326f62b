//! 翻译模块统一错误处理
//!
//! 引擎内部的单个节点失败从不以错误形式出现，这里的错误只属于
//! 外部协作方：配置、词库加载、设置持久化与词条导出。

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 词库不可用（为空、格式错误或全部来源失败）
    #[error("词库不可用: {0}")]
    DictionaryUnavailable(String),

    /// 回退规则错误
    #[error("回退规则无效: {0}")]
    RuleError(String),

    /// 设置存储错误
    #[error("设置存储错误: {0}")]
    SettingsError(String),

    /// 词条导出错误
    #[error("词条导出错误: {0}")]
    ExportError(String),

    /// 文件读写错误
    #[error("IO错误: {0}")]
    IoError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::IoError(_) => true,
            TranslationError::DictionaryUnavailable(_) => true,
            TranslationError::ConfigError(_) => false,
            TranslationError::ParseError(_) => false,
            TranslationError::RuleError(_) => false,
            TranslationError::SettingsError(_) => false,
            TranslationError::ExportError(_) => false,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::RuleError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::DictionaryUnavailable(_) => ErrorCategory::Dictionary,
            TranslationError::SettingsError(_) => ErrorCategory::Persistence,
            TranslationError::IoError(_) => ErrorCategory::Persistence,
            TranslationError::ExportError(_) => ErrorCategory::Export,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let wrap = |msg: String| format!("{} (上下文: {})", msg, context);

        match self {
            TranslationError::ConfigError(msg) => TranslationError::ConfigError(wrap(msg)),
            TranslationError::NetworkError(msg) => TranslationError::NetworkError(wrap(msg)),
            TranslationError::ParseError(msg) => TranslationError::ParseError(wrap(msg)),
            TranslationError::DictionaryUnavailable(msg) => {
                TranslationError::DictionaryUnavailable(wrap(msg))
            }
            TranslationError::RuleError(msg) => TranslationError::RuleError(wrap(msg)),
            TranslationError::SettingsError(msg) => TranslationError::SettingsError(wrap(msg)),
            TranslationError::ExportError(msg) => TranslationError::ExportError(wrap(msg)),
            TranslationError::IoError(msg) => TranslationError::IoError(wrap(msg)),
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Parsing,
    Dictionary,
    Persistence,
    Export,
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::ParseError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        TranslationError::NetworkError(error.to_string())
    }
}

impl From<regex::Error> for TranslationError {
    fn from(error: regex::Error) -> Self {
        TranslationError::RuleError(error.to_string())
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
