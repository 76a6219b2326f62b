//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::env::EnvVar;
use crate::translation::error::{TranslationError, TranslationResult};

/// 引擎配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub enabled: bool,
    pub dictionary_sources: Vec<String>,
    pub bilingual: bool,
    pub settings_path: Option<String>,

    // 解析器配置
    pub cache_capacity: usize,
    pub max_key_length: usize,

    // 调度配置
    pub budget_threshold_us: u64,
    pub idle_timeout_ms: u64,
    pub frame_budget_ms: u64,

    // 网络配置
    pub request_timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dictionary_sources: Vec::new(),
            bilingual: false,
            settings_path: None,

            cache_capacity: constants::MAX_CACHE_ENTRIES,
            max_key_length: constants::MAX_KEY_LENGTH,

            budget_threshold_us: constants::BUDGET_THRESHOLD.as_micros() as u64,
            idle_timeout_ms: constants::IDLE_TIMEOUT.as_millis() as u64,
            frame_budget_ms: constants::DEFAULT_FRAME_BUDGET.as_millis() as u64,

            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl TranslationConfig {
    /// 创建带指定词库来源的默认配置
    pub fn with_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dictionary_sources: sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.cache_capacity == 0 {
            return Err(TranslationError::ConfigError("缓存容量不能为0".to_string()));
        }

        if self.max_key_length == 0 {
            return Err(TranslationError::ConfigError("词条最大长度不能为0".to_string()));
        }

        // 每次预算必须能覆盖阈值，否则调度永远无法推进
        if self.frame_budget() <= self.budget_threshold() {
            return Err(TranslationError::ConfigError(format!(
                "帧预算 {}ms 必须大于调度阈值 {}us",
                self.frame_budget_ms, self.budget_threshold_us
            )));
        }

        // 回退宿主每次只报告固定的剩余时间，阈值必须低于它
        if self.budget_threshold() >= constants::FALLBACK_TIME_REMAINING {
            return Err(TranslationError::ConfigError(format!(
                "调度阈值 {}us 必须小于回退预算 {}us",
                self.budget_threshold_us,
                constants::FALLBACK_TIME_REMAINING.as_micros()
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时必须大于0".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖，只处理显式设置的变量
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{dictionary, engine};

        if let Some(enabled) = env_override::<engine::Enabled, _>() {
            self.enabled = enabled;
        }

        if let Some(sources) = env_override::<dictionary::Sources, _>() {
            if !sources.is_empty() {
                tracing::info!("环境变量覆盖词库来源: {:?}", sources);
                self.dictionary_sources = sources;
            }
        }

        if let Some(timeout) = env_override::<dictionary::RequestTimeout, _>() {
            self.request_timeout_secs = timeout.as_secs();
        }

        if let Some(capacity) = env_override::<engine::CacheCapacity, _>() {
            self.cache_capacity = capacity;
        }

        if let Some(max_key_length) = env_override::<engine::MaxKeyLength, _>() {
            self.max_key_length = max_key_length;
        }

        if let Some(frame_budget) = env_override::<engine::FrameBudget, _>() {
            self.frame_budget_ms = frame_budget.as_millis() as u64;
        }

        if let Some(bilingual) = env_override::<engine::Bilingual, _>() {
            self.bilingual = bilingual;
        }
    }

    /// 转换为Duration类型
    pub fn budget_threshold(&self) -> Duration {
        Duration::from_micros(self.budget_threshold_us)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 读取显式设置的环境变量，值无效时记录警告并忽略
fn env_override<V, T>() -> Option<T>
where
    V: EnvVar<T>,
{
    match V::get_if_set()? {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("忽略环境变量: {}", e);
            None
        }
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建配置管理器
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let expanded_path = shellexpand::tilde(path);
        let mut config = Self::load_from_file(&expanded_path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 从文件加载配置
    fn load_config() -> TranslationResult<TranslationConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        // 查找配置文件
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        Self::parse_config(path, &content)
    }

    /// 按扩展名解析配置内容，TOML 以外一律按 JSON 处理
    fn parse_config(path: &str, content: &str) -> TranslationResult<TranslationConfig> {
        if path.ends_with(".toml") {
            toml::from_str(content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TranslationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_capacity, 2000);
        assert_eq!(config.max_key_length, 300);
        assert_eq!(config.budget_threshold(), Duration::from_micros(500));
        assert_eq!(config.idle_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = TranslationConfig {
            cache_capacity: 0,
            ..TranslationConfig::default()
        };
        assert!(matches!(config.validate(), Err(TranslationError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_budget_below_threshold() {
        let config = TranslationConfig {
            frame_budget_ms: 0,
            ..TranslationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_above_fallback_budget() {
        let config = TranslationConfig {
            budget_threshold_us: 1000,
            frame_budget_ms: 50,
            ..TranslationConfig::default()
        };
        assert!(matches!(config.validate(), Err(TranslationError::ConfigError(_))));

        let config = TranslationConfig {
            budget_threshold_us: 999,
            ..TranslationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ConfigManager::parse_config(
            "livedict.toml",
            "dictionary_sources = [\"i18n/zh-cn.json\"]\nbilingual = true\n",
        )
        .unwrap();

        assert_eq!(config.dictionary_sources, vec!["i18n/zh-cn.json".to_string()]);
        assert!(config.bilingual);
        assert_eq!(config.cache_capacity, constants::MAX_CACHE_ENTRIES);
    }

    #[test]
    fn test_json_config() {
        let config =
            ConfigManager::parse_config("livedict.json", r#"{"max_key_length": 120}"#).unwrap();
        assert_eq!(config.max_key_length, 120);
    }

    #[test]
    fn test_generate_example_config_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livedict.toml");
        let path = path.to_str().unwrap();

        ConfigManager::generate_example_config(path).unwrap();
        let manager = ConfigManager::from_file(path).unwrap();
        assert!(manager.get_config().validate().is_ok());
    }
}
