//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 仅在变量被显式设置时解析
    fn get_if_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "LIVEDICT_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: off, trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "off" | "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: off, trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 词库相关环境变量
pub mod dictionary {
    use super::*;

    /// 词库来源列表（逗号分隔，文件路径或 http(s) URL）
    pub struct Sources;
    impl EnvVar<Vec<String>> for Sources {
        const NAME: &'static str = "LIVEDICT_DICT_SOURCES";
        const DEFAULT: Option<Vec<String>> = None;
        const DESCRIPTION: &'static str =
            "Comma-separated dictionary sources (file paths or http(s) URLs), tried in order";

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            Ok(value
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect())
        }
    }

    /// 远程词库请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "LIVEDICT_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Remote dictionary request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 300)
        }
    }
}

/// 引擎相关环境变量
pub mod engine {
    use super::*;

    /// 翻译功能启用状态
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "LIVEDICT_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Enable translation of the document tree";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 译文缓存容量
    pub struct CacheCapacity;
    impl EnvVar<usize> for CacheCapacity {
        const NAME: &'static str = "LIVEDICT_CACHE_CAPACITY";
        const DEFAULT: Option<usize> = Some(2000);
        const DESCRIPTION: &'static str = "Translation cache capacity (number of entries)";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1_000_000)
        }
    }

    /// 词条最大长度
    pub struct MaxKeyLength;
    impl EnvVar<usize> for MaxKeyLength {
        const NAME: &'static str = "LIVEDICT_MAX_KEY_LENGTH";
        const DEFAULT: Option<usize> = Some(300);
        const DESCRIPTION: &'static str = "Longest normalized phrase (in characters) worth looking up";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 10_000)
        }
    }

    /// 每次空闲预算
    pub struct FrameBudget;
    impl EnvVar<Duration> for FrameBudget {
        const NAME: &'static str = "LIVEDICT_FRAME_BUDGET";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(16));
        const DESCRIPTION: &'static str = "Idle budget granted to each drain cycle, in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_usize(value, Self::NAME, 1, 1000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }

    /// 双语模式初始值
    pub struct Bilingual;
    impl EnvVar<bool> for Bilingual {
        const NAME: &'static str = "LIVEDICT_BILINGUAL";
        const DEFAULT: Option<bool> = None;
        const DESCRIPTION: &'static str =
            "Force bilingual rendering on or off, overriding the persisted setting";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let seconds = parse_positive_usize(value, var_name, min as usize, max as usize)?;
    Ok(Duration::from_secs(seconds as u64))
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: \"warn\")\n",
        core::LogLevel::NAME,
        core::LogLevel::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        core::NoColor::NAME,
        core::NoColor::DESCRIPTION,
        core::NoColor::DEFAULT
    ));

    docs.push_str("\n## Dictionary\n\n");
    docs.push_str(&format!(
        "- `{}`: {}\n",
        dictionary::Sources::NAME,
        dictionary::Sources::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        dictionary::RequestTimeout::NAME,
        dictionary::RequestTimeout::DESCRIPTION,
        dictionary::RequestTimeout::DEFAULT
    ));

    docs.push_str("\n## Engine\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        engine::Enabled::NAME,
        engine::Enabled::DESCRIPTION,
        engine::Enabled::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        engine::CacheCapacity::NAME,
        engine::CacheCapacity::DESCRIPTION,
        engine::CacheCapacity::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        engine::MaxKeyLength::NAME,
        engine::MaxKeyLength::DESCRIPTION,
        engine::MaxKeyLength::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        engine::FrameBudget::NAME,
        engine::FrameBudget::DESCRIPTION,
        engine::FrameBudget::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {}\n",
        engine::Bilingual::NAME,
        engine::Bilingual::DESCRIPTION
    ));

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert_eq!(core::LogLevel::parse("off").unwrap(), "off");
        assert!(core::LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(engine::Enabled::parse("true").unwrap());
        assert!(engine::Enabled::parse("1").unwrap());
        assert!(engine::Enabled::parse("YES").unwrap());
        assert!(engine::Bilingual::parse("on").unwrap());

        assert!(!engine::Enabled::parse("false").unwrap());
        assert!(!engine::Enabled::parse("0").unwrap());
        assert!(!engine::Bilingual::parse("off").unwrap());

        assert!(engine::Enabled::parse("maybe").is_err());
    }

    #[test]
    fn test_sources_parsing() {
        let sources = dictionary::Sources::parse(
            " i18n/zh-cn.json , https://example.com/zh-cn.json,,",
        )
        .unwrap();
        assert_eq!(
            sources,
            vec![
                "i18n/zh-cn.json".to_string(),
                "https://example.com/zh-cn.json".to_string()
            ]
        );
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(engine::CacheCapacity::parse("2000").unwrap(), 2000);
        assert!(engine::CacheCapacity::parse("0").is_err());
        assert!(engine::CacheCapacity::parse("lots").is_err());

        assert_eq!(
            dictionary::RequestTimeout::parse("10").unwrap(),
            Duration::from_secs(10)
        );
        assert!(dictionary::RequestTimeout::parse("301").is_err());

        assert_eq!(
            engine::FrameBudget::parse("8").unwrap(),
            Duration::from_millis(8)
        );
    }

    #[test]
    fn test_env_docs_mention_every_variable() {
        let docs = generate_env_docs();
        for name in [
            core::LogLevel::NAME,
            dictionary::Sources::NAME,
            engine::CacheCapacity::NAME,
            engine::Bilingual::NAME,
        ] {
            assert!(docs.contains(name), "missing {}", name);
        }
    }
}
