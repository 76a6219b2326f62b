//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 解析器相关
    pub const MAX_CACHE_ENTRIES: usize = 2000;
    pub const MAX_KEY_LENGTH: usize = 300;

    // 调度相关
    pub const BUDGET_THRESHOLD: Duration = Duration::from_micros(500);
    pub const IDLE_TIMEOUT: Duration = Duration::from_millis(2000);
    pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_millis(16);
    pub const FALLBACK_TIME_REMAINING: Duration = Duration::from_millis(1);

    // 词库加载
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 设置键
    pub const BILINGUAL_SETTING_KEY: &str = "bilingual_mode";

    // 可翻译属性
    pub const TRANSLATABLE_ATTRS: &[&str] = &["placeholder", "title", "aria-label", "alt"];

    // 文本永不翻译的标签
    pub const IGNORED_TAGS: &[&str] = &[
        "style", "script", "textarea", "code", "pre", "input", "svg", "path", "noscript",
        "meta", "link",
    ];

    // 不透明区域：整棵子树都不可改写
    pub const OPAQUE_TAGS: &[&str] = &["pre", "code", "script", "style", "textarea"];
    pub const OPAQUE_CLASSES: &[&str] = &["monaco-editor", "shiki", "geist-code"];

    // 词条导出
    pub const EXPORT_TAGS: &[&str] = &["h1", "h2", "label", "button"];
    pub const EXPORT_MAX_LENGTH: usize = 80;
    pub const EXPORT_MAX_WORDS: usize = 8;
    pub const SEED_GARBAGE_KEY: &str = "file_path";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "livedict.toml",
        ".livedict.toml",
        "livedict.json",
        "~/.config/livedict/config.toml",
        "/etc/livedict/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置，失败时回退到默认配置
pub fn load_translation_config() -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.get_config().clone(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            TranslationConfig::default()
        }
    }
}
