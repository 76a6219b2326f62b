//! 存储模块
//!
//! 提供译文缓存和设置持久化功能。

pub mod cache;
pub mod settings;

pub use cache::{CacheStats, CachedTranslation, TranslationCache};
pub use settings::{JsonFileSettings, MemorySettings, SettingsStore};
