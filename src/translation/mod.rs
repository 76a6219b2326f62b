//! 翻译模块
//!
//! 在外部持续修改的文档树中增量替换可读文本：
//! - **tree**: 文档树与变更通知的抽象
//! - **dictionary**: 词库与外部加载器
//! - **resolver**: 跳过判断、规范化、词库与正则回退查找
//! - **bilingual**: 双语渲染策略
//! - **pipeline**: 资格过滤、调度器、变更监听
//! - **engine**: 引擎上下文
//! - **storage**: 有界缓存与设置存储
//! - **export**: 词条导出与种子合并
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use livedict::parsers::html::HtmlTree;
//! use livedict::translation::{Dictionary, Engine, FrameBudget, TranslationConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::default();
//! let tree = HtmlTree::parse("<h1>Dashboard</h1>");
//!
//! let mut engine = Engine::new(tree, &config)?;
//! engine.install_dictionary(Dictionary::from_json_str(r#"{"Dashboard": "仪表盘"}"#)?);
//! engine.start();
//! engine.run_until_idle(&mut FrameBudget::from_config(&config));
//!
//! println!("{}", engine.tree().to_html());
//! # Ok(())
//! # }
//! ```

pub mod bilingual;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod resolver;
pub mod storage;
pub mod tree;

pub use bilingual::BilingualPolicy;
pub use config::{ConfigManager, TranslationConfig};
pub use dictionary::{DictEntry, Dictionary, DictionaryLoader, DictionarySource};
pub use engine::{Engine, EngineStats, Slot};
pub use error::{ErrorCategory, TranslationError, TranslationResult};
pub use export::{is_extractable_headline, merge_seed, merge_seed_files, ExportSink, TermExport};
pub use pipeline::{
    ChangeWatcher, FrameBudget, IdleDeadline, IdleHost, StepBudget, TimeoutFallback, WorkQueue,
};
pub use resolver::{normalize_key, should_skip, FallbackRule, Resolver};
pub use storage::{CachedTranslation, JsonFileSettings, MemorySettings, SettingsStore, TranslationCache};
pub use tree::{ChangeSource, MutableTree, NodeKind, TreeChange};
