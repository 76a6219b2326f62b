//! # Livedict Library
//!
//! 在持续变化的文档树中，按词库把界面文本增量替换为译文。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型与输入输出辅助函数
//! - `env` - 环境变量
//! - `parsers` - HTML 解析与文档树适配器
//! - `translation` - 翻译引擎

pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;

pub use crate::core::*;
