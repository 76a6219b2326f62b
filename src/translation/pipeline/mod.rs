//! 翻译管道模块
//!
//! 节点资格过滤、工作队列调度与变更监听

pub mod filters;
pub mod scheduler;
pub mod watcher;

pub use filters::{
    are_attributes_eligible, are_children_eligible, in_opaque_region, is_text_eligible,
    is_translatable_attr,
};
pub use scheduler::{
    FrameBudget, IdleDeadline, IdleHost, Scheduler, StepBudget, TimeoutFallback, WorkQueue,
};
pub use watcher::ChangeWatcher;
