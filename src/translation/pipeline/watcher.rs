//! 变更监听器
//!
//! 把一批树变更通知转成工作队列中的节点：插入的节点本身、属性或文本
//! 被修改的节点。移除事件不产生工作。

use std::hash::Hash;

use super::filters::is_translatable_attr;
use super::scheduler::Scheduler;
use crate::translation::config::constants;
use crate::translation::tree::{ChangeSource, TreeChange};

/// 变更监听器，整个生命周期内只建立一次
#[derive(Debug, Default)]
pub struct ChangeWatcher {
    established: bool,
}

impl ChangeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在变更来源上开始监听；重复建立是空操作，返回 `false`
    pub fn establish<S: ChangeSource + ?Sized>(&mut self, source: &S) -> bool {
        if self.established {
            return false;
        }

        source.observe(constants::TRANSLATABLE_ATTRS);
        self.established = true;
        tracing::debug!("变更监听已建立");
        true
    }

    pub fn is_established(&self) -> bool {
        self.established
    }

    /// 把一批变更中受影响的节点送入队列，返回这批变更是否需要处理
    pub fn collect<N>(&self, records: Vec<TreeChange<N>>, scheduler: &mut Scheduler<N>) -> bool
    where
        N: Clone + Eq + Hash,
    {
        let mut relevant = false;

        for record in records {
            match record {
                TreeChange::ChildList { added, .. } => {
                    for node in added {
                        scheduler.enqueue(node);
                        relevant = true;
                    }
                }
                TreeChange::Attribute { target, name } => {
                    if is_translatable_attr(&name) {
                        scheduler.enqueue(target);
                        relevant = true;
                    }
                }
                TreeChange::Text { target } => {
                    scheduler.enqueue(target);
                    relevant = true;
                }
            }
        }

        relevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::config::TranslationConfig;

    fn scheduler() -> Scheduler<u32> {
        Scheduler::new(&TranslationConfig::default())
    }

    #[test]
    fn test_removed_nodes_are_ignored() {
        let watcher = ChangeWatcher::new();
        let mut scheduler = scheduler();

        let relevant = watcher.collect(
            vec![TreeChange::ChildList {
                target: 1,
                added: vec![],
                removed: vec![2, 3],
            }],
            &mut scheduler,
        );

        assert!(!relevant);
        assert!(scheduler.queue().is_empty());
    }

    #[test]
    fn test_added_and_mutated_nodes_are_enqueued_once() {
        let watcher = ChangeWatcher::new();
        let mut scheduler = scheduler();

        let relevant = watcher.collect(
            vec![
                TreeChange::ChildList {
                    target: 1,
                    added: vec![10, 11],
                    removed: vec![],
                },
                TreeChange::Text { target: 10 },
                TreeChange::Attribute {
                    target: 12,
                    name: "title".to_string(),
                },
                TreeChange::Attribute {
                    target: 13,
                    name: "class".to_string(),
                },
            ],
            &mut scheduler,
        );

        assert!(relevant);
        assert_eq!(scheduler.queue().len(), 3);
        assert!(!scheduler.queue().contains(&13));
    }
}
