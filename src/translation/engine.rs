//! 翻译引擎
//!
//! 引擎是一个显式的上下文对象，持有词库、解析器（含缓存）、双语策略、
//! 调度器、变更监听器状态和改写台账。一个进程内可以同时存在多个互不
//! 干扰的引擎实例。
//!
//! ## 工作流程
//! 1. `install_dictionary` 装入词库（清空缓存）
//! 2. `start` 全树遍历入队并建立变更监听
//! 3. `run_until_idle` 在宿主授予的空闲预算内分批排空队列
//! 4. 外部修改后 `pump_changes` 把受影响的节点送回队列
//! 5. `toggle_bilingual` / `refresh_dictionary` 触发完整重走
//!
//! ## 改写台账
//! 对每个改写过的 (节点, 槽位)，引擎记下原文和写入的输出。再次处理时，
//! 如果当前值仍等于记录的输出，就从记录的原文重新解析；宿主改过的值
//! 则被视为新的原文。这样完整重走可以在双语与单语之间来回切换，
//! 缓存中已有的键不需要重新查词库。

use std::collections::HashMap;
use std::sync::Arc;

use super::bilingual::BilingualPolicy;
use super::config::{constants, TranslationConfig};
use super::dictionary::{Dictionary, DictionaryLoader};
use super::error::TranslationResult;
use super::pipeline::filters::{are_attributes_eligible, are_children_eligible, is_text_eligible};
use super::pipeline::scheduler::{IdleDeadline, IdleHost, Scheduler};
use super::pipeline::watcher::ChangeWatcher;
use super::resolver::Resolver;
use super::storage::cache::CacheStats;
use super::storage::settings::SettingsStore;
use super::tree::{ChangeSource, MutableTree, NodeKind, TreeChange};

/// 节点上可被改写的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Text,
    Attribute(&'static str),
}

/// 一次改写的记录
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rendition {
    source: String,
    output: String,
}

/// 引擎统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// 出队并处理的节点数
    pub nodes_processed: usize,
    /// 出队时已脱离文档而被丢弃的节点数
    pub nodes_discarded: usize,
    /// 写回的文本节点数
    pub texts_rewritten: usize,
    /// 写回的属性数
    pub attributes_rewritten: usize,
    /// 运行过的排空周期数
    pub cycles: usize,
    /// 完整重走次数
    pub rewalks: usize,
}

impl EngineStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 翻译引擎
pub struct Engine<T: MutableTree> {
    tree: T,
    enabled: bool,
    dictionary: Option<Arc<Dictionary>>,
    resolver: Resolver,
    policy: BilingualPolicy,
    scheduler: Scheduler<T::Node>,
    watcher: ChangeWatcher,
    ledger: HashMap<(T::Node, Slot), Rendition>,
    stats: EngineStats,
    started: bool,
}

impl<T: MutableTree> Engine<T> {
    /// 创建引擎；此时还没有词库，调度请求都是空操作
    pub fn new(tree: T, config: &TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;

        Ok(Self {
            tree,
            enabled: config.enabled,
            dictionary: None,
            resolver: Resolver::new(config)?,
            policy: BilingualPolicy::new(config.bilingual),
            scheduler: Scheduler::new(config),
            watcher: ChangeWatcher::new(),
            ledger: HashMap::new(),
            stats: EngineStats::default(),
            started: false,
        })
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn into_tree(self) -> T {
        self.tree
    }

    pub fn has_dictionary(&self) -> bool {
        self.dictionary.is_some()
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_deref()
    }

    /// 装入新词库并清空缓存；引擎已启动时触发完整重走
    pub fn install_dictionary(&mut self, dictionary: Dictionary) {
        tracing::info!("词库已装入，共 {} 条", dictionary.len());

        self.dictionary = Some(Arc::new(dictionary));
        self.resolver.clear_cache();

        if self.started {
            self.full_rewalk();
        }
    }

    /// 回到"无词库"状态，之后的调度请求都被拒绝
    pub fn clear_dictionary(&mut self) {
        self.dictionary = None;
        self.resolver.clear_cache();
    }

    /// 从外部加载器强制刷新词库；失败时保留原词库
    pub fn refresh_dictionary(&mut self, loader: &DictionaryLoader) -> bool {
        match loader.load() {
            Some(dictionary) => {
                self.install_dictionary(dictionary);
                true
            }
            None => {
                if self.dictionary.is_some() {
                    tracing::warn!("词库刷新失败，继续使用当前词库");
                }
                false
            }
        }
    }

    /// 从设置存储恢复双语开关
    pub fn restore_settings(&mut self, settings: &dyn SettingsStore) {
        let enabled = settings.get_bool(constants::BILINGUAL_SETTING_KEY, self.policy.is_enabled());
        self.policy.set_enabled(enabled);
    }

    pub fn is_bilingual(&self) -> bool {
        self.policy.is_enabled()
    }

    /// 翻转双语开关，持久化后完整重走，返回新状态
    ///
    /// 缓存保持不变：命中的译文按新策略重新格式化即可。
    pub fn toggle_bilingual(&mut self, settings: &mut dyn SettingsStore) -> TranslationResult<bool> {
        let enabled = !self.policy.is_enabled();
        settings.set_bool(constants::BILINGUAL_SETTING_KEY, enabled)?;

        self.policy.set_enabled(enabled);
        tracing::info!("双语模式已{}", if enabled { "开启" } else { "关闭" });

        if self.started {
            self.full_rewalk();
        }
        Ok(enabled)
    }

    /// 节点入队；真正入队时请求一个排空周期
    pub fn enqueue(&mut self, node: T::Node) -> bool {
        let queued = self.scheduler.enqueue(node);
        if queued {
            self.schedule_processing();
        }
        queued
    }

    /// 请求排空周期
    ///
    /// 已有周期、队列为空、没有词库或引擎被禁用时都是空操作。
    pub fn schedule_processing(&mut self) -> bool {
        if !self.enabled || self.dictionary.is_none() {
            return false;
        }
        self.scheduler.request()
    }

    pub fn is_processing(&self) -> bool {
        self.scheduler.is_processing()
    }

    pub fn queue_len(&self) -> usize {
        self.scheduler.queue().len()
    }

    /// 在一次空闲授予内排空队列，返回处理的节点数
    ///
    /// 预算用尽而队列非空时重新请求下一个周期，保持先进先出顺序。
    pub fn run_cycle<D: IdleDeadline + ?Sized>(&mut self, deadline: &D) -> usize {
        let Some(dictionary) = self.dictionary.clone() else {
            self.scheduler.finish();
            return 0;
        };

        let root = self.tree.root();
        let mut processed = 0;

        while !self.scheduler.queue().is_empty() && self.scheduler.has_budget(deadline) {
            let Some(node) = self.scheduler.dequeue() else {
                break;
            };

            if node != root && !self.tree.is_attached(&node) {
                self.forget(&node);
                self.stats.nodes_discarded += 1;
                continue;
            }

            self.process_node(&dictionary, &node);
            processed += 1;

            if are_children_eligible(&self.tree, &node) {
                for child in self.tree.children(&node) {
                    self.scheduler.enqueue(child);
                }
            }
        }

        self.stats.nodes_processed += processed;
        self.stats.cycles += 1;
        self.scheduler.finish();

        tracing::debug!(
            "排空周期结束：处理 {} 个节点，剩余 {} 个",
            processed,
            self.scheduler.queue().len()
        );

        if !self.scheduler.queue().is_empty() {
            self.schedule_processing();
        }

        processed
    }

    /// 显式任务循环：只要还有周期被请求就向宿主申请预算
    ///
    /// 队列排空或宿主不再授予时返回，返回处理的节点总数。
    pub fn run_until_idle<H: IdleHost>(&mut self, host: &mut H) -> usize {
        let mut total = 0;

        while self.scheduler.is_processing() {
            match host.grant(self.scheduler.idle_timeout()) {
                Some(deadline) => total += self.run_cycle(&deadline),
                None => break,
            }
        }

        total
    }

    /// 完整重走：清空队列成员，从根节点先序遍历可处理的子树并全部入队
    pub fn full_rewalk(&mut self) {
        self.scheduler.reset();
        self.prune_ledger();

        let root = self.tree.root();
        let mut stack = vec![root];
        let mut walked = 0;

        while let Some(node) = stack.pop() {
            if are_children_eligible(&self.tree, &node) {
                let children = self.tree.children(&node);
                stack.extend(children.into_iter().rev());
            }
            self.scheduler.enqueue(node);
            walked += 1;
        }

        self.stats.rewalks += 1;
        tracing::info!("完整重走：{} 个节点入队", walked);

        self.schedule_processing();
    }

    /// 丢弃已脱离文档的节点的改写记录，返回丢弃的条数
    pub fn prune_ledger(&mut self) -> usize {
        let before = self.ledger.len();
        let tree = &self.tree;
        self.ledger.retain(|(node, _), _| tree.is_attached(node));

        let pruned = before - self.ledger.len();
        if pruned > 0 {
            tracing::debug!("清理 {} 条脱离文档的改写记录", pruned);
        }
        pruned
    }

    /// 改写台账中的记录条数
    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.resolver.cache_stats()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn process_node(&mut self, dictionary: &Dictionary, node: &T::Node) {
        match self.tree.kind(node) {
            NodeKind::Text => {
                if !is_text_eligible(&self.tree, node) {
                    return;
                }
                let Some(current) = self.tree.text(node) else {
                    return;
                };
                if let Some(value) = self.rewrite(dictionary, node, Slot::Text, &current) {
                    self.tree.set_text(node, &value);
                    self.stats.texts_rewritten += 1;
                }
            }
            NodeKind::Element => {
                if !are_attributes_eligible(&self.tree, node) {
                    return;
                }
                for &name in constants::TRANSLATABLE_ATTRS {
                    let Some(current) = self.tree.attribute(node, name) else {
                        continue;
                    };
                    if let Some(value) =
                        self.rewrite(dictionary, node, Slot::Attribute(name), &current)
                    {
                        self.tree.set_attribute(node, name, &value);
                        self.stats.attributes_rewritten += 1;
                    }
                }
            }
            NodeKind::Other => {}
        }
    }

    /// 计算槽位的新值；值不变时返回 `None`
    fn rewrite(
        &mut self,
        dictionary: &Dictionary,
        node: &T::Node,
        slot: Slot,
        current: &str,
    ) -> Option<String> {
        let key = (node.clone(), slot);

        let rendered = match self.ledger.get(&key) {
            Some(rendition) if rendition.output == current => Some(rendition.source.clone()),
            Some(_) => {
                self.ledger.remove(&key);
                None
            }
            None => None,
        };
        let source = rendered.clone().unwrap_or_else(|| current.to_string());

        let output = match self.resolver.resolve(dictionary, &self.policy, &source) {
            Some(output) => {
                self.ledger.insert(
                    key,
                    Rendition {
                        source,
                        output: output.clone(),
                    },
                );
                output
            }
            None => {
                // 以前改写过但现在没有译文：还原原文
                self.ledger.remove(&key);
                rendered?
            }
        };

        (output != current).then_some(output)
    }

    fn forget(&mut self, node: &T::Node) {
        self.ledger.remove(&(node.clone(), Slot::Text));
        for &name in constants::TRANSLATABLE_ATTRS {
            self.ledger.remove(&(node.clone(), Slot::Attribute(name)));
        }
    }
}

impl<T: ChangeSource> Engine<T> {
    /// 初始遍历并建立变更监听；没有词库时拒绝启动
    pub fn start(&mut self) -> bool {
        if !self.enabled {
            tracing::info!("翻译已禁用");
            return false;
        }
        if self.dictionary.is_none() {
            tracing::error!("词库为空，未执行翻译。");
            return false;
        }

        self.started = true;
        self.full_rewalk();
        self.watcher.establish(&self.tree);
        true
    }

    /// 取出一批变更通知，把受影响的节点入队；有相关变更时请求一次排空周期
    pub fn pump_changes(&mut self) -> bool {
        if !self.watcher.is_established() {
            return false;
        }

        let records = self.tree.take_records();
        if records.is_empty() {
            return false;
        }

        // 移除的子树不会再出队，它们的改写记录只能在这里回收
        let removed_any = records
            .iter()
            .any(|record| matches!(record, TreeChange::ChildList { removed, .. } if !removed.is_empty()));
        if removed_any {
            self.prune_ledger();
        }

        let relevant = self.watcher.collect(records, &mut self.scheduler);
        if relevant {
            self.schedule_processing();
        }
        relevant
    }
}
