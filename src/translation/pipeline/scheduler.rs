//! 遍历调度器
//!
//! 本模块提供去重的工作队列与协作式时间预算：
//!
//! - **工作队列**: 先进先出，节点只有在真正出队时才离开"已排队"集合，
//!   任意时刻同一节点最多出现一次
//! - **空闲预算**: 宿主按次授予一段空闲时间（[`IdleHost::grant`]），
//!   每次授予附带剩余时间估计（[`IdleDeadline::time_remaining`]）
//! - **重入保护**: 单个布尔标志保证同一时刻只有一个排空周期被请求或运行
//!
//! 预算来源有三种实现：按帧计时的 [`FrameBudget`]、定时器近似的
//! [`TimeoutFallback`]（每次授予总是报告 1ms），以及测试用的确定性
//! [`StepBudget`]。

use std::cell::Cell;
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::translation::config::{constants, TranslationConfig};

/// 去重的先进先出工作队列
#[derive(Debug)]
pub struct WorkQueue<N> {
    pending: VecDeque<N>,
    queued: HashSet<N>,
}

impl<N: Clone + Eq + Hash> WorkQueue<N> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            queued: HashSet::new(),
        }
    }

    /// 节点尚未排队时入队，返回是否真正入队
    pub fn enqueue(&mut self, node: N) -> bool {
        if !self.queued.insert(node.clone()) {
            return false;
        }
        self.pending.push_back(node);
        true
    }

    /// 取出队首节点并将其移出"已排队"集合
    pub fn dequeue(&mut self) -> Option<N> {
        let node = self.pending.pop_front()?;
        self.queued.remove(&node);
        Some(node)
    }

    /// 清空队列与成员集合
    pub fn reset(&mut self) {
        self.pending.clear();
        self.queued.clear();
    }

    pub fn contains(&self, node: &N) -> bool {
        self.queued.contains(node)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<N: Clone + Eq + Hash> Default for WorkQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// 一次空闲授予的剩余时间估计
pub trait IdleDeadline {
    fn time_remaining(&self) -> Duration;
}

/// 空闲时间的授予者
///
/// `timeout` 是建议性的：宿主最迟应在该时间内授予预算。
/// 返回 `None` 表示宿主不再授予，调度循环随之返回，队列保持原样。
pub trait IdleHost {
    type Deadline: IdleDeadline;

    fn grant(&mut self, timeout: Duration) -> Option<Self::Deadline>;
}

/// 按挂钟计时的帧预算
#[derive(Debug, Clone, Copy)]
pub struct FrameBudget {
    budget: Duration,
}

impl FrameBudget {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.frame_budget())
    }
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self::new(constants::DEFAULT_FRAME_BUDGET)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameDeadline {
    end: Instant,
}

impl IdleDeadline for FrameDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

impl IdleHost for FrameBudget {
    type Deadline = FrameDeadline;

    fn grant(&mut self, _timeout: Duration) -> Option<FrameDeadline> {
        Some(FrameDeadline {
            end: Instant::now() + self.budget,
        })
    }
}

/// 没有空闲回调时的定时器近似：剩余时间恒为 1ms
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutFallback;

#[derive(Debug, Clone, Copy)]
pub struct FixedDeadline(Duration);

impl IdleDeadline for FixedDeadline {
    fn time_remaining(&self) -> Duration {
        self.0
    }
}

impl IdleHost for TimeoutFallback {
    type Deadline = FixedDeadline;

    fn grant(&mut self, _timeout: Duration) -> Option<FixedDeadline> {
        Some(FixedDeadline(constants::FALLBACK_TIME_REMAINING))
    }
}

/// 确定性预算：每次授予允许处理固定数量的节点
///
/// `max_grants` 为 `None` 时无限授予。
#[derive(Debug, Clone)]
pub struct StepBudget {
    steps_per_grant: usize,
    max_grants: Option<usize>,
    grants: usize,
}

impl StepBudget {
    /// 每次授予至少一步，零步授予会让任务循环空转
    pub fn new(steps_per_grant: usize) -> Self {
        Self {
            steps_per_grant: steps_per_grant.max(1),
            max_grants: None,
            grants: 0,
        }
    }

    pub fn with_max_grants(mut self, max_grants: usize) -> Self {
        self.max_grants = Some(max_grants);
        self
    }

    /// 已授予的次数
    pub fn grants(&self) -> usize {
        self.grants
    }
}

/// 每次查询消耗一步，步数用尽后报告零剩余时间
#[derive(Debug)]
pub struct StepDeadline {
    remaining: Cell<usize>,
}

impl StepDeadline {
    pub fn new(steps: usize) -> Self {
        Self {
            remaining: Cell::new(steps),
        }
    }
}

impl IdleDeadline for StepDeadline {
    fn time_remaining(&self) -> Duration {
        match self.remaining.get() {
            0 => Duration::ZERO,
            n => {
                self.remaining.set(n - 1);
                constants::FALLBACK_TIME_REMAINING
            }
        }
    }
}

impl IdleHost for StepBudget {
    type Deadline = StepDeadline;

    fn grant(&mut self, _timeout: Duration) -> Option<StepDeadline> {
        if self.max_grants.is_some_and(|max| self.grants >= max) {
            return None;
        }
        self.grants += 1;
        Some(StepDeadline::new(self.steps_per_grant))
    }
}

/// 调度器状态：工作队列加重入标志
#[derive(Debug)]
pub struct Scheduler<N> {
    queue: WorkQueue<N>,
    processing: bool,
    threshold: Duration,
    idle_timeout: Duration,
}

impl<N: Clone + Eq + Hash> Scheduler<N> {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            queue: WorkQueue::new(),
            processing: false,
            threshold: config.budget_threshold(),
            idle_timeout: config.idle_timeout(),
        }
    }

    pub fn enqueue(&mut self, node: N) -> bool {
        self.queue.enqueue(node)
    }

    pub fn dequeue(&mut self) -> Option<N> {
        self.queue.dequeue()
    }

    /// 请求一个排空周期；已有周期或队列为空时返回 `false`
    pub fn request(&mut self) -> bool {
        if self.processing || self.queue.is_empty() {
            return false;
        }
        self.processing = true;
        true
    }

    /// 周期结束，放开重入标志
    pub fn finish(&mut self) {
        self.processing = false;
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// 剩余预算是否还够处理下一个节点
    pub fn has_budget<D: IdleDeadline + ?Sized>(&self, deadline: &D) -> bool {
        deadline.time_remaining() > self.threshold
    }

    pub fn reset(&mut self) {
        self.queue.reset();
    }

    pub fn queue(&self) -> &WorkQueue<N> {
        &self.queue
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}
