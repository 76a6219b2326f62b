//! 翻译缓存模块
//!
//! 有界的译文缓存，同时记录命中与未命中（负缓存）。容量满时按插入顺序
//! 淘汰最早的条目。

use std::collections::{HashMap, VecDeque};

use crate::translation::config::constants;

// ============================================================================
// 核心类型
// ============================================================================

/// 缓存值：原始译文，或"没有译文"的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedTranslation {
    /// 未经双语格式化的译文
    Hit(String),
    Miss,
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub negative_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// 命中率，负缓存命中也算命中
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.cache_hits + self.negative_hits) as f64 / self.total_requests as f64
        }
    }
}

/// 翻译缓存
#[derive(Debug)]
pub struct TranslationCache {
    entries: HashMap<String, CachedTranslation>,
    order: VecDeque<String>,
    capacity: usize,
    stats: CacheStats,
}

// ============================================================================
// 实现
// ============================================================================

impl TranslationCache {
    /// 创建默认容量的翻译缓存
    pub fn new() -> Self {
        Self::with_capacity(constants::MAX_CACHE_ENTRIES)
    }

    /// 使用指定容量创建缓存
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity.min(4096)),
            order: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// 获取缓存条目
    pub fn get(&mut self, key: &str) -> Option<&CachedTranslation> {
        self.stats.total_requests += 1;

        match self.entries.get(key) {
            Some(CachedTranslation::Hit(_)) => self.stats.cache_hits += 1,
            Some(CachedTranslation::Miss) => self.stats.negative_hits += 1,
            None => self.stats.cache_misses += 1,
        }

        self.entries.get(key)
    }

    /// 插入缓存条目
    ///
    /// 已存在的键原地更新，不改变它的淘汰顺序。
    pub fn insert(&mut self, key: String, value: CachedTranslation) {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    /// 记录译文
    pub fn insert_hit(&mut self, key: String, translation: String) {
        self.insert(key, CachedTranslation::Hit(translation));
    }

    /// 记录未命中
    pub fn insert_miss(&mut self, key: String) {
        self.insert(key, CachedTranslation::Miss);
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            tracing::trace!("缓存已满，淘汰最早条目: {}", oldest);
        }
    }

    /// 不计入统计的存在性检查
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 不计入统计的读取
    pub fn peek(&self, key: &str) -> Option<&CachedTranslation> {
        self.entries.get(key)
    }

    /// 清空缓存
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// 获取缓存大小
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// 重置统计
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}
