//! 译文解析器
//!
//! 给定原始文本，决定跳过与否，规范化后依次查缓存、词库和正则回退规则，
//! 返回替换后的文本或"无匹配"。未命中同样写入缓存，反复出现的时间戳、
//! 计数器之类的文本不会一遍遍重走整条管线。

use regex::Regex;

use crate::translation::bilingual::BilingualPolicy;
use crate::translation::config::TranslationConfig;
use crate::translation::dictionary::{DictEntry, Dictionary};
use crate::translation::error::TranslationResult;
use crate::translation::storage::cache::{CacheStats, CachedTranslation, TranslationCache};

/// 内置回退规则：(模式, 替换模板)，先匹配者胜出
pub const DEFAULT_FALLBACK_RULES: &[(&str, &str)] = &[
    (r"^Created\s+(.+)\s+ago$", "创建于 ${1} 前"),
    (r"^Updated\s+(.+)\s+ago$", "更新于 ${1} 前"),
    (r"^Updated\s+just now$", "刚刚更新"),
    (r"^([0-9]+)m\s+([0-9]+)s$", "${1}分 ${2}秒"),
    (r"^([0-9]+)s$", "${1}秒"),
    (r"^([0-9]+)h$", "${1}小时"),
];

/// 正则回退规则
#[derive(Debug, Clone)]
pub struct FallbackRule {
    pattern: Regex,
    template: String,
}

impl FallbackRule {
    pub fn new(pattern: &str, template: &str) -> TranslationResult<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            template: template.to_string(),
        })
    }

    /// 匹配时返回替换结果
    pub fn apply(&self, key: &str) -> Option<String> {
        if self.pattern.is_match(key) {
            Some(
                self.pattern
                    .replace(key, self.template.as_str())
                    .into_owned(),
            )
        } else {
            None
        }
    }
}

/// 编译内置回退规则
pub fn default_rules() -> TranslationResult<Vec<FallbackRule>> {
    DEFAULT_FALLBACK_RULES
        .iter()
        .map(|(pattern, template)| FallbackRule::new(pattern, template))
        .collect()
}

/// 规范化：所有空白（含不间断空格）折叠为单个空格并去掉首尾空白
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// 不可能是有意义源语言短语的文本
pub fn should_skip(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }

    if text.chars().all(|c| c.is_whitespace() || c.is_ascii_digit()) {
        return true;
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }

    // 已经全是目标文字
    if trimmed.chars().all(is_cjk) {
        return true;
    }

    if !trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return true;
    }

    false
}

/// 只有含空格或数字的键才值得跑正则
fn worth_regex(key: &str) -> bool {
    key.contains(' ') || key.chars().any(|c| c.is_ascii_digit())
}

/// 译文解析器
#[derive(Debug)]
pub struct Resolver {
    rules: Vec<FallbackRule>,
    cache: TranslationCache,
    max_key_length: usize,
}

impl Resolver {
    /// 使用内置回退规则创建解析器
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        Ok(Self::with_rules(config, default_rules()?))
    }

    pub fn with_rules(config: &TranslationConfig, rules: Vec<FallbackRule>) -> Self {
        Self {
            rules,
            cache: TranslationCache::with_capacity(config.cache_capacity),
            max_key_length: config.max_key_length,
        }
    }

    /// 解析一段原始文本
    ///
    /// 成功时返回原文本中去空白部分被（按双语策略格式化的）译文替换后的结果。
    pub fn resolve(
        &mut self,
        dictionary: &Dictionary,
        policy: &BilingualPolicy,
        text: &str,
    ) -> Option<String> {
        if should_skip(text) {
            return None;
        }

        let trimmed = text.trim();
        let key = normalize_key(trimmed);
        if key.is_empty() || key.chars().count() > self.max_key_length {
            return None;
        }

        if let Some(cached) = self.cache.get(&key) {
            return match cached {
                CachedTranslation::Hit(translation) => {
                    Some(render(text, trimmed, &policy.format(translation, trimmed)))
                }
                CachedTranslation::Miss => None,
            };
        }

        match self.lookup(dictionary, &key) {
            Some(translation) => {
                let rendered = render(text, trimmed, &policy.format(&translation, trimmed));
                self.cache.insert_hit(key, translation);
                Some(rendered)
            }
            None => {
                self.cache.insert_miss(key);
                None
            }
        }
    }

    /// 精确查找，失败且值得时再试回退规则；空白译文等同于没有
    fn lookup(&self, dictionary: &Dictionary, key: &str) -> Option<String> {
        let translated = match dictionary.get(key) {
            Some(DictEntry::Text(text)) => Some(text.clone()),
            Some(DictEntry::Unusable) => return None,
            None if worth_regex(key) => self.rules.iter().find_map(|rule| rule.apply(key)),
            None => None,
        };

        translated.filter(|t| !t.trim().is_empty())
    }

    /// 词库替换后必须清空缓存
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    pub fn rules(&self) -> &[FallbackRule] {
        &self.rules
    }
}

fn render(text: &str, trimmed: &str, replacement: &str) -> String {
    text.replacen(trimmed, replacement, 1)
}

impl Default for Resolver {
    fn default() -> Self {
        let config = TranslationConfig::default();
        let rules = default_rules().unwrap_or_default();
        Self::with_rules(&config, rules)
    }
}
