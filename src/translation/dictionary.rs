//! 词库
//!
//! 本次会话不可变的"规范化短语 → 译文"映射，以及从外部来源加载它的
//! 加载器。加载一次，强制刷新时整体替换，没有局部更新。

use std::collections::HashMap;
use std::fs;
use std::str::FromStr;
use std::time::Duration;

use serde_json::{Map, Value};
use url::Url;

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::resolver::normalize_key;

/// 词库条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictEntry {
    Text(String),
    /// 值不是字符串，查到等同于没有译文
    Unusable,
}

/// 词库
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<String, DictEntry>,
}

impl Dictionary {
    /// 从 JSON 文本解析词库
    pub fn from_json_str(raw: &str) -> TranslationResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// 从 JSON 值构建词库，必须是非空对象
    pub fn from_value(value: Value) -> TranslationResult<Self> {
        match value {
            Value::Object(map) if !map.is_empty() => Ok(Self::from_map(map)),
            Value::Object(_) => Err(TranslationError::DictionaryUnavailable(
                "词库对象为空".to_string(),
            )),
            other => Err(TranslationError::DictionaryUnavailable(format!(
                "词库必须是 JSON 对象，实际为 {}",
                json_type_name(&other)
            ))),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let entries = map
            .into_iter()
            .filter_map(|(key, value)| {
                let key = normalize_key(&key);
                if key.is_empty() {
                    return None;
                }
                let entry = match value {
                    Value::String(text) => DictEntry::Text(text),
                    _ => DictEntry::Unusable,
                };
                Some((key, entry))
            })
            .collect();

        Self { entries }
    }

    /// 由字符串键值对构建词库
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| (normalize_key(key.as_ref()), DictEntry::Text(value.into())))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        Self { entries }
    }

    /// 按规范化键精确查找
    pub fn get(&self, key: &str) -> Option<&DictEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 词库来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// 已经在内存中的 JSON 文本（相当于页面预置的全局词库）
    Inline(String),
    File(String),
    Url(Url),
}

impl FromStr for DictionarySource {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TranslationError::ConfigError("词库来源为空".to_string()));
        }

        if s.starts_with('{') {
            return Ok(DictionarySource::Inline(s.to_string()));
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s)
                .map_err(|e| TranslationError::ConfigError(format!("无效的词库 URL {}: {}", s, e)))?;
            return Ok(DictionarySource::Url(url));
        }

        Ok(DictionarySource::File(shellexpand::tilde(s).into_owned()))
    }
}

impl std::fmt::Display for DictionarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DictionarySource::Inline(_) => write!(f, "<inline>"),
            DictionarySource::File(path) => write!(f, "{}", path),
            DictionarySource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// 词库加载器
///
/// 依次尝试各个来源，第一个给出非空 JSON 对象的来源胜出。
pub struct DictionaryLoader {
    sources: Vec<DictionarySource>,
    timeout: Duration,
}

impl DictionaryLoader {
    pub fn new(sources: Vec<DictionarySource>) -> Self {
        Self {
            sources,
            timeout: constants::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// 从配置创建加载器，无法识别的来源记录警告后跳过
    pub fn from_config(config: &TranslationConfig) -> Self {
        let sources = config
            .dictionary_sources
            .iter()
            .filter_map(|raw| match raw.parse::<DictionarySource>() {
                Ok(source) => Some(source),
                Err(e) => {
                    tracing::warn!("跳过词库来源 {}: {}", raw, e);
                    None
                }
            })
            .collect();

        Self::new(sources).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn sources(&self) -> &[DictionarySource] {
        &self.sources
    }

    /// 加载词库；全部来源失败时返回 `None`，即"没有词库"
    pub fn load(&self) -> Option<Dictionary> {
        for source in &self.sources {
            match self.load_source(source) {
                Ok(dictionary) => {
                    tracing::info!("已从 {} 加载 {} 条词条", source, dictionary.len());
                    return Some(dictionary);
                }
                Err(e) => tracing::warn!("词库来源 {} 不可用: {}", source, e),
            }
        }

        tracing::error!("词库为空，未执行翻译。");
        None
    }

    /// 加载单个来源
    pub fn load_source(&self, source: &DictionarySource) -> TranslationResult<Dictionary> {
        let raw = self.fetch(source)?;
        Dictionary::from_json_str(&raw).map_err(|e| e.with_context(source))
    }

    fn fetch(&self, source: &DictionarySource) -> TranslationResult<String> {
        match source {
            DictionarySource::Inline(raw) => Ok(raw.clone()),
            DictionarySource::File(path) => fs::read_to_string(path)
                .map_err(|e| TranslationError::IoError(format!("{}: {}", path, e))),
            DictionarySource::Url(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(self.timeout)
                    .build()?;
                let response = client.get(url.as_str()).send()?;
                let status = response.status();
                if !status.is_success() {
                    return Err(TranslationError::NetworkError(format!("HTTP {}", status)));
                }
                Ok(response.text()?)
            }
        }
    }
}
