//! 词条导出与种子词库合并
//!
//! 导出独立于引擎遍历文档：收集标题类元素（`h1`、`h2`、`label`、`button`）
//! 的文本和白名单属性，用比翻译更宽松的启发式过滤后输出为键有序、
//! 值为空的 JSON 对象，交给人工补全译文。合并则把补全后的结果填回
//! 词库文件。

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::config::constants;
use super::error::{TranslationError, TranslationResult};
use super::pipeline::filters::is_opaque_element;
use super::resolver::normalize_key;
use super::tree::{MutableTree, NodeKind};

/// 是否像一条值得收录的标题类短语
pub fn is_extractable_headline(text: &str) -> bool {
    let key = normalize_key(text);
    let length = key.chars().count();

    if length < 2 || length > constants::EXPORT_MAX_LENGTH {
        return false;
    }

    if !key.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    if key.chars().all(|c| ('\u{4e00}'..='\u{9fff}').contains(&c)) {
        return false;
    }

    if has_digit_run(&key, 3) {
        return false;
    }

    if key.contains(['<', '>', '[', ']', '{', '}', '=', '\\']) {
        return false;
    }

    if ["http", "@", "var(", "/"].iter().any(|p| key.contains(p)) {
        return false;
    }

    let lower = key.to_lowercase();
    if lower.starts_with("avatar for ") || lower.ends_with("logo") {
        return false;
    }

    key.split(' ').count() <= constants::EXPORT_MAX_WORDS
}

fn has_digit_run(text: &str, min: usize) -> bool {
    let mut run = 0;
    for c in text.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= min {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// 导出结果的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSink {
    File(PathBuf),
    Stdout,
}

/// 跨多个文档累积的词条集合
#[derive(Debug, Default, Clone)]
pub struct TermExport {
    terms: BTreeSet<String>,
}

impl TermExport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 收集一棵树中的词条，返回新增数量
    pub fn collect<T: MutableTree>(&mut self, tree: &T) -> usize {
        let before = self.terms.len();
        let mut stack = vec![tree.root()];

        while let Some(node) = stack.pop() {
            if tree.kind(&node) != NodeKind::Element || is_opaque_element(tree, &node) {
                continue;
            }

            let is_headline = tree
                .tag_name(&node)
                .is_some_and(|tag| constants::EXPORT_TAGS.contains(&tag.as_str()));
            if is_headline {
                self.add(&text_content(tree, &node));
            }

            for name in constants::TRANSLATABLE_ATTRS {
                if let Some(value) = tree.attribute(&node, name) {
                    self.add(&value);
                }
            }

            stack.extend(tree.children(&node).into_iter().rev());
        }

        let added = self.terms.len() - before;
        tracing::debug!("收集到 {} 个新词条", added);
        added
    }

    fn add(&mut self, text: &str) {
        if is_extractable_headline(text) {
            self.terms.insert(normalize_key(text));
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// 键有序、值为空字符串的 JSON 对象
    pub fn to_json(&self) -> TranslationResult<String> {
        let map: Map<String, Value> = self
            .terms
            .iter()
            .map(|term| (term.clone(), Value::String(String::new())))
            .collect();

        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    /// 写出导出结果：优先写文件，失败时回退到标准输出
    pub fn write(&self, path: Option<&Path>) -> TranslationResult<ExportSink> {
        let json = self.to_json()?;

        if let Some(path) = path {
            match fs::write(path, &json) {
                Ok(()) => {
                    tracing::info!("已写出 {} 个词条到 {}", self.len(), path.display());
                    return Ok(ExportSink::File(path.to_path_buf()));
                }
                Err(e) => tracing::warn!("无法写入 {}: {}，改为输出到标准输出", path.display(), e),
            }
        }

        let mut stdout = io::stdout().lock();
        stdout
            .write_all(json.as_bytes())
            .and_then(|_| stdout.write_all(b"\n"))
            .map_err(|e| TranslationError::ExportError(format!("无法输出词条: {}", e)))?;

        Ok(ExportSink::Stdout)
    }
}

/// 子树中所有文本节点内容的拼接
pub fn text_content<T: MutableTree>(tree: &T, node: &T::Node) -> String {
    let mut out = String::new();
    let mut stack = vec![node.clone()];

    while let Some(current) = stack.pop() {
        if let Some(text) = tree.text(&current) {
            out.push_str(&text);
        }
        stack.extend(tree.children(&current).into_iter().rev());
    }

    out
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

/// 把种子中的译文合并进目标词库，返回更新的条目数
///
/// 目标中为空的值由种子填充；目标缺少的键直接加入；非空的目标值
/// 永远不会被覆盖。合并后删除无意义的 `file_path` 键。
pub fn merge_seed(target: &mut Map<String, Value>, source: &Map<String, Value>) -> usize {
    let mut updated = 0;

    for (key, value) in source {
        match target.get_mut(key) {
            Some(existing) => {
                if is_blank(existing) && !is_blank(value) {
                    *existing = value.clone();
                    updated += 1;
                }
            }
            None => {
                target.insert(key.clone(), value.clone());
                updated += 1;
            }
        }
    }

    target.remove(constants::SEED_GARBAGE_KEY);
    updated
}

fn read_object(path: &Path) -> TranslationResult<Map<String, Value>> {
    let content = fs::read_to_string(path)
        .map_err(|e| TranslationError::IoError(format!("{}: {}", path.display(), e)))?;

    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(TranslationError::ParseError(format!(
            "{} 不是 JSON 对象",
            path.display()
        ))),
    }
}

/// 合并两个词库文件，结果写回目标文件
pub fn merge_seed_files(target: &Path, source: &Path) -> TranslationResult<usize> {
    let mut target_map = read_object(target)?;
    let source_map = read_object(source)?;

    let updated = merge_seed(&mut target_map, &source_map);

    let json = serde_json::to_string_pretty(&Value::Object(target_map))?;
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.persist(target)
        .map_err(|e| TranslationError::IoError(format!("{}: {}", target.display(), e)))?;

    tracing::info!("合并完成，更新 {} 条", updated);
    Ok(updated)
}
