//! 设置存储
//!
//! 外部键值持久化，目前只用于双语开关。

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::translation::error::{TranslationError, TranslationResult};

/// 键值设置存储
pub trait SettingsStore {
    fn get_bool(&self, key: &str, default: bool) -> bool;

    fn set_bool(&mut self, key: &str, value: bool) -> TranslationResult<()>;
}

/// 内存设置（测试与一次性运行）
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    values: HashMap<String, bool>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> TranslationResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// 以 JSON 文件持久化的设置
///
/// 写入先落到同目录的临时文件再原子替换。
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileSettings {
    /// 打开设置文件；文件不存在视为空设置，内容损坏时记录警告后同样视为空
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    tracing::warn!("设置文件不是 JSON 对象，忽略: {}", path.display());
                    Map::new()
                }
                Err(e) => {
                    tracing::warn!("设置文件解析失败，忽略: {} ({})", path.display(), e);
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };

        Self { path, values }
    }

    /// 用户配置目录下的默认设置文件
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "livedict")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> TranslationResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| {
            TranslationError::SettingsError(format!("无法创建设置目录 {}: {}", dir.display(), e))
        })?;

        let content = serde_json::to_string_pretty(&self.values)?;
        let mut file = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| TranslationError::SettingsError(format!("无法创建临时文件: {}", e)))?;
        file.write_all(content.as_bytes())?;
        file.persist(&self.path).map_err(|e| {
            TranslationError::SettingsError(format!(
                "无法写入设置文件 {}: {}",
                self.path.display(),
                e.error
            ))
        })?;

        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> TranslationResult<()> {
        self.values.insert(key.to_string(), Value::Bool(value));
        self.persist()
    }
}
