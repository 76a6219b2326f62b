//! 双语渲染策略

/// 双语模式：在译文后用全角括号附上原文
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BilingualPolicy {
    enabled: bool,
}

impl BilingualPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// 翻转开关，返回新状态
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// 格式化译文，缓存命中与新查到的译文都走这里
    pub fn format(&self, translation: &str, original_trimmed: &str) -> String {
        if self.enabled {
            format!("{}（{}）", translation, original_trimmed)
        } else {
            translation.to_string()
        }
    }
}
