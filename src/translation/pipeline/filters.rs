//! 节点资格过滤器
//!
//! 判断一个树节点能否被改写。纯谓词，没有副作用：
//!
//! 1. 标签在封闭集合 [`IGNORED_TAGS`](constants::IGNORED_TAGS) 中的元素，其文本永不翻译；
//! 2. 自身或任一祖先是不透明区域（代码块、高亮区域、富文本编辑器、
//!    可直接编辑的元素）时，整棵子树都不可改写；
//! 3. 属性按白名单逐个判断，与文本资格相互独立。

use crate::translation::config::constants;
use crate::translation::tree::{MutableTree, NodeKind};

/// 文本永不翻译的标签
pub fn is_ignored_tag(tag: &str) -> bool {
    constants::IGNORED_TAGS.contains(&tag)
}

/// 属性是否在可翻译白名单中
pub fn is_translatable_attr(name: &str) -> bool {
    constants::TRANSLATABLE_ATTRS.contains(&name)
}

/// 元素自身是否构成不透明区域
pub fn is_opaque_element<T: MutableTree>(tree: &T, node: &T::Node) -> bool {
    if tree.kind(node) != NodeKind::Element {
        return false;
    }

    if let Some(tag) = tree.tag_name(node) {
        if constants::OPAQUE_TAGS.contains(&tag.as_str()) {
            return true;
        }
    }

    if let Some(editable) = tree.attribute(node, "contenteditable") {
        if !editable.trim().eq_ignore_ascii_case("false") {
            return true;
        }
    }

    if let Some(class) = tree.attribute(node, "class") {
        if class
            .split_ascii_whitespace()
            .any(|token| constants::OPAQUE_CLASSES.contains(&token))
        {
            return true;
        }
    }

    false
}

/// 自身或任一祖先是不透明区域
pub fn in_opaque_region<T: MutableTree>(tree: &T, node: &T::Node) -> bool {
    any_ancestor_or_self(tree, node, |n| is_opaque_element(tree, n))
}

/// 文本节点能否翻译
pub fn is_text_eligible<T: MutableTree>(tree: &T, node: &T::Node) -> bool {
    if tree.kind(node) != NodeKind::Text {
        return false;
    }

    !any_ancestor_or_self(tree, node, |n| {
        tree.tag_name(n).is_some_and(|tag| is_ignored_tag(&tag)) || is_opaque_element(tree, n)
    })
}

/// 元素的白名单属性能否翻译
///
/// 只受不透明区域约束：`<input placeholder>` 的文本不可译，属性可译。
pub fn are_attributes_eligible<T: MutableTree>(tree: &T, node: &T::Node) -> bool {
    tree.kind(node) == NodeKind::Element && !in_opaque_region(tree, node)
}

/// 处理完元素后是否继续深入其子节点
pub fn are_children_eligible<T: MutableTree>(tree: &T, node: &T::Node) -> bool {
    if tree.kind(node) != NodeKind::Element {
        return false;
    }

    let ignored = tree.tag_name(node).is_some_and(|tag| is_ignored_tag(&tag));
    !ignored && !in_opaque_region(tree, node)
}

/// 从节点自身开始沿祖先链向上，任一节点满足谓词即为真
pub fn any_ancestor_or_self<T, F>(tree: &T, node: &T::Node, mut predicate: F) -> bool
where
    T: MutableTree,
    F: FnMut(&T::Node) -> bool,
{
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if predicate(&n) {
            return true;
        }
        current = tree.parent(&n);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::HtmlTree;

    fn tree(body: &str) -> HtmlTree {
        HtmlTree::parse(&format!("<html><body>{}</body></html>", body))
    }

    fn first_text(tree: &HtmlTree, needle: &str) -> <HtmlTree as MutableTree>::Node {
        tree.find_text(needle).expect("text node present")
    }

    #[test]
    fn test_plain_text_is_eligible() {
        let tree = tree("<div><span>Dashboard</span></div>");
        assert!(is_text_eligible(&tree, &first_text(&tree, "Dashboard")));
    }

    #[test]
    fn test_ignored_tags_block_text() {
        let tree = tree("<noscript>Enable JavaScript</noscript><button>Deploy</button>");
        assert!(!is_text_eligible(&tree, &first_text(&tree, "Enable JavaScript")));
        assert!(is_text_eligible(&tree, &first_text(&tree, "Deploy")));
    }

    #[test]
    fn test_opaque_regions_block_whole_subtree() {
        let tree = tree(
            r#"<pre><span>Dashboard</span></pre>
               <div class="shiki github-dark"><span><b>Settings</b></span></div>
               <div contenteditable="true"><p>Overview</p></div>
               <div contenteditable="false"><p>Usage</p></div>"#,
        );

        assert!(!is_text_eligible(&tree, &first_text(&tree, "Dashboard")));
        assert!(!is_text_eligible(&tree, &first_text(&tree, "Settings")));
        assert!(!is_text_eligible(&tree, &first_text(&tree, "Overview")));
        assert!(is_text_eligible(&tree, &first_text(&tree, "Usage")));
    }

    #[test]
    fn test_attributes_independent_of_text() {
        let tree = tree(
            r#"<input id="search" placeholder="Search..."><pre id="code" title="Copy"></pre>"#,
        );
        let input = tree.find_element_by_id("search").unwrap();
        let pre = tree.find_element_by_id("code").unwrap();

        assert!(are_attributes_eligible(&tree, &input));
        assert!(!are_children_eligible(&tree, &input));
        assert!(!are_attributes_eligible(&tree, &pre));
    }

    #[test]
    fn test_children_of_editor_not_traversed() {
        let tree = tree(r#"<div id="editor" class="monaco-editor"><div>x</div></div><main id="main"></main>"#);
        assert!(!are_children_eligible(&tree, &tree.find_element_by_id("editor").unwrap()));
        assert!(are_children_eligible(&tree, &tree.find_element_by_id("main").unwrap()));
    }

    #[test]
    fn test_attribute_allow_list() {
        assert!(is_translatable_attr("title"));
        assert!(is_translatable_attr("aria-label"));
        assert!(!is_translatable_attr("href"));
        assert!(!is_translatable_attr("class"));
    }
}
