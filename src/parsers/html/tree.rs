//! html5ever 文档树适配器
//!
//! 把 `markup5ever_rcdom` 的 DOM 包装成引擎使用的 [`MutableTree`] 与
//! [`ChangeSource`]。通过适配器的修改助手（`append_child`、`remove_child`、
//! `replace_text`、`change_attribute`）进行的外部修改会被记录为变更；
//! 引擎经由 `MutableTree` 写回的译文不会被记录。

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::dom::{
    create_text_node, find_nodes, get_charset, get_node_attr, get_node_name, get_node_text,
    get_parent_node, html_to_dom, html_to_dom_detect_charset, set_node_attr, set_node_text,
};
use super::serializer::serialize_handle;
use crate::translation::tree::{ChangeSource, MutableTree, NodeKind, TreeChange};

/// 按身份比较的节点句柄
#[derive(Clone)]
pub struct NodeRef(Handle);

impl NodeRef {
    pub fn new(handle: Handle) -> Self {
        Self(handle)
    }

    pub fn handle(&self) -> &Handle {
        &self.0
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { name, .. } => write!(f, "<{}>", name.local),
            NodeData::Text { contents } => write!(f, "#text({:?})", &**contents.borrow()),
            NodeData::Document => write!(f, "#document"),
            NodeData::Comment { .. } => write!(f, "#comment"),
            _ => write!(f, "#node"),
        }
    }
}

/// 变更记录器
struct Observer {
    attribute_filter: Vec<String>,
    records: Vec<TreeChange<NodeRef>>,
}

/// html5ever 文档树
pub struct HtmlTree {
    document: Handle,
    root: Handle,
    observer: RefCell<Option<Observer>>,
}

impl HtmlTree {
    /// 包装已解析的 DOM；根节点取 `<body>`，没有时取文档本身
    pub fn from_dom(dom: RcDom) -> Self {
        let document = dom.document.clone();
        let root = find_nodes(&document, &["html", "body"])
            .into_iter()
            .next()
            .unwrap_or_else(|| document.clone());

        Self {
            document,
            root,
            observer: RefCell::new(None),
        }
    }

    /// 解析 UTF-8 HTML 文本
    pub fn parse(html: &str) -> Self {
        Self::from_dom(html_to_dom(html.as_bytes(), "utf-8"))
    }

    /// 解析原始字节，遵循文档声明的字符集
    pub fn parse_bytes(data: &[u8]) -> Self {
        Self::from_dom(html_to_dom_detect_charset(data))
    }

    pub fn document(&self) -> NodeRef {
        NodeRef(self.document.clone())
    }

    /// 文档声明的字符集
    pub fn charset(&self) -> Option<String> {
        get_charset(&self.document)
    }

    /// 序列化整个文档
    pub fn serialize(&self) -> Vec<u8> {
        serialize_handle(&self.document)
    }

    /// 序列化为字符串
    pub fn to_html(&self) -> String {
        String::from_utf8_lossy(&self.serialize()).into_owned()
    }

    /// 先序遍历文档中的所有节点
    pub fn descendants(&self, node: &NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack = vec![node.0.clone()];
        while let Some(handle) = stack.pop() {
            for child in handle.children.borrow().iter().rev() {
                stack.push(child.clone());
            }
            out.push(NodeRef(handle));
        }
        out
    }

    /// 第一个内容包含 `needle` 的文本节点
    pub fn find_text(&self, needle: &str) -> Option<NodeRef> {
        self.descendants(&self.document())
            .into_iter()
            .find(|n| get_node_text(&n.0).is_some_and(|t| t.contains(needle)))
    }

    pub fn find_element_by_id(&self, id: &str) -> Option<NodeRef> {
        self.descendants(&self.document())
            .into_iter()
            .find(|n| get_node_attr(&n.0, "id").as_deref() == Some(id))
    }

    pub fn find_elements(&self, tag: &str) -> Vec<NodeRef> {
        self.descendants(&self.document())
            .into_iter()
            .filter(|n| get_node_name(&n.0) == Some(tag))
            .collect()
    }

    /// 拼接子树中所有文本节点的内容
    pub fn text_content(&self, node: &NodeRef) -> String {
        self.descendants(node)
            .iter()
            .filter_map(|n| get_node_text(&n.0))
            .collect()
    }

    /// 解析一段 HTML 片段，返回游离的顶层节点
    pub fn create_fragment(&self, html: &str) -> Vec<NodeRef> {
        let fragment = Self::parse(&format!("<html><body>{}</body></html>", html));
        let children: Vec<Handle> = fragment.root.children.borrow_mut().drain(..).collect();

        children
            .into_iter()
            .map(|child| {
                child.parent.set(None);
                NodeRef(child)
            })
            .collect()
    }

    pub fn create_text(&self, value: &str) -> NodeRef {
        NodeRef(create_text_node(value))
    }

    /// 外部插入：把游离节点追加到 `parent` 末尾
    pub fn append_child(&self, parent: &NodeRef, child: &NodeRef) {
        if get_parent_node(&child.0).is_some() {
            self.remove_child(child);
        }

        child.0.parent.set(Some(Rc::downgrade(&parent.0)));
        parent.0.children.borrow_mut().push(child.0.clone());

        self.record(|| TreeChange::ChildList {
            target: parent.clone(),
            added: vec![child.clone()],
            removed: Vec::new(),
        });
    }

    /// 外部移除：把节点从父节点上摘下
    pub fn remove_child(&self, child: &NodeRef) {
        let Some(parent) = get_parent_node(&child.0) else {
            return;
        };

        parent
            .children
            .borrow_mut()
            .retain(|c| !Rc::ptr_eq(c, &child.0));
        child.0.parent.set(None);

        self.record(|| TreeChange::ChildList {
            target: NodeRef(parent.clone()),
            added: Vec::new(),
            removed: vec![child.clone()],
        });
    }

    /// 外部修改文本
    pub fn replace_text(&self, node: &NodeRef, value: &str) {
        set_node_text(&node.0, value);
        self.record(|| TreeChange::Text {
            target: node.clone(),
        });
    }

    /// 外部修改属性；只有过滤器中的属性会被记录
    pub fn change_attribute(&self, node: &NodeRef, name: &str, value: &str) {
        set_node_attr(&node.0, name, Some(value.to_string()));

        let observed = self
            .observer
            .borrow()
            .as_ref()
            .is_some_and(|o| o.attribute_filter.iter().any(|a| a == name));
        if observed {
            self.record(|| TreeChange::Attribute {
                target: node.clone(),
                name: name.to_string(),
            });
        }
    }

    fn record<F>(&self, make: F)
    where
        F: FnOnce() -> TreeChange<NodeRef>,
    {
        if let Some(observer) = self.observer.borrow_mut().as_mut() {
            observer.records.push(make());
        }
    }
}

impl MutableTree for HtmlTree {
    type Node = NodeRef;

    fn root(&self) -> NodeRef {
        NodeRef(self.root.clone())
    }

    fn kind(&self, node: &NodeRef) -> NodeKind {
        match node.0.data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text { .. } => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: &NodeRef) -> Option<String> {
        get_node_name(&node.0).map(|name| name.to_ascii_lowercase())
    }

    fn parent(&self, node: &NodeRef) -> Option<NodeRef> {
        get_parent_node(&node.0).map(NodeRef)
    }

    fn children(&self, node: &NodeRef) -> Vec<NodeRef> {
        node.0.children.borrow().iter().cloned().map(NodeRef).collect()
    }

    fn is_attached(&self, node: &NodeRef) -> bool {
        let mut current = node.0.clone();
        loop {
            if Rc::ptr_eq(&current, &self.document) {
                return true;
            }
            match get_parent_node(&current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn text(&self, node: &NodeRef) -> Option<String> {
        get_node_text(&node.0)
    }

    fn set_text(&self, node: &NodeRef, value: &str) {
        set_node_text(&node.0, value);
    }

    fn attribute(&self, node: &NodeRef, name: &str) -> Option<String> {
        get_node_attr(&node.0, name)
    }

    fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) {
        set_node_attr(&node.0, name, Some(value.to_string()));
    }
}

impl ChangeSource for HtmlTree {
    fn observe(&self, attribute_filter: &[&str]) {
        let mut observer = self.observer.borrow_mut();
        if observer.is_none() {
            *observer = Some(Observer {
                attribute_filter: attribute_filter.iter().map(|a| a.to_string()).collect(),
                records: Vec::new(),
            });
        }
    }

    fn take_records(&self) -> Vec<TreeChange<NodeRef>> {
        self.observer
            .borrow_mut()
            .as_mut()
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_body() {
        let tree = HtmlTree::parse("<html><body><p>Hello</p></body></html>");
        assert_eq!(tree.tag_name(&tree.root()), Some("body".to_string()));
        assert!(tree.is_attached(&tree.root()));
    }

    #[test]
    fn test_node_identity() {
        let tree = HtmlTree::parse("<p>a</p><p>a</p>");
        let ps = tree.find_elements("p");
        assert_eq!(ps.len(), 2);
        assert_ne!(ps[0], ps[1]);
        assert_eq!(ps[0], ps[0].clone());
    }

    #[test]
    fn test_detached_nodes() {
        let tree = HtmlTree::parse("<div id='a'><span>x</span></div>");
        let div = tree.find_element_by_id("a").unwrap();
        let text = tree.find_text("x").unwrap();

        assert!(tree.is_attached(&text));
        tree.remove_child(&div);
        assert!(!tree.is_attached(&div));
        assert!(!tree.is_attached(&text));

        let fresh = tree.create_text("y");
        assert!(!tree.is_attached(&fresh));
    }

    #[test]
    fn test_records_only_after_observe() {
        let tree = HtmlTree::parse("<div id='a'></div>");
        let div = tree.find_element_by_id("a").unwrap();

        tree.append_child(&div, &tree.create_text("ignored"));
        tree.observe(&["title"]);
        assert!(tree.take_records().is_empty());

        let fragment = tree.create_fragment("<span>Deploy</span>");
        tree.append_child(&div, &fragment[0]);
        tree.change_attribute(&div, "title", "Settings");
        tree.change_attribute(&div, "class", "wide");
        tree.replace_text(&tree.find_text("ignored").unwrap(), "Overview");

        let records = tree.take_records();
        assert_eq!(records.len(), 3);
        assert!(matches!(&records[0], TreeChange::ChildList { added, .. } if added.len() == 1));
        assert!(matches!(&records[1], TreeChange::Attribute { name, .. } if name == "title"));
        assert!(matches!(&records[2], TreeChange::Text { .. }));
        assert!(tree.take_records().is_empty());
    }

    #[test]
    fn test_engine_writes_are_silent() {
        let tree = HtmlTree::parse("<p title='Home'>Docs</p>");
        tree.observe(&["title"]);

        let text = tree.find_text("Docs").unwrap();
        tree.set_text(&text, "文档");
        let p = tree.find_elements("p").remove(0);
        tree.set_attribute(&p, "title", "首页");

        assert!(tree.take_records().is_empty());
        assert!(tree.to_html().contains("文档"));
        assert!(tree.to_html().contains("首页"));
    }

    #[test]
    fn test_fragment_nodes_are_detached_until_inserted() {
        let tree = HtmlTree::parse("<main id='m'></main>");
        let nodes = tree.create_fragment("<h1>Pricing</h1><p>Plans</p>");
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| !tree.is_attached(n)));

        let main = tree.find_element_by_id("m").unwrap();
        for node in &nodes {
            tree.append_child(&main, node);
        }
        assert!(nodes.iter().all(|n| tree.is_attached(n)));
        assert_eq!(tree.text_content(&main), "PricingPlans");
    }
}
