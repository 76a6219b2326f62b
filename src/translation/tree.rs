//! 文档树抽象
//!
//! 引擎依赖但不拥有的外部可变树。宿主 DOM、虚拟树或测试夹具都通过
//! [`MutableTree`] 与 [`ChangeSource`] 接入。

use std::fmt::Debug;
use std::hash::Hash;

/// 节点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Other,
}

/// 可被外部并发修改的文档树
///
/// 修改方法接收 `&self`：宿主树是共享且内部可变的。
pub trait MutableTree {
    /// 节点引用，按身份比较
    type Node: Clone + Eq + Hash + Debug;

    /// 指定的根节点（通常是 `<body>`），始终视为已挂载
    fn root(&self) -> Self::Node;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// 元素的小写标签名，非元素返回 `None`
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// 直接子节点，按文档顺序
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// 节点是否仍在活动树中
    fn is_attached(&self, node: &Self::Node) -> bool;

    /// 文本节点的内容，其他节点返回 `None`
    fn text(&self, node: &Self::Node) -> Option<String>;

    fn set_text(&self, node: &Self::Node, value: &str);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
}

/// 树变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange<N> {
    /// 子节点插入或移除
    ChildList {
        target: N,
        added: Vec<N>,
        removed: Vec<N>,
    },
    /// 属性值变化
    Attribute { target: N, name: String },
    /// 文本内容变化
    Text { target: N },
}

/// 变更通知来源
///
/// 通知中的节点与 [`MutableTree::Node`] 同一类型。
pub trait ChangeSource: MutableTree {
    /// 开始记录变更；属性变更只记录 `attribute_filter` 中的属性。
    /// 重复调用不改变已有的记录状态。
    fn observe(&self, attribute_filter: &[&str]);

    /// 取出自上次调用以来积累的一批变更
    fn take_records(&self) -> Vec<TreeChange<Self::Node>>;
}
