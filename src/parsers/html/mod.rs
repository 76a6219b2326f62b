//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `tree`: 供翻译引擎使用的文档树适配器
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;
pub mod tree;

pub use dom::{
    find_nodes, get_charset, get_node_attr, get_node_name, get_parent_node, html_to_dom,
    html_to_dom_detect_charset, set_node_attr,
};
pub use serializer::serialize_document;
pub use tree::{HtmlTree, NodeRef};
