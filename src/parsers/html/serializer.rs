use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, SerializableHandle};

use super::tree::HtmlTree;

/// 序列化任意节点（UTF-8）
pub fn serialize_handle(handle: &Handle) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = handle.clone().into();

    if let Err(e) = serialize(&mut buf, &serializable, SerializeOpts::default()) {
        tracing::error!("无法序列化 DOM: {}", e);
    }

    buf
}

/// 序列化文档，并按原文档的字符集重新编码
pub fn serialize_document(tree: &HtmlTree, document_encoding: &str) -> Vec<u8> {
    let mut buf = tree.serialize();

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            if encoding != encoding_rs::UTF_8 {
                let s: &str = &String::from_utf8_lossy(&buf);
                let (data, _, _) = encoding.encode(s);
                buf = data.to_vec();
            }
        }
    }

    buf
}
