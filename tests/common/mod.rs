// 集成测试公共模块
//
// HTML 夹具与引擎构建辅助

use livedict::parsers::html::{HtmlTree, NodeRef};
use livedict::translation::pipeline::filters::are_children_eligible;
use livedict::translation::{Dictionary, Engine, MutableTree, TranslationConfig};

/// 控制台页面夹具
pub const DASHBOARD_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Dashboard</title></head>
  <body>
    <nav aria-label="Main navigation">
      <a href="/overview">Overview</a>
      <a href="/deployments">Deployments</a>
      <a href="/settings" title="Settings">Settings</a>
    </nav>
    <main>
      <h1>Dashboard</h1>
      <input type="search" placeholder="Search...">
      <p>Created 3 hours ago</p>
      <p>Build took 5m 30s</p>
      <span>5m 30s</span>
      <img src="/logo.svg" alt="Vercel">
      <pre><code>Dashboard</code></pre>
      <div class="monaco-editor"><span>Settings</span></div>
      <script>var label = "Dashboard";</script>
    </main>
  </body>
</html>"#;

pub const DICTIONARY_JSON: &str = r#"{
  "Dashboard": "仪表盘",
  "Overview": "概览",
  "Deployments": "部署",
  "Settings": "设置",
  "Search...": "搜索...",
  "Main navigation": "主导航",
  "Vercel": "Vercel 标志"
}"#;

pub fn dictionary() -> Dictionary {
    Dictionary::from_json_str(DICTIONARY_JSON).expect("fixture dictionary is valid")
}

/// 已装入词库但尚未启动的引擎
pub fn engine(html: &str) -> Engine<HtmlTree> {
    engine_with(html, &TranslationConfig::default())
}

pub fn engine_with(html: &str, config: &TranslationConfig) -> Engine<HtmlTree> {
    let mut engine = Engine::new(HtmlTree::parse(html), config).expect("engine");
    engine.install_dictionary(dictionary());
    engine
}

/// 从根节点出发、按资格剪枝的先序遍历
pub fn eligible_walk(tree: &HtmlTree) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];

    while let Some(node) = stack.pop() {
        if are_children_eligible(tree, &node) {
            stack.extend(tree.children(&node).into_iter().rev());
        }
        out.push(node);
    }

    out
}
