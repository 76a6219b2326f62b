//! 变更监听集成测试
//!
//! 外部插入、属性与文本修改只让受影响的节点重新入队

use livedict::translation::{MutableTree, TimeoutFallback};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{engine, DASHBOARD_PAGE};

#[test]
fn test_inserted_subtree_is_processed_alone() {
    let mut engine = engine(DASHBOARD_PAGE);
    engine.start();
    engine.run_until_idle(&mut TimeoutFallback);
    let before = engine.stats().nodes_processed;

    let tree = engine.tree();
    let fragment = tree.create_fragment("<section><h2>Settings</h2><p>Deployments</p></section>");
    let root = tree.root();
    tree.append_child(&root, &fragment[0]);

    assert!(engine.pump_changes());
    assert_eq!(engine.queue_len(), 1);

    engine.run_until_idle(&mut TimeoutFallback);
    // section、h2、文本、p、文本
    assert_eq!(engine.stats().nodes_processed - before, 5);

    let html = engine.tree().to_html();
    assert!(html.contains("<section><h2>设置</h2><p>部署</p></section>"));
}

#[test]
fn test_attribute_changes_respect_allow_list() {
    let mut engine = engine(r#"<button id="b">Overview</button>"#);
    engine.start();
    engine.run_until_idle(&mut TimeoutFallback);

    let button = engine.tree().find_element_by_id("b").unwrap();
    engine.tree().change_attribute(&button, "class", "Dashboard");
    assert!(!engine.pump_changes());

    engine.tree().change_attribute(&button, "title", "Dashboard");
    assert!(engine.pump_changes());
    engine.run_until_idle(&mut TimeoutFallback);

    assert_eq!(engine.tree().attribute(&button, "title").as_deref(), Some("仪表盘"));
    assert_eq!(engine.tree().attribute(&button, "class").as_deref(), Some("Dashboard"));
}

#[test]
fn test_text_change_is_retranslated() {
    let mut engine = engine("<span>Overview</span>");
    engine.start();
    engine.run_until_idle(&mut TimeoutFallback);

    let text = engine.tree().find_text("概览").unwrap();
    engine.tree().replace_text(&text, "  Deployments ");
    assert!(engine.pump_changes());
    engine.run_until_idle(&mut TimeoutFallback);

    assert_eq!(engine.tree().text(&text).as_deref(), Some("  部署 "));
}

#[test]
fn test_removed_subtrees_release_their_renditions() {
    let mut engine = engine("<main id='app'></main>");
    engine.start();
    engine.run_until_idle(&mut TimeoutFallback);
    assert_eq!(engine.ledger_len(), 0);

    let app = engine.tree().find_element_by_id("app").unwrap();
    for _ in 0..100 {
        let fragment = engine
            .tree()
            .create_fragment(r#"<p title="Settings">Dashboard</p>"#);
        engine.tree().append_child(&app, &fragment[0]);
        engine.pump_changes();
        engine.run_until_idle(&mut TimeoutFallback);
        // title 属性与文本各一条
        assert_eq!(engine.ledger_len(), 2);

        engine.tree().remove_child(&fragment[0]);
        engine.pump_changes();
        assert_eq!(engine.ledger_len(), 0);
    }

    assert_eq!(engine.stats().texts_rewritten, 100);
    assert_eq!(engine.stats().attributes_rewritten, 100);
}

#[test]
fn test_removed_nodes_are_not_enqueued() {
    let mut engine = engine("<ul id='list'><li>Overview</li></ul>");
    engine.start();
    engine.run_until_idle(&mut TimeoutFallback);

    let list = engine.tree().find_element_by_id("list").unwrap();
    engine.tree().remove_child(&list);

    assert!(!engine.pump_changes());
    assert_eq!(engine.queue_len(), 0);
}

#[test]
fn test_inserted_then_removed_node_is_discarded() {
    let mut engine = engine("<main id='m'></main>");
    engine.start();
    engine.run_until_idle(&mut TimeoutFallback);

    let tree = engine.tree();
    let main = tree.find_element_by_id("m").unwrap();
    let node = tree.create_fragment("<p>Settings</p>").remove(0);
    tree.append_child(&main, &node);
    tree.remove_child(&node);

    assert!(engine.pump_changes());
    engine.run_until_idle(&mut TimeoutFallback);

    assert_eq!(engine.stats().nodes_discarded, 1);
    assert_eq!(engine.tree().text_content(&node), "Settings");
}

#[test]
fn test_one_cycle_per_batch() {
    let mut engine = engine("<main id='m'></main>");
    engine.start();
    engine.run_until_idle(&mut TimeoutFallback);
    let cycles = engine.stats().cycles;

    let tree = engine.tree();
    let main = tree.find_element_by_id("m").unwrap();
    for html in ["<p>Overview</p>", "<p>Settings</p>", "<p>Dashboard</p>"] {
        let node = tree.create_fragment(html).remove(0);
        tree.append_child(&main, &node);
    }

    assert!(engine.pump_changes());
    assert_eq!(engine.queue_len(), 3);
    engine.run_until_idle(&mut TimeoutFallback);

    assert_eq!(engine.stats().cycles - cycles, 1);
    assert!(!engine.tree().to_html().contains("Overview"));
}

#[test]
fn test_changes_before_start_are_not_recorded() {
    let mut engine = engine("<main id='m'></main>");
    let tree = engine.tree();
    let main = tree.find_element_by_id("m").unwrap();
    let node = tree.create_fragment("<p>Overview</p>").remove(0);
    tree.append_child(&main, &node);

    assert!(!engine.pump_changes());
    engine.start();
    assert!(!engine.pump_changes());
    engine.run_until_idle(&mut TimeoutFallback);

    assert!(engine.tree().to_html().contains("<p>概览</p>"));
}
