//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use std::fs;
use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

/// 在临时目录中准备页面、词库与配置
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("page.html"), common::DASHBOARD_PAGE).unwrap();
    fs::write(dir.path().join("dict.json"), common::DICTIONARY_JSON).unwrap();
    fs::write(
        dir.path().join("livedict.json"),
        format!(
            r#"{{"settings_path": "{}"}}"#,
            dir.path().join("settings.json").display()
        ),
    )
    .unwrap();
    dir
}

fn livedict(dir: &Path, args: &[&str]) -> Output {
    livedict_with_env(dir, &[], args)
}

fn livedict_with_env(dir: &Path, vars: &[(&str, &str)], args: &[&str]) -> Output {
    let mut cmd = Command::cargo_bin("livedict").unwrap();
    cmd.current_dir(dir)
        .env("LIVEDICT_LOG_LEVEL", "off")
        .env_remove("LIVEDICT_DICT_SOURCES")
        .env_remove("LIVEDICT_BILINGUAL");
    for (name, value) in vars {
        cmd.env(name, value);
    }
    cmd.args(["--config", "livedict.json"])
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[cfg(test)]
mod passing {
    use super::*;

    #[test]
    fn translate_page() {
        let dir = workspace();
        let output = livedict(dir.path(), &["translate", "page.html", "-d", "dict.json"]);

        assert!(output.status.success());
        let html = stdout(&output);
        assert!(html.contains("<h1>仪表盘</h1>"));
        assert!(html.contains("<pre><code>Dashboard</code></pre>"));
    }

    #[test]
    fn translate_bilingual_to_file() {
        let dir = workspace();
        let output = livedict(
            dir.path(),
            &["translate", "page.html", "-d", "dict.json", "--bilingual", "-o", "out.html"],
        );

        assert!(output.status.success());
        let html = fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert!(html.contains("<h1>仪表盘（Dashboard）</h1>"));
    }

    #[test]
    fn translate_without_dictionary_leaves_page_untouched() {
        let dir = workspace();
        let output = livedict(dir.path(), &["translate", "page.html", "-d", "missing.json"]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("<h1>Dashboard</h1>"));
    }

    #[test]
    fn toggle_bilingual_persists() {
        let dir = workspace();

        let output = livedict(dir.path(), &["toggle-bilingual"]);
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), "bilingual mode: on");

        let output = livedict(dir.path(), &["translate", "page.html", "-d", "dict.json"]);
        assert!(stdout(&output).contains("<h1>仪表盘（Dashboard）</h1>"));

        let output = livedict(dir.path(), &["toggle-bilingual"]);
        assert_eq!(stdout(&output).trim(), "bilingual mode: off");
    }

    #[test]
    fn bilingual_env_overrides_persisted_setting() {
        let dir = workspace();
        fs::write(dir.path().join("settings.json"), r#"{"bilingual_mode": true}"#).unwrap();

        let output = livedict_with_env(
            dir.path(),
            &[("LIVEDICT_BILINGUAL", "false")],
            &["translate", "page.html", "-d", "dict.json"],
        );
        assert!(output.status.success());
        let html = stdout(&output);
        assert!(html.contains("<h1>仪表盘</h1>"));
        assert!(!html.contains("（Dashboard）"));

        let output = livedict(dir.path(), &["translate", "page.html", "-d", "dict.json"]);
        assert!(stdout(&output).contains("<h1>仪表盘（Dashboard）</h1>"));
    }

    #[test]
    fn env_docs_lists_variables() {
        let dir = workspace();
        let output = livedict(dir.path(), &["env-docs"]);

        assert!(output.status.success());
        let docs = stdout(&output);
        assert!(docs.starts_with("# Environment Variables"));
        assert!(docs.contains("`LIVEDICT_BILINGUAL`"));
        assert!(docs.contains("`NO_COLOR`"));
    }

    #[test]
    fn export_terms_to_file() {
        let dir = workspace();
        let output = livedict(dir.path(), &["export-terms", "page.html", "-o", "terms.json"]);

        assert!(output.status.success());
        let terms: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("terms.json")).unwrap())
                .unwrap();
        assert_eq!(terms["Dashboard"], "");
        assert_eq!(terms["Search..."], "");
        assert_eq!(terms["Main navigation"], "");
        assert!(terms.get("Overview").is_none());
    }

    #[test]
    fn merge_seed() {
        let dir = workspace();
        fs::write(dir.path().join("zh-cn.json"), r#"{"Dashboard": "", "Usage": "用量"}"#).unwrap();
        fs::write(dir.path().join("seed.json"), r#"{"Dashboard": "仪表盘", "Usage": "使用"}"#)
            .unwrap();

        let output = livedict(dir.path(), &["merge", "zh-cn.json", "seed.json"]);
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), "Successfully updated 1 entries.");

        let merged = fs::read_to_string(dir.path().join("zh-cn.json")).unwrap();
        assert!(merged.contains("仪表盘"));
        assert!(merged.contains("用量"));
    }

    #[test]
    fn refresh_reports_entries() {
        let dir = workspace();
        let output = livedict(dir.path(), &["refresh", "-d", "dict.json"]);

        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), "loaded 7 entries");
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use super::*;

    #[test]
    fn translate_missing_input() {
        let dir = workspace();
        let output = livedict(dir.path(), &["translate", "nope.html", "-d", "dict.json"]);

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("nope.html"));
    }

    #[test]
    fn export_terms_unreachable_url() {
        let dir = workspace();
        let output = livedict(dir.path(), &["export-terms", "http://127.0.0.1:9/page.html"]);

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    }

    #[test]
    fn refresh_without_any_source() {
        let dir = workspace();
        let output = livedict(dir.path(), &["refresh", "-d", "missing.json"]);

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("no dictionary"));
    }

    #[test]
    fn merge_rejects_non_object_seed() {
        let dir = workspace();
        fs::write(dir.path().join("zh-cn.json"), "{}").unwrap();
        fs::write(dir.path().join("seed.json"), "[]").unwrap();

        let output = livedict(dir.path(), &["merge", "zh-cn.json", "seed.json"]);
        assert!(!output.status.success());
    }

    #[test]
    fn unknown_subcommand() {
        let dir = workspace();
        let output = livedict(dir.path(), &["translate-everything"]);
        assert!(!output.status.success());
    }
}
