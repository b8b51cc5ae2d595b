//! Integration tests for `hookup resolve` and `hookup load`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn hookup(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hookup"))
        .arg("--cwd")
        .arg(cwd)
        .args(args)
        .output()
        .expect("Failed to run hookup")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "hookup failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("main.mjs"), "").unwrap();
    fs::write(root.join("util.js"), "").unwrap();
    fs::write(root.join("util.mjs"), "").unwrap();
    fs::create_dir_all(root.join("pages")).unwrap();
    fs::write(root.join("pages").join("index.js"), "").unwrap();
    fs::write(root.join("greeting.txt"), "hi").unwrap();
    fs::write(
        root.join("package.json"),
        r##"{"name": "app", "imports": {"#pages/*": "./pages/*"}}"##,
    )
    .unwrap();
    dir
}

#[test]
fn test_resolve_infers_directory_index() {
    let dir = project();
    let out = stdout(&hookup(
        dir.path(),
        &["resolve", "./pages", "--directories", "--extensions"],
    ));
    assert!(out.starts_with("file://"), "{out}");
    assert!(out.ends_with("/pages/index.js"), "{out}");
}

#[test]
fn test_resolve_prefers_parent_extension() {
    let dir = project();
    let out = stdout(&hookup(
        dir.path(),
        &["resolve", "./util", "--extensions", "--parent", "main.mjs"],
    ));
    assert!(out.ends_with("/util.mjs"), "{out}");
}

#[test]
fn test_resolve_without_inference_fails() {
    let dir = project();
    let output = hookup(dir.path(), &["resolve", "./util"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot find module"), "{stderr}");
}

#[test]
fn test_resolve_keeps_query() {
    let dir = project();
    let out = stdout(&hookup(
        dir.path(),
        &["resolve", "./util?v=1", "--extensions", "--handle-search"],
    ));
    assert!(out.ends_with("/util.js?v=1"), "{out}");
}

#[test]
fn test_resolve_import_map_flag() {
    let dir = project();
    let out = stdout(&hookup(
        dir.path(),
        &["resolve", "#util", "--import", "#util=./util.js"],
    ));
    assert!(out.ends_with("/util.js"), "{out}");
}

#[test]
fn test_resolve_manifest_imports_json() {
    let dir = project();
    let output = hookup(
        dir.path(),
        &[
            "--json",
            "resolve",
            "#pages/index",
            "--manifest-imports",
            "--extensions",
        ],
    );
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();

    assert_eq!(json["specifier"], "#pages/index");
    assert_eq!(json["require"], false);
    assert_eq!(json["format"], "module");
    assert!(json["url"].as_str().unwrap().ends_with("/pages/index.js"));
    assert!(json["path"].as_str().unwrap().ends_with("index.js"));
}

#[test]
fn test_resolve_require_skips_inference() {
    let dir = project();
    let output = hookup(
        dir.path(),
        &["resolve", "./util", "--extensions", "--require"],
    );
    assert!(!output.status.success());
}

#[test]
fn test_resolve_from_config_file() {
    let dir = project();
    fs::write(
        dir.path().join("hookup.json"),
        r##"{
            "resolve": {"directories": true, "extensions": [".js"]},
            "imports": {"#home": "./pages"}
        }"##,
    )
    .unwrap();

    let out = stdout(&hookup(
        dir.path(),
        &["resolve", "#home", "--config", "hookup.json"],
    ));
    assert!(out.ends_with("/pages/index.js"), "{out}");
}

#[test]
fn test_invalid_loader_config_is_reported() {
    let dir = project();
    fs::write(
        dir.path().join("hookup.json"),
        r#"{"registerLoaders": {"yaml": true}}"#,
    )
    .unwrap();

    let output = hookup(
        dir.path(),
        &["load", "./greeting.txt", "--config", "hookup.json"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("yaml"), "{stderr}");
}

#[test]
fn test_load_text() {
    let dir = project();
    let out = stdout(&hookup(dir.path(), &["load", "./greeting.txt", "--type", "text"]));
    assert_eq!(out, r#"export default "hi""#);
}

#[test]
fn test_load_buffer_json() {
    let dir = project();
    let output = hookup(
        dir.path(),
        &["--json", "load", "./greeting.txt", "--type", "buffer"],
    );
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();

    assert_eq!(json["kind"], "buffer");
    assert_eq!(json["format"], "module");
    assert_eq!(json["shortCircuit"], true);
    let source = json["source"].as_str().unwrap();
    assert!(source.contains("readFileSync("), "{source}");
    assert!(source.contains("greeting.txt"), "{source}");
}

#[test]
fn test_version() {
    let dir = project();
    let out = stdout(&hookup(dir.path(), &["version"]));
    assert!(out.starts_with("hookup "), "{out}");

    let json: serde_json::Value =
        serde_json::from_str(&stdout(&hookup(dir.path(), &["--json", "version"]))).unwrap();
    assert_eq!(json["name"], "hookup");
}
