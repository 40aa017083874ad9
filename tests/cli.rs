use std::process::{Command, Output};

fn dropcode(args: &[&str]) -> Output {
    let dir = tempfile::TempDir::new().unwrap();
    Command::new(env!("CARGO_BIN_EXE_dropcode"))
        .args(args)
        .env_remove("RUST_LOG")
        .current_dir(dir.path())
        .output()
        .unwrap()
}

#[test]
fn unsupported_host_exits_with_error() {
    let output = dropcode(&["https://example.com/abc123"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported host"), "{stderr}");
}

#[test]
fn snippet_url_without_id_exits_with_error() {
    let output = dropcode(&["https://dropcode.dev/"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn blank_id_exits_with_error() {
    let output = dropcode(&["   "]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_argument_is_a_usage_error() {
    let output = dropcode(&[]);
    assert!(!output.status.success());
}

#[test]
fn prints_version() {
    let output = dropcode(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn non_web_scheme_exits_with_error() {
    let output = dropcode(&["file://dropcode.dev/abc"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported scheme"), "{stderr}");
}
