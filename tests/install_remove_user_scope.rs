mod common;

use native_frame::install::manifest::{install, remove, verify_installed};
use native_frame::install::paths;
use native_frame::Scope;
use serial_test::serial;

use std::path::PathBuf;

fn dummy_exe_path() -> PathBuf {
    // On Unix, manifest path must be absolute. We'll use a stable absolute placeholder.
    #[cfg(unix)]
    {
        PathBuf::from("/usr/local/bin/native-echo-host")
    }

    #[cfg(windows)]
    {
        PathBuf::from(r"C:\Program Files\native_frame\native-echo-host.exe")
    }
}

#[test]
#[serial]
fn install_then_remove_user_scope_selected_browsers() {
    let (_td, _env) = common::sandbox_env();

    let host = "com.example.installremove";
    let exe = dummy_exe_path();

    let allowed_origins = vec!["chrome-extension://test/".to_string()];
    let allowed_extensions = vec!["test@example.org".to_string()];
    let browsers: &[&str] = &["chrome", "firefox", "edge"];

    install(
        host,
        "test host",
        &exe,
        &allowed_origins,
        &allowed_extensions,
        browsers,
        Scope::User,
    )
    .unwrap();

    for b in browsers {
        if let Ok(p) = paths::manifest_path(b, Scope::User, host) {
            assert!(p.exists(), "manifest should exist for {b}: {p:?}");
            let raw = std::fs::read_to_string(&p).unwrap();
            let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(v["name"], host);
            assert_eq!(v["type"], "stdio");
            assert_eq!(v["path"], exe.to_str().unwrap());
        }
    }

    assert!(verify_installed(host, Some(browsers), Scope::User).unwrap());
    assert!(verify_installed(host, None, Scope::User).unwrap());

    remove(host, browsers, Scope::User).unwrap();

    assert!(!verify_installed(host, Some(browsers), Scope::User).unwrap());
    assert!(!verify_installed(host, None, Scope::User).unwrap());

    for b in browsers {
        if let Ok(p) = paths::manifest_path(b, Scope::User, host) {
            assert!(!p.exists(), "manifest should be removed for {b}: {p:?}");
        }
    }
}

#[test]
#[serial]
fn remove_is_idempotent() {
    let (_td, _env) = common::sandbox_env();
    remove("com.example.nothing_here", &["chrome", "firefox"], Scope::User).unwrap();
    remove("com.example.nothing_here", &["chrome", "firefox"], Scope::User).unwrap();
}

#[test]
#[serial]
fn partial_install_does_not_verify_for_the_full_list() {
    let (_td, _env) = common::sandbox_env();
    let host = "com.example.partial";

    install(
        host,
        "partial",
        &dummy_exe_path(),
        &["chrome-extension://test/".to_string()],
        &[],
        &["chrome"],
        Scope::User,
    )
    .unwrap();

    assert!(verify_installed(host, Some(&["chrome"][..]), Scope::User).unwrap());
    assert!(!verify_installed(host, Some(&["chrome", "firefox"][..]), Scope::User).unwrap());

    remove(host, &["chrome"], Scope::User).unwrap();
}

#[test]
#[serial]
fn install_rejects_unknown_browser_and_bad_name() {
    let (_td, _env) = common::sandbox_env();
    let exe = dummy_exe_path();

    let err = install("com.example.ok", "d", &exe, &[], &[], &["netscape"], Scope::User)
        .expect_err("unknown browser");
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);

    let err = install("Not A Host", "d", &exe, &[], &[], &["chrome"], Scope::User)
        .expect_err("bad host name");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}
