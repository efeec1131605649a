use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::paths::{self, Family, Scope};
use crate::config::validate_host_name;

/// A native messaging host manifest, as browsers read it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub path: PathBuf,
    /// Always `"stdio"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Vec<String>>,
}

impl Manifest {
    /// Build the manifest for one browser, keeping only the allow-list its family reads.
    pub fn for_browser(
        browser: &str,
        host_name: &str,
        description: &str,
        exe_path: &Path,
        allowed_origins: &[String],
        allowed_extensions: &[String],
    ) -> io::Result<Self> {
        let family = paths::browser_config(browser)?.family;
        let (origins, extensions) = match family {
            Family::Chromium => (Some(allowed_origins.to_vec()), None),
            Family::Firefox => (None, Some(allowed_extensions.to_vec())),
        };
        Ok(Self {
            name: host_name.to_string(),
            description: description.to_string(),
            path: exe_path.to_path_buf(),
            kind: "stdio".to_string(),
            allowed_origins: origins,
            allowed_extensions: extensions,
        })
    }

    pub fn to_json(&self) -> io::Result<String> {
        serde_json::to_string_pretty(self).map_err(io::Error::other)
    }
}

fn check_exe_path(exe_path: &Path) -> io::Result<()> {
    // Chromium and Firefox both require an absolute path on macOS and Linux.
    if cfg!(unix) && !exe_path.is_absolute() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("host executable path must be absolute: {}", exe_path.display()),
        ));
    }
    Ok(())
}

/// Write manifests for `browsers` and, on Windows, the registry keys pointing at them.
///
/// Browsers with no manifest location for this OS and scope are skipped.
pub fn install(
    host_name: &str,
    description: &str,
    exe_path: &Path,
    allowed_origins: &[String],
    allowed_extensions: &[String],
    browsers: &[&str],
    scope: Scope,
) -> io::Result<()> {
    validate_host_name(host_name)?;
    check_exe_path(exe_path)?;

    for &browser in browsers {
        let manifest = Manifest::for_browser(
            browser,
            host_name,
            description,
            exe_path,
            allowed_origins,
            allowed_extensions,
        )?;
        let file = match paths::manifest_path(browser, scope, host_name) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::Unsupported => {
                tracing::debug!(browser, ?scope, "no manifest location, skipping");
                continue;
            }
            Err(e) => return Err(e),
        };
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&file, manifest.to_json()?)?;
        tracing::info!(browser, path = %file.display(), "manifest written");

        register(browser, scope, host_name, &file)?;
    }
    Ok(())
}

/// Check that manifests for `host_name` are in place.
///
/// With `Some(browsers)`, every listed browser that has a location on this OS must
/// have a readable manifest naming `host_name`. With `None`, any known browser will do.
pub fn verify_installed(
    host_name: &str,
    browsers: Option<&[&str]>,
    scope: Scope,
) -> io::Result<bool> {
    match browsers {
        Some(list) => {
            let mut checked = 0;
            for &browser in list {
                match is_installed(browser, scope, host_name)? {
                    Some(true) => checked += 1,
                    Some(false) => return Ok(false),
                    None => {}
                }
            }
            Ok(checked > 0)
        }
        None => {
            for browser in paths::known_browsers()? {
                if is_installed(browser, scope, host_name)? == Some(true) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// `None` when the browser has no location on this OS/scope.
fn is_installed(browser: &str, scope: Scope, host_name: &str) -> io::Result<Option<bool>> {
    let file = match paths::manifest_path(browser, scope, host_name) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::Unsupported => return Ok(None),
        Err(e) => return Err(e),
    };
    let raw = match fs::read_to_string(&file) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Some(false)),
        Err(e) => return Err(e),
    };
    let named_right = serde_json::from_str::<Manifest>(&raw)
        .map(|m| m.name == host_name)
        .unwrap_or(false);
    Ok(Some(named_right && is_registered(browser, scope, host_name, &file)?))
}

/// Delete manifests (and registry keys) for `browsers`. Missing entries are ignored.
pub fn remove(host_name: &str, browsers: &[&str], scope: Scope) -> io::Result<()> {
    for &browser in browsers {
        let file = match paths::manifest_path(browser, scope, host_name) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::Unsupported => continue,
            Err(e) => return Err(e),
        };
        match fs::remove_file(&file) {
            Ok(()) => tracing::info!(browser, path = %file.display(), "manifest removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        unregister(browser, scope, host_name)?;
    }
    Ok(())
}

#[cfg(all(windows, feature = "windows-registry"))]
fn register(browser: &str, scope: Scope, host_name: &str, file: &Path) -> io::Result<()> {
    let key = paths::winreg_key_path(browser, scope, host_name)?;
    super::winreg::write_manifest_reg(scope, &key, file)
}

#[cfg(not(all(windows, feature = "windows-registry")))]
fn register(_browser: &str, _scope: Scope, _host_name: &str, _file: &Path) -> io::Result<()> {
    if cfg!(windows) {
        tracing::warn!("built without `windows-registry`; browsers will not find the manifest");
    }
    Ok(())
}

#[cfg(all(windows, feature = "windows-registry"))]
fn is_registered(browser: &str, scope: Scope, host_name: &str, file: &Path) -> io::Result<bool> {
    let key = paths::winreg_key_path(browser, scope, host_name)?;
    Ok(super::winreg::read_manifest_path_from_reg(scope, &key)?.as_deref() == Some(file))
}

#[cfg(not(all(windows, feature = "windows-registry")))]
fn is_registered(_browser: &str, _scope: Scope, _host_name: &str, _file: &Path) -> io::Result<bool> {
    Ok(true)
}

#[cfg(all(windows, feature = "windows-registry"))]
fn unregister(browser: &str, scope: Scope, host_name: &str) -> io::Result<()> {
    let key = paths::winreg_key_path(browser, scope, host_name)?;
    super::winreg::remove_manifest_reg(scope, &key)
}

#[cfg(not(all(windows, feature = "windows-registry")))]
fn unregister(_browser: &str, _scope: Scope, _host_name: &str) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chromium_manifest_keeps_only_origins() {
        let m = Manifest::for_browser(
            "chrome",
            "com.example.host",
            "desc",
            Path::new("/abs/host"),
            &["chrome-extension://abc/".to_string()],
            &["echo@example.org".to_string()],
        )
        .unwrap();
        let v: serde_json::Value = serde_json::from_str(&m.to_json().unwrap()).unwrap();
        assert_eq!(v["type"], "stdio");
        assert_eq!(v["allowed_origins"][0], "chrome-extension://abc/");
        assert!(v.get("allowed_extensions").is_none());
    }

    #[test]
    fn firefox_manifest_keeps_only_extensions() {
        let m = Manifest::for_browser(
            "firefox",
            "com.example.host",
            "desc",
            Path::new("/abs/host"),
            &["chrome-extension://abc/".to_string()],
            &["echo@example.org".to_string()],
        )
        .unwrap();
        assert!(m.allowed_origins.is_none());
        assert_eq!(m.allowed_extensions.as_deref(), Some(&["echo@example.org".to_string()][..]));
    }

    #[cfg(unix)]
    #[test]
    fn relative_exe_path_is_rejected() {
        let err = check_exe_path(Path::new("relative/host")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
