use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{collections::BTreeMap, env, io, path::PathBuf};

static BROWSERS_TOML: &str = include_str!("browsers.toml");

static BROWSERS: Lazy<Result<BTreeMap<String, BrowserConfig>, String>> =
    Lazy::new(|| toml::from_str(BROWSERS_TOML).map_err(|e| e.to_string()));

/// Install for the current user or machine-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    User,
    System,
}

/// Which manifest allow-list a browser reads.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// `allowed_origins` with `chrome-extension://<id>/` entries.
    Chromium,
    /// `allowed_extensions` with add-on IDs.
    Firefox,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BrowserConfig {
    pub family: Family,
    pub linux: Option<OsLocations>,
    pub macos: Option<OsLocations>,
    pub windows: Option<OsLocations>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OsLocations {
    pub user: Option<String>,
    pub system: Option<String>,
    /// Registry key (without the host name) under HKCU or HKLM.
    pub registry: Option<String>,
}

impl BrowserConfig {
    fn current_os(&self) -> Option<&OsLocations> {
        if cfg!(target_os = "linux") {
            self.linux.as_ref()
        } else if cfg!(target_os = "macos") {
            self.macos.as_ref()
        } else if cfg!(windows) {
            self.windows.as_ref()
        } else {
            None
        }
    }
}

fn table() -> io::Result<&'static BTreeMap<String, BrowserConfig>> {
    BROWSERS
        .as_ref()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("browsers.toml: {e}")))
}

/// Browser keys known to the embedded table, sorted.
pub fn known_browsers() -> io::Result<Vec<&'static str>> {
    Ok(table()?.keys().map(String::as_str).collect())
}

pub fn browser_config(browser: &str) -> io::Result<&'static BrowserConfig> {
    table()?.get(browser).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("unknown browser {browser:?}"),
        )
    })
}

/// Directory the browser scans for manifests on this OS.
pub fn manifest_dir(browser: &str, scope: Scope) -> io::Result<PathBuf> {
    let template = browser_config(browser)?
        .current_os()
        .and_then(|os| match scope {
            Scope::User => os.user.as_deref(),
            Scope::System => os.system.as_deref(),
        })
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{browser} has no {scope:?} manifest location on this OS"),
            )
        })?;
    expand(template).map(PathBuf::from)
}

/// Full manifest path: `<dir>/<host>.json`.
pub fn manifest_path(browser: &str, scope: Scope, host: &str) -> io::Result<PathBuf> {
    Ok(manifest_dir(browser, scope)?.join(format!("{host}.json")))
}

/// Registry key for `host`, e.g. `Software\Google\Chrome\NativeMessagingHosts\<host>`.
///
/// Read from the Windows entry regardless of the OS this runs on. `scope` only
/// picks the hive, so it is accepted for symmetry with [`manifest_path`].
pub fn winreg_key_path(browser: &str, _scope: Scope, host: &str) -> io::Result<String> {
    let base = browser_config(browser)?
        .windows
        .as_ref()
        .and_then(|os| os.registry.as_deref())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{browser} has no registry key"),
            )
        })?;
    Ok(format!(r"{base}\{host}"))
}

/// Replace `{VAR}` placeholders with environment values.
fn expand(template: &str) -> io::Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let end = rest[start..].find('}').ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unterminated placeholder in {template:?}"),
            )
        })? + start;
        let var = &rest[start + 1..end];
        let value = env::var(var).map_err(|_| {
            io::Error::new(io::ErrorKind::NotFound, format!("{var} is not set"))
        })?;
        out.push_str(&rest[..start]);
        out.push_str(&value);
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
