use std::{io, path::Path, path::PathBuf};
use winreg::{
    enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE},
    RegKey,
};

use super::paths::Scope;

fn hive(scope: Scope) -> RegKey {
    match scope {
        Scope::User => RegKey::predef(HKEY_CURRENT_USER),
        Scope::System => RegKey::predef(HKEY_LOCAL_MACHINE),
    }
}

/// Point the key's default value at the manifest file.
pub fn write_manifest_reg(scope: Scope, key_path: &str, manifest: &Path) -> io::Result<()> {
    let (key, _) = hive(scope).create_subkey(key_path)?;
    key.set_value("", &manifest.to_string_lossy().as_ref())
}

/// Delete the key. A missing key is not an error.
pub fn remove_manifest_reg(scope: Scope, key_path: &str) -> io::Result<()> {
    match hive(scope).delete_subkey(key_path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

pub fn read_manifest_path_from_reg(scope: Scope, key_path: &str) -> io::Result<Option<PathBuf>> {
    let key = match hive(scope).open_subkey(key_path) {
        Ok(key) => key,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let value: String = key.get_value("")?;
    Ok(Some(PathBuf::from(value)))
}
