use std::fs;
use std::io;
use std::path::Path;

/// Returns `true` if `path` names an existing directory.
///
/// Any stat failure (not found, permission denied, dangling symlink) is
/// reported as `false`. A missing candidate is the common case during
/// module resolution, not an error.
#[must_use]
pub fn is_dir(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_dir())
}

/// Returns `true` if `path` names an existing regular file.
///
/// Same failure policy as [`is_dir`].
#[must_use]
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
