//! Platform-specific locations for user patches.
//!
//! - Linux: `~/.config/vintage/patches/`
//! - macOS: `~/Library/Application Support/vintage/patches/`
//! - Windows: `%APPDATA%\vintage\patches\`
//!
//! ```rust,no_run
//! use vintage_config::paths;
//!
//! if let Some(path) = paths::find_patch("my_lead") {
//!     println!("found {}", path.display());
//! }
//! ```

use std::path::{Path, PathBuf};

const APP_NAME: &str = "vintage";
const PATCHES_SUBDIR: &str = "patches";

/// Directory holding the user's patch files. Falls back to `./vintage/patches`
/// when the platform config directory is unknown.
pub fn user_patches_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PATCHES_SUBDIR)
}

/// Create the user patch directory if needed and return it.
pub fn ensure_user_patches_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_patches_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Resolve a patch argument to a file.
///
/// `name` may be a path to an existing file, or a patch name with or
/// without `.toml` that is looked up in `search_dir`.
pub fn find_patch_in(name: &str, search_dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = search_dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// [`find_patch_in`] the user patch directory.
pub fn find_patch(name: &str) -> Option<PathBuf> {
    find_patch_in(name, &user_patches_dir())
}

/// `.toml` files directly inside `dir`, sorted. Empty if the directory is
/// missing or unreadable.
pub fn list_patches_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut patches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    patches.sort();
    patches
}

/// [`list_patches_in`] the user patch directory.
pub fn list_user_patches() -> Vec<PathBuf> {
    list_patches_in(&user_patches_dir())
}

/// File stem of a patch path.
///
/// ```rust
/// use std::path::Path;
/// use vintage_config::paths::patch_name_from_path;
///
/// assert_eq!(patch_name_from_path(Path::new("/p/warm_pad.toml")), Some("warm_pad".to_string()));
/// ```
pub fn patch_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
