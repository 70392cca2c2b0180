//! Patch management for the vintage synth.
//!
//! A patch is a named set of synth parameters stored as TOML. This crate
//! loads and saves patch files, validates them against the parameter table,
//! ships a handful of factory patches and knows where user patches live.
//!
//! # Example
//!
//! ```rust,no_run
//! use vintage_config::{Patch, get_factory_patch, user_patches_dir, validate_patch};
//!
//! let mut patch = get_factory_patch("supersaw").unwrap();
//! patch.name = "My Supersaw".to_string();
//! patch.params.cutoff = 6000.0;
//! validate_patch(&patch).unwrap();
//!
//! patch.save(user_patches_dir().join("my_supersaw.toml")).unwrap();
//!
//! let reloaded = Patch::load(user_patches_dir().join("my_supersaw.toml")).unwrap();
//! let params = reloaded.to_params();
//! assert_eq!(params.cutoff, 6000.0);
//! ```

mod error;
mod patch;

/// Platform-specific patch locations.
pub mod paths;

/// Patch validation.
pub mod validation;

/// Factory patches bundled with the library.
pub mod factory_patches;

pub use error::ConfigError;
pub use factory_patches::{FACTORY_PATCH_NAMES, factory_patches, get_factory_patch, is_factory_patch};
pub use patch::{Patch, PatchSettings};
pub use paths::{
    ensure_user_patches_dir, find_patch, find_patch_in, list_patches_in, list_user_patches,
    patch_name_from_path, user_patches_dir,
};
pub use validation::{ValidationError, ValidationResult, validate_param, validate_patch};

/// Resolve a patch argument: a factory patch name first, then a file path or
/// a name in the user patch directory.
pub fn resolve_patch(name: &str) -> Result<Patch, ConfigError> {
    if let Some(patch) = get_factory_patch(name) {
        return Ok(patch);
    }
    match find_patch(name) {
        Some(path) => Patch::load(path),
        None => Err(ConfigError::PatchNotFound(name.to_string())),
    }
}
