//! Config path resolution
//!
//! All paths hang off the client data directory handed to the context
//! (the game directory that also holds `saves/` and `resourcepacks/`).

use std::path::{Path, PathBuf};

/// Returns the base configs directory.
///
/// Path: `<data_dir>/config/`
pub fn config_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("config")
}

/// Returns the core config path.
///
/// Path: `<data_dir>/config/lucid.toml`
pub fn core_config_path(data_dir: &Path) -> PathBuf {
    config_dir(data_dir).join("lucid.toml")
}

/// Returns the path for a module's config file.
///
/// Path: `<data_dir>/config/lucid/modules/{module_name}.toml`
pub fn module_config_path(data_dir: &Path, module_name: &str) -> PathBuf {
    config_dir(data_dir)
        .join("lucid")
        .join("modules")
        .join(format!("{}.toml", module_name))
}
