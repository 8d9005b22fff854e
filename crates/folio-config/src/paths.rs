use std::path::{Path, PathBuf};

/// XDG app name used for the user-level config directory.
pub const APP_NAME: &str = "folio-prefetch";

/// Directory (relative to the site root) holding the project config.
pub const PROJECT_DIR: &str = ".folio";

const CONFIG_FILE: &str = "config.toml";

/// User-level config: `~/.config/folio-prefetch/config.toml`.
///
/// Returns None if the config directory cannot be determined
/// (e.g., no HOME in containers).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Project-level config for a site root: `<site>/.folio/config.toml`.
pub fn project_config_path(site_root: &Path) -> PathBuf {
    site_root.join(PROJECT_DIR).join(CONFIG_FILE)
}
