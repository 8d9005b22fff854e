//! Prefetch configuration loading and validation (.folio/config.toml).

pub mod config;
mod config_merge;
pub mod defaults;
pub mod init;
pub mod paths;
pub mod validate;

pub use config::{
    CURRENT_SCHEMA_VERSION, FolioConfig, IdleConfig, PageImages, PrefetchSettings, SeedEntry,
};
pub use init::init_site;
pub use validate::{validate_config, validate_loaded_config};
