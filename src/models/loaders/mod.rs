pub mod toml_loader;

pub use toml_loader::{load_all_settings_presets, load_settings_preset};
