//! Centralized runtime options with TOML preset support.
//!
//! Camera, playback, loading and display settings are consolidated here.
//! Options serialize to/from TOML so a viewer can be configured from a
//! preset file.

mod camera;
mod display;
mod loading;
mod playback;

use std::path::Path;

pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use loading::LoadingOptions;
pub use playback::PlaybackOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::FramewallError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[playback]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Playback rate.
    pub playback: PlaybackOptions,
    /// Frame decoding and load-barrier behavior.
    #[schemars(skip)]
    pub loading: LoadingOptions,
    /// Presentation toggles.
    pub display: DisplayOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::Io`] if the file cannot be read and
    /// [`FramewallError::OptionsParse`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, FramewallError> {
        let content =
            std::fs::read_to_string(path).map_err(FramewallError::Io)?;
        toml::from_str(&content)
            .map_err(|e| FramewallError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::OptionsParse`] if serialization fails and
    /// [`FramewallError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), FramewallError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FramewallError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(FramewallError::Io)?;
        }
        std::fs::write(path, content).map_err(FramewallError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FailurePolicy;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[playback]
fps = 12.0

[loading]
failure_policy = "stall"
stall_timeout_secs = 2.5
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.playback.fps, 12.0);
        assert_eq!(opts.loading.failure_policy, FailurePolicy::Stall);
        assert_eq!(
            opts.loading.stall_timeout(),
            Some(web_time::Duration::from_millis(2500))
        );
        // Everything else should be default
        assert_eq!(opts.camera.fovy, 45.0);
        assert_eq!(opts.camera.zfar, 1000.0);
        assert!(opts.display.depth_test);
    }

    #[test]
    fn non_positive_stall_timeout_is_disabled() {
        let mut opts = LoadingOptions::default();
        opts.stall_timeout_secs = Some(0.0);
        assert_eq!(opts.stall_timeout(), None);
    }

    #[test]
    fn save_then_load_preserves_options() {
        let dir = std::env::temp_dir()
            .join(format!("framewall-options-{}", std::process::id()));
        let path = dir.join("slow.toml");
        let mut opts = Options::default();
        opts.playback.fps = 5.0;
        opts.save(&path).unwrap();

        assert_eq!(Options::load(&path).unwrap(), opts);
        assert_eq!(Options::list_presets(&dir), vec!["slow".to_owned()]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("playback"));
        assert!(props.contains_key("display"));
        assert!(!props.contains_key("loading"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("znear").is_none());
    }
}
