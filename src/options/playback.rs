use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::animation::clock::DEFAULT_FPS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Playback", inline)]
#[serde(default)]
/// Frame-sequence playback parameters.
pub struct PlaybackOptions {
    /// Timepoints advanced per second, independent of render rate.
    #[schemars(title = "Frames per Second", range(min = 0.1, max = 240.0), extend("step" = 1.0))]
    pub fps: f32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self { fps: DEFAULT_FPS }
    }
}
