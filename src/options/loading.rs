use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::frames::FailurePolicy;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Loading", inline)]
#[serde(default)]
/// Frame decoding and load-barrier parameters.
pub struct LoadingOptions {
    /// How decode failures affect the start of playback.
    #[schemars(title = "Failure Policy")]
    pub failure_policy: FailurePolicy,
    /// Start playback with whatever has loaded after this many seconds
    /// without progress. `None` waits indefinitely.
    #[schemars(skip)]
    pub stall_timeout_secs: Option<f32>,
    /// Decode worker threads.
    #[schemars(title = "Decode Threads", range(min = 1, max = 32))]
    pub decode_threads: usize,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::SkipMissing,
            stall_timeout_secs: None,
            decode_threads: 4,
        }
    }
}

impl LoadingOptions {
    /// Stall timeout as a duration, ignoring non-positive values.
    #[must_use]
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| Duration::from_secs_f32(secs))
    }
}
