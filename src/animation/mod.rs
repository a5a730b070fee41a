//! Playback timing: the fixed-rate clock that selects which stored frame
//! every window displays.

pub mod clock;

pub use clock::AnimationClock;
