//! Intro sequence: a fixed timeline of phases, the per-element animation
//! targets for each phase, and the async driver that plays it.

pub mod assets;
pub mod phase;
pub mod sequencer;
pub mod targets;
pub mod timeline;

pub use phase::{Phase, TOTAL_RUNTIME};
pub use sequencer::{IntroHandle, IntroOutcome, IntroStatus, Sequencer, SequencerError};
pub use targets::{ClipInset, Easing, Element, TargetTable, Transition, VisualState};
pub use timeline::{Step, Timeline};

pub const TEXT_1: &str = "EVERY MARKET TELLS A STORY";
pub const TEXT_2: &str = "MOST NEVER HEAR IT";
