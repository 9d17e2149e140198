pub mod machine;
pub mod timer;

pub use machine::{PlaybackEvent, PlaybackMachine, PlaybackPhase, PlaybackState};
pub use timer::{AdvanceTimer, Clock, ManualClock, Millis, SystemClock, TimerKind, TimerSlot};
