//! Frame timing.
//!
//! One `FrameClock` per window; `tick()` once per redraw yields the clamped
//! delta the simulation steps by.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
