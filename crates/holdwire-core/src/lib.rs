//! Pure state machines for the holdwire client.
//!
//! Protocol-relevant logic in this crate is implemented as deterministic
//! state machines isolated from I/O, timers, and scheduling. Time is passed
//! in explicitly and transitions return declarative actions describing
//! intended effects; a driver executes them.
//!
//! This keeps correctness independent of the runtime: the same code is
//! exercised by deterministic unit tests advancing `Instant`s by hand and by
//! the production driver sleeping until the machine's next deadline.
//!
//! # Components
//!
//! - [`gesture`]: hold-gesture machine (debounce, periodic emission, throttle)
//! - [`session`]: session-state reducer over inbound server messages

pub mod gesture;
pub mod session;

pub use gesture::{GestureAction, GestureConfig, HoldGesture};
pub use session::Session;
