//! Application layer for the holdwire client.
//!
//! Glue between the pure state machines and the I/O components: the
//! [`SessionController`] subscribes to every inbound bus message and merges
//! it into the [`holdwire_core::Session`], starting and stopping the
//! transport client on phase transitions; the [`GestureDriver`] feeds raw
//! input events and timer deadlines into the gesture machine and executes
//! the actions it returns.
//!
//! # Components
//!
//! - [`SessionController`]: inbound message handling and transport control
//! - [`GestureDriver`]: input loop around [`holdwire_core::HoldGesture`]
//! - [`WakeLock`]: opaque stay-awake capability (failure is non-fatal)

pub mod controller;
pub mod driver;
pub mod wake;

pub use controller::SessionController;
pub use driver::{GestureDriver, InputEvent};
pub use wake::{NoopWakeLock, WakeLock, WakeLockError};
