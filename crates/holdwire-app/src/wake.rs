//! Stay-awake capability.
//!
//! Keeps the display on while the button is held. The platform service is
//! opaque and non-critical: acquisition failure is logged and gameplay
//! proceeds without it.

use async_trait::async_trait;
use thiserror::Error;

/// The platform refused or does not support the stay-awake request.
#[derive(Debug, Error)]
#[error("wake lock unavailable: {reason}")]
pub struct WakeLockError {
    /// Platform-specific failure description.
    pub reason: String,
}

/// Platform stay-awake service.
#[async_trait]
pub trait WakeLock: Send + Sync {
    /// Keep the screen awake until [`release`](Self::release) is called.
    async fn acquire(&self) -> Result<(), WakeLockError>;

    /// Let the screen sleep again. Must tolerate release without a prior
    /// successful acquire.
    async fn release(&self);
}

/// No-op implementation for platforms without the capability and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWakeLock;

#[async_trait]
impl WakeLock for NoopWakeLock {
    async fn acquire(&self) -> Result<(), WakeLockError> {
        Ok(())
    }

    async fn release(&self) {}
}
