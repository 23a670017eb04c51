//! Input loop around the gesture machine.
//!
//! Receives raw input events over a channel, feeds them (and due timer
//! deadlines) into the [`HoldGesture`], and executes the actions it
//! returns: wake-lock acquire/release and phase announcements through the
//! [`SessionController`].
//!
//! Every interruption source collapses to a release: pointer leaving the
//! button, a cancelled touch, and the page going hidden all end the hold
//! the same way an ordinary release does. Releasing an already idle
//! gesture produces no actions, so redundant interruptions are harmless.

use std::{sync::Arc, time::Instant};

use holdwire_core::{GestureAction, GestureConfig, HoldGesture};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{SessionController, wake::WakeLock};

/// Raw input reaching the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer or touch went down on the button.
    Press,
    /// Pointer or touch came up.
    Release,
    /// Pointer left the button area while down.
    PointerLeave,
    /// The platform cancelled the touch sequence.
    TouchCancel,
    /// The page or app went to the background.
    VisibilityHidden,
}

/// Drives a [`HoldGesture`] from an input channel and the clock.
pub struct GestureDriver<W: WakeLock> {
    gesture: HoldGesture,
    wake: W,
    controller: Arc<SessionController>,
    input: mpsc::UnboundedReceiver<InputEvent>,
}

impl<W: WakeLock> GestureDriver<W> {
    /// Create a driver and the sender used to feed it input events.
    pub fn new(
        config: GestureConfig,
        wake: W,
        controller: Arc<SessionController>,
    ) -> (Self, mpsc::UnboundedSender<InputEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            gesture: HoldGesture::new(config),
            wake,
            controller,
            input: rx,
        };
        (driver, tx)
    }

    /// Run until every input sender is dropped.
    ///
    /// A hold still in progress when the channel closes is released, so the
    /// server never sees a session end without a Release.
    pub async fn run(mut self) {
        enum Wakeup {
            Input(Option<InputEvent>),
            DeadlineDue,
        }

        loop {
            let wakeup = match self.gesture.next_deadline() {
                Some(deadline) => {
                    tokio::select! {
                        event = self.input.recv() => Wakeup::Input(event),
                        () = tokio::time::sleep_until(deadline.into()) => Wakeup::DeadlineDue,
                    }
                },
                None => Wakeup::Input(self.input.recv().await),
            };

            let event = match wakeup {
                Wakeup::Input(event) => event,
                Wakeup::DeadlineDue => {
                    let actions = self.gesture.tick(Instant::now());
                    self.execute(actions).await;
                    continue;
                },
            };

            let Some(event) = event else {
                let actions = self.gesture.release(Instant::now());
                self.execute(actions).await;
                return;
            };

            debug!(?event, "input event");
            let now = Instant::now();
            let actions = match event {
                InputEvent::Press => self.gesture.press(now),
                InputEvent::Release
                | InputEvent::PointerLeave
                | InputEvent::TouchCancel
                | InputEvent::VisibilityHidden => self.gesture.release(now),
            };
            self.execute(actions).await;
        }
    }

    async fn execute(&mut self, actions: Vec<GestureAction>) {
        for action in actions {
            match action {
                GestureAction::AcquireWakeLock => {
                    // Gameplay proceeds without the lock.
                    if let Err(error) = self.wake.acquire().await {
                        warn!(%error, "wake lock not acquired");
                    }
                },
                GestureAction::ReleaseWakeLock => self.wake.release().await,
                GestureAction::Emit(intent) => {
                    self.controller.on_phase(intent.phase, intent.duration).await;
                },
            }
        }
    }
}
