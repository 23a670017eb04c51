//! Hold-gesture state machine.
//!
//! Converts raw press/release input into the bounded phase sequence
//! Idle -> Push -> Hold -> Release -> Idle and decides when outbound intents
//! are emitted.
//!
//! # Architecture: action-based state machine
//!
//! The machine stores no timers and performs no I/O:
//! - methods accept time as a parameter
//! - methods return `Vec<GestureAction>` for the driver to execute
//! - [`HoldGesture::next_deadline`] tells the driver how long to sleep
//!
//! # State machine
//!
//! ```text
//! ┌──────┐  press   ┌──────┐  debounce due  ┌──────┐
//! │ Idle │─────────>│ Push │───────────────>│ Hold │
//! └──────┘          └──────┘                └──────┘
//!     ▲                │                        │
//!     │    release     │        release        │
//!     └────────────────┴───────────────────────┘
//! ```
//!
//! Release is transient: it exists on the wire (exactly one Release intent
//! per cycle) but the machine lands back in Idle in the same transition.
//!
//! # Timing contract
//!
//! - Push -> Hold after a short debounce unless released first.
//! - In Hold, a periodic deadline recomputes the elapsed hold time; an
//!   intent is emitted only if the configured minimum interval has passed
//!   since the last emission. The first Hold intent after the debounce is
//!   exempt from the throttle.
//! - Every exit from Push/Hold cancels both deadlines; a stale cycle can
//!   never emit.

use std::time::{Duration, Instant};

use holdwire_proto::{Intent, Phase};

/// Actions returned by the gesture machine.
///
/// The driver executes these: publish the intent on the bus, acquire or
/// release the platform stay-awake capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    /// Keep the screen awake for the duration of the hold. Failure to
    /// acquire is non-fatal.
    AcquireWakeLock,

    /// Release the stay-awake capability.
    ReleaseWakeLock,

    /// Emit this outbound intent.
    Emit(Intent),
}

/// Gesture timing configuration.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Debounce window between Push and Hold.
    pub debounce: Duration,
    /// Period of the Hold-time recomputation while held.
    pub tick_interval: Duration,
    /// Minimum interval between emitted Hold intents, independent of the
    /// tick rate.
    pub min_update_interval: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(80),
            tick_interval: Duration::from_secs(1),
            min_update_interval: Duration::from_millis(5600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    Push,
    Hold,
}

/// Hold-gesture state machine.
///
/// Pure logic, no timers. The driver calls [`press`](Self::press) and
/// [`release`](Self::release) for input events and [`tick`](Self::tick)
/// whenever [`next_deadline`](Self::next_deadline) elapses.
#[derive(Debug, Clone)]
pub struct HoldGesture {
    state: GestureState,
    config: GestureConfig,
    push_at: Option<Instant>,
    debounce_deadline: Option<Instant>,
    tick_deadline: Option<Instant>,
    last_emit: Option<Instant>,
}

impl HoldGesture {
    /// Create an idle machine.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            state: GestureState::Idle,
            config,
            push_at: None,
            debounce_deadline: None,
            tick_deadline: None,
            last_emit: None,
        }
    }

    /// Current gameplay phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.state {
            GestureState::Idle => Phase::Idle,
            GestureState::Push => Phase::Push,
            GestureState::Hold => Phase::Hold,
        }
    }

    /// Earliest pending deadline, for the driver's sleep.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.tick_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Primary pointer-down / touch-start.
    ///
    /// From Idle: acquire the wake lock, emit a Push intent with zero
    /// duration, and arm the debounce. A press while already Push/Hold
    /// supersedes the prior cycle: its deadlines are cancelled and a fresh
    /// cycle starts (the wake lock is already held, so it is not
    /// re-acquired).
    pub fn press(&mut self, now: Instant) -> Vec<GestureAction> {
        let mut actions = Vec::new();
        if self.state == GestureState::Idle {
            actions.push(GestureAction::AcquireWakeLock);
        }

        self.state = GestureState::Push;
        self.push_at = Some(now);
        self.debounce_deadline = Some(now + self.config.debounce);
        self.tick_deadline = None;
        self.last_emit = None;

        actions.push(GestureAction::Emit(Intent::push()));
        actions
    }

    /// Pointer-up, touch-end/cancel, pointer-leave-while-held, or
    /// visibility loss.
    ///
    /// Cancels both deadlines, releases the wake lock, and emits exactly one
    /// Release intent carrying the elapsed hold time. A redundant release
    /// (already Idle) is a no-op, so at most one Release is emitted per
    /// Push.
    pub fn release(&mut self, now: Instant) -> Vec<GestureAction> {
        if self.state == GestureState::Idle {
            return Vec::new();
        }

        let elapsed = self.elapsed_secs(now);
        self.state = GestureState::Idle;
        self.push_at = None;
        self.debounce_deadline = None;
        self.tick_deadline = None;
        self.last_emit = None;

        vec![GestureAction::ReleaseWakeLock, GestureAction::Emit(Intent::release(elapsed))]
    }

    /// Fire any deadline that is due at `now`.
    ///
    /// Debounce due while in Push: transition to Hold, emit the first Hold
    /// intent immediately (throttle-exempt), and arm the periodic deadline.
    /// Periodic deadline due while in Hold: re-arm it and emit a Hold intent
    /// only if the minimum update interval has passed since the last
    /// emission.
    pub fn tick(&mut self, now: Instant) -> Vec<GestureAction> {
        let mut actions = Vec::new();

        if self.state == GestureState::Push
            && self.debounce_deadline.is_some_and(|deadline| now >= deadline)
        {
            self.state = GestureState::Hold;
            self.debounce_deadline = None;
            self.tick_deadline = Some(now + self.config.tick_interval);
            self.last_emit = Some(now);
            actions.push(GestureAction::Emit(Intent::hold(self.elapsed_secs(now))));
            return actions;
        }

        if self.state == GestureState::Hold
            && self.tick_deadline.is_some_and(|deadline| now >= deadline)
        {
            self.tick_deadline = Some(now + self.config.tick_interval);
            let due = self
                .last_emit
                .is_none_or(|last| now.saturating_duration_since(last) >= self.config.min_update_interval);
            if due {
                self.last_emit = Some(now);
                actions.push(GestureAction::Emit(Intent::hold(self.elapsed_secs(now))));
            }
        }

        actions
    }

    fn elapsed_secs(&self, now: Instant) -> u64 {
        self.push_at.map_or(0, |at| now.saturating_duration_since(at).as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitted(actions: &[GestureAction]) -> Vec<Intent> {
        actions
            .iter()
            .filter_map(|action| match action {
                GestureAction::Emit(intent) => Some(*intent),
                _ => None,
            })
            .collect()
    }

    fn machine() -> HoldGesture {
        HoldGesture::new(GestureConfig::default())
    }

    #[test]
    fn full_cycle() {
        let t0 = Instant::now();
        let mut gesture = machine();
        assert_eq!(gesture.phase(), Phase::Idle);
        assert_eq!(gesture.next_deadline(), None);

        // Press: wake lock + Push intent, debounce armed.
        let actions = gesture.press(t0);
        assert_eq!(actions[0], GestureAction::AcquireWakeLock);
        assert_eq!(emitted(&actions), vec![Intent::push()]);
        assert_eq!(gesture.phase(), Phase::Push);
        assert!(gesture.next_deadline().is_some());

        // Debounce fires: first Hold intent, throttle-exempt.
        let t1 = t0 + Duration::from_millis(80);
        let actions = gesture.tick(t1);
        assert_eq!(emitted(&actions), vec![Intent::hold(0)]);
        assert_eq!(gesture.phase(), Phase::Hold);

        // Release: wake lock released, one Release intent, back to Idle.
        let t2 = t0 + Duration::from_secs(9);
        let actions = gesture.release(t2);
        assert_eq!(
            actions,
            vec![GestureAction::ReleaseWakeLock, GestureAction::Emit(Intent::release(9))]
        );
        assert_eq!(gesture.phase(), Phase::Idle);
        assert_eq!(gesture.next_deadline(), None);
    }

    #[test]
    fn hold_intents_are_throttled() {
        let config = GestureConfig {
            debounce: Duration::from_millis(0),
            tick_interval: Duration::from_secs(1),
            min_update_interval: Duration::from_secs(5),
        };
        let t0 = Instant::now();
        let mut gesture = HoldGesture::new(config);
        gesture.press(t0);

        // Debounce fires at t=0: first Hold intent.
        let mut emits = Vec::new();
        emits.extend(emitted(&gesture.tick(t0)));

        // Tick every second until t=12.
        for s in 1..=12 {
            let at = t0 + Duration::from_secs(s);
            emits.extend(emitted(&gesture.tick(at)));
        }

        // Only t=0, t=5, t=10 pass the throttle.
        assert_eq!(emits, vec![Intent::hold(0), Intent::hold(5), Intent::hold(10)]);
    }

    #[test]
    fn rapid_tap_emits_push_then_single_release() {
        let t0 = Instant::now();
        let mut gesture = machine();

        let push = gesture.press(t0);
        assert_eq!(emitted(&push), vec![Intent::push()]);

        // Released before the debounce window elapses.
        let t1 = t0 + Duration::from_millis(10);
        let release = gesture.release(t1);
        assert_eq!(emitted(&release), vec![Intent::release(0)]);
        assert_eq!(gesture.phase(), Phase::Idle);

        // The pending debounce was cancelled: no spurious Hold afterwards.
        let t2 = t0 + Duration::from_millis(200);
        assert!(gesture.tick(t2).is_empty());
        assert_eq!(gesture.next_deadline(), None);
    }

    #[test]
    fn redundant_release_is_a_no_op() {
        let t0 = Instant::now();
        let mut gesture = machine();
        gesture.press(t0);
        gesture.tick(t0 + Duration::from_millis(80));

        let first = gesture.release(t0 + Duration::from_secs(3));
        assert_eq!(emitted(&first).len(), 1);

        // Visibility-hidden arriving after pointer-up, for example.
        let second = gesture.release(t0 + Duration::from_secs(3));
        assert!(second.is_empty());
    }

    #[test]
    fn press_supersedes_prior_cycle() {
        let t0 = Instant::now();
        let mut gesture = machine();
        gesture.press(t0);
        gesture.tick(t0 + Duration::from_millis(80));
        assert_eq!(gesture.phase(), Phase::Hold);

        // Second press while held: fresh cycle, no Release, no second wake
        // lock acquisition.
        let t1 = t0 + Duration::from_secs(5);
        let actions = gesture.press(t1);
        assert_eq!(actions, vec![GestureAction::Emit(Intent::push())]);
        assert_eq!(gesture.phase(), Phase::Push);

        // Old periodic deadline is gone; elapsed restarts from the new push.
        let t2 = t1 + Duration::from_millis(80);
        let actions = gesture.tick(t2);
        assert_eq!(emitted(&actions), vec![Intent::hold(0)]);

        let release = gesture.release(t1 + Duration::from_secs(2));
        assert_eq!(emitted(&release), vec![Intent::release(2)]);
    }

    #[test]
    fn stale_deadline_does_not_fire_after_release() {
        let t0 = Instant::now();
        let mut gesture = machine();
        gesture.press(t0);
        gesture.tick(t0 + Duration::from_millis(80));
        gesture.release(t0 + Duration::from_secs(1));

        // Ticking long past the old deadlines emits nothing.
        assert!(gesture.tick(t0 + Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn tick_before_deadline_is_silent() {
        let t0 = Instant::now();
        let mut gesture = machine();
        gesture.press(t0);
        assert!(gesture.tick(t0 + Duration::from_millis(10)).is_empty());
        assert_eq!(gesture.phase(), Phase::Push);
    }
}
