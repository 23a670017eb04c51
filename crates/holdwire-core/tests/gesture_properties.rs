//! Property tests for the hold-gesture machine.
//!
//! Random input-event sequences are replayed against the machine with a
//! hand-advanced clock, and the emitted intent stream is checked against the
//! protocol invariants: every cycle starts with Push, Hold intents only
//! occur inside a cycle and respect the throttle, and exactly one Release
//! closes each cycle.

use std::time::{Duration, Instant};

use holdwire_core::{GestureAction, GestureConfig, HoldGesture};
use holdwire_proto::{Intent, Phase};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Press,
    Release,
    /// Advance the clock by this many milliseconds, firing due deadlines.
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Press),
        2 => Just(Op::Release),
        3 => (1u64..8_000).prop_map(Op::Advance),
    ]
}

/// Replay ops and collect every emitted intent with its emission time.
fn replay(ops: &[Op]) -> (HoldGesture, Vec<(Instant, Intent)>) {
    let mut gesture = HoldGesture::new(GestureConfig::default());
    let mut now = Instant::now();
    let mut emitted = Vec::new();

    let mut collect = |at: Instant, actions: Vec<GestureAction>, out: &mut Vec<(Instant, Intent)>| {
        for action in actions {
            if let GestureAction::Emit(intent) = action {
                out.push((at, intent));
            }
        }
    };

    for op in ops {
        match op {
            Op::Press => {
                let actions = gesture.press(now);
                collect(now, actions, &mut emitted);
            },
            Op::Release => {
                let actions = gesture.release(now);
                collect(now, actions, &mut emitted);
            },
            Op::Advance(ms) => {
                now += Duration::from_millis(*ms);
                // Fire each due deadline at its own instant, the way the
                // driver's sleep loop would.
                while let Some(deadline) = gesture.next_deadline() {
                    if deadline > now {
                        break;
                    }
                    let actions = gesture.tick(deadline);
                    collect(deadline, actions, &mut emitted);
                }
            },
        }
    }

    (gesture, emitted)
}

proptest! {
    #[test]
    fn intent_stream_is_well_formed(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (_, emitted) = replay(&ops);

        let mut in_cycle = false;
        for (_, intent) in &emitted {
            match intent.phase {
                Phase::Push => in_cycle = true,
                Phase::Hold => prop_assert!(in_cycle, "Hold intent outside a cycle"),
                Phase::Release => {
                    prop_assert!(in_cycle, "Release intent without a preceding Push");
                    in_cycle = false;
                },
                Phase::Idle => prop_assert!(false, "Idle is never emitted"),
            }
        }
    }

    #[test]
    fn release_always_lands_in_idle(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let config = GestureConfig::default();
        let mut gesture = HoldGesture::new(config);
        let mut now = Instant::now();

        for op in &ops {
            match op {
                Op::Press => {
                    gesture.press(now);
                },
                Op::Release => {
                    gesture.release(now);
                    prop_assert_eq!(gesture.phase(), Phase::Idle);
                    prop_assert_eq!(gesture.next_deadline(), None);
                },
                Op::Advance(ms) => {
                    now += Duration::from_millis(*ms);
                    while let Some(deadline) = gesture.next_deadline() {
                        if deadline > now {
                            break;
                        }
                        gesture.tick(deadline);
                    }
                },
            }
        }
    }

    #[test]
    fn hold_emissions_respect_min_interval(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let min_update = GestureConfig::default().min_update_interval;
        let (_, emitted) = replay(&ops);

        let mut last_hold: Option<Instant> = None;
        for (at, intent) in &emitted {
            match intent.phase {
                Phase::Hold => {
                    if let Some(prev) = last_hold {
                        prop_assert!(at.saturating_duration_since(prev) >= min_update);
                    }
                    last_hold = Some(*at);
                },
                // A new cycle resets the throttle window.
                Phase::Push | Phase::Release => last_hold = None,
                Phase::Idle => {},
            }
        }
    }

    #[test]
    fn hold_durations_are_monotonic_within_a_cycle(
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let (_, emitted) = replay(&ops);

        let mut last: Option<u64> = None;
        for (_, intent) in &emitted {
            match intent.phase {
                Phase::Push => last = Some(0),
                Phase::Hold | Phase::Release => {
                    if let Some(prev) = last {
                        prop_assert!(intent.duration >= prev);
                    }
                    last = Some(intent.duration);
                },
                Phase::Idle => {},
            }
        }
    }
}
