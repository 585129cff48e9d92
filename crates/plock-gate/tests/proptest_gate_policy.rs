//! Property-based tests for the gate's attempt policy.
//!
//! 1. Too-short patterns never consume attempts
//! 2. The gate locks exactly when consecutive failures reach the limit
//! 3. A successful unlock always resets the failure count
//! 4. Nothing unlocks while locked out

use plock_core::{Event, GridLayout, PointerEventKind};
use plock_gate::{GateConfig, GateEvent, LockGate};
use proptest::prelude::*;
use web_time::{Duration, Instant};

const L_SHAPE: [u8; 5] = [0, 1, 2, 5, 8];

fn layout() -> GridLayout {
    GridLayout::new(200.0).with_padding(10.0)
}

fn gate(max_attempts: u32) -> LockGate {
    let mut config = GateConfig {
        layout: layout(),
        ..GateConfig::default()
    };
    config.attempts.max_attempts = max_attempts;
    config.recognizer.feedback_delay_ms = 0;
    LockGate::from_config(&config).unwrap()
}

fn draw(gate: &mut LockGate, indices: &[u8], t: Instant) -> Vec<GateEvent> {
    let targets = layout().targets();
    let mut out = Vec::new();
    for (i, &index) in indices.iter().enumerate() {
        let c = targets[usize::from(index)].center();
        let kind = if i == 0 {
            PointerEventKind::Down
        } else {
            PointerEventKind::Move
        };
        out.extend(gate.handle(&Event::pointer(kind, c.x, c.y), t));
    }
    out.extend(gate.handle(&Event::pointer(PointerEventKind::Up, 0.0, 0.0), t));
    out
}

/// Duplicate-free paths through adjacent-enough targets (direct jumps only
/// sample endpoints, so any order works).
fn path_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<u8>> {
    Just((0u8..9).collect::<Vec<u8>>())
        .prop_shuffle()
        .prop_flat_map(move |all| (min..=max).prop_map(move |n| all[..n].to_vec()))
}

#[derive(Debug, Clone)]
enum Attempt {
    Short(Vec<u8>),
    Wrong(Vec<u8>),
    Right,
}

fn attempt_strategy() -> impl Strategy<Value = Attempt> {
    prop_oneof![
        path_strategy(1, 3).prop_map(Attempt::Short),
        path_strategy(4, 9)
            .prop_filter("must differ from the reference", |p| p.as_slice() != L_SHAPE)
            .prop_map(Attempt::Wrong),
        Just(Attempt::Right),
    ]
}

proptest! {
    #[test]
    fn short_patterns_never_count(path in path_strategy(1, 3), repeats in 1usize..10) {
        let mut gate = gate(3);
        let t = Instant::now();
        for i in 0..repeats {
            let events = draw(&mut gate, &path, t + Duration::from_secs(i as u64));
            let too_short = events.iter().any(|e| matches!(e, GateEvent::TooShort { .. }));
            prop_assert!(too_short);
        }
        prop_assert_eq!(gate.remaining_attempts(), 3);
        prop_assert!(!gate.is_locked(t));
    }

    #[test]
    fn lock_tracks_consecutive_failures(
        max_attempts in 1u32..6,
        attempts in prop::collection::vec(attempt_strategy(), 1..20),
    ) {
        let mut gate = gate(max_attempts);
        let t0 = Instant::now();
        let mut consecutive = 0u32;
        let mut locked = false;

        for (i, attempt) in attempts.iter().enumerate() {
            // Well inside the 30 s lockout for the whole run.
            let t = t0 + Duration::from_millis(i as u64 * 100);
            let events = match attempt {
                Attempt::Short(p) | Attempt::Wrong(p) => draw(&mut gate, p, t),
                Attempt::Right => draw(&mut gate, &L_SHAPE, t),
            };
            let unlocked = events.iter().any(|e| matches!(e, GateEvent::Unlocked { .. }));

            if locked {
                prop_assert!(!unlocked, "unlocked while locked out");
                prop_assert!(events.iter().all(|e| matches!(e, GateEvent::Cleared)));
                continue;
            }
            match attempt {
                Attempt::Short(_) => {}
                Attempt::Wrong(_) => consecutive += 1,
                Attempt::Right => {
                    prop_assert!(unlocked);
                    consecutive = 0;
                }
            }
            if consecutive >= max_attempts {
                locked = true;
                let locked_out = events.iter().any(|e| matches!(e, GateEvent::LockedOut { .. }));
                prop_assert!(locked_out);
            }
            prop_assert_eq!(gate.is_locked(t), locked);
            if !locked {
                prop_assert_eq!(gate.remaining_attempts(), max_attempts - consecutive);
            }
        }
    }
}
