#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use plock_core::{
    Event, GridLayout, PatternEvent, PatternRecognizer, PointerEvent, PointerEventKind,
    RecognizerConfig, RecognizerState, TARGET_COUNT,
};
use web_time::{Duration, Instant};

#[derive(Debug, Arbitrary)]
enum Op {
    Pointer { kind: u8, x: i16, y: i16, screen: bool },
    Resize(u16),
    SurfaceMoved(i16, i16),
    Focus(bool),
    Disable,
    Enable,
    Advance(u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    width: u16,
    minimum_length: u8,
    feedback_ms: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let config = RecognizerConfig {
        minimum_length: usize::from(input.minimum_length % 10),
        feedback_delay: Duration::from_millis(u64::from(input.feedback_ms % 2000)),
        ..RecognizerConfig::default()
    };
    let minimum = config.minimum_length;
    let mut recognizer = PatternRecognizer::new(GridLayout::new(f32::from(input.width)), config);
    let mut now = Instant::now();

    for op in input.ops {
        let events = match op {
            Op::Pointer { kind, x, y, screen } => {
                let kind = match kind % 4 {
                    0 => PointerEventKind::Down,
                    1 => PointerEventKind::Move,
                    2 => PointerEventKind::Up,
                    _ => PointerEventKind::Cancel,
                };
                let (x, y) = (f32::from(x), f32::from(y));
                let pointer = if screen {
                    PointerEvent::screen(kind, x, y)
                } else {
                    PointerEvent::new(kind, x, y)
                };
                recognizer.process(&Event::Pointer(pointer), now)
            }
            Op::Resize(width) => recognizer.process(&Event::Resize { width: f32::from(width) }, now),
            Op::SurfaceMoved(x, y) => recognizer.process(
                &Event::SurfaceMoved {
                    x: f32::from(x),
                    y: f32::from(y),
                },
                now,
            ),
            Op::Focus(gained) => recognizer.process(&Event::Focus(gained), now),
            Op::Disable => {
                recognizer.disable();
                Vec::new()
            }
            Op::Enable => {
                recognizer.enable();
                Vec::new()
            }
            Op::Advance(ms) => {
                now += Duration::from_millis(u64::from(ms));
                recognizer.check_cooldown(now).into_iter().collect()
            }
        };

        for event in events {
            if let PatternEvent::Completed { pattern } = event {
                assert!(pattern.len() >= minimum, "completed below minimum");
            }
        }

        // Post-conditions that must always hold:
        let visited = recognizer.visited();
        assert!(visited.len() <= TARGET_COUNT, "trace overflow");
        assert!(visited.iter().all(|&i| usize::from(i) < TARGET_COUNT), "index OOB");
        let mut seen = [false; TARGET_COUNT];
        for &i in visited {
            assert!(!seen[usize::from(i)], "duplicate index {i}");
            seen[usize::from(i)] = true;
        }
        if recognizer.state() == RecognizerState::Idle {
            assert!(visited.is_empty(), "idle with residue");
        }
        if !recognizer.is_enabled() {
            assert!(!recognizer.is_tracing(), "tracing while disabled");
        }
    }
});
