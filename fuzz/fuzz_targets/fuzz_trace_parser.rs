#![no_main]

use libfuzzer_sys::fuzz_target;
use plock_harness::replay::{TraceFile, TraceReplayer};

fuzz_target!(|data: &[u8]| {
    // Must never panic: malformed input is an error, not a crash.
    let Ok(trace) = TraceFile::from_bytes(data) else {
        return;
    };
    let mut replayer = TraceReplayer::from_trace(&trace);
    let total = replayer.total();
    let mut count = 0;
    while replayer.next_step().is_some() {
        count += 1;
    }
    assert_eq!(count, total);
    assert!(replayer.is_done());
});
