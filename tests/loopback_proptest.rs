//! Property-based tests for cycle verification.
//!
//! Uses `proptest` to generate clean and corrupted streams and checks the
//! reports the verifier emits for them.

mod common;

use common::{clean_stream, ScriptedTransport};
use ftloop::{CycleReport, Event, LoopbackVerifier, TestPattern, VerificationState, VerifierConfig};
use proptest::prelude::*;

/// Feed `data` in reads of `chunk` bytes and collect the cycle reports.
fn run_stream(data: &[u8], chunk: usize) -> Vec<CycleReport> {
    let t = ScriptedTransport::chunked(data, chunk);
    let mut v = LoopbackVerifier::start(t, Vec::new(), VerifierConfig::default()).unwrap();
    while v.step().unwrap() > 0 {}
    let (_, events) = v.into_parts();
    events
        .into_iter()
        .filter_map(|e| match e {
            Event::Cycle(r) => Some(r),
            Event::Mismatch(_) => None,
        })
        .collect()
}

proptest! {
    /// N intact cycles produce exactly N passing reports, whatever the read size.
    #[test]
    fn clean_cycles_all_pass(n in 1usize..8, chunk in 1usize..600) {
        let reports = run_stream(&clean_stream(n), chunk);
        prop_assert_eq!(reports.len(), n);
        for (i, r) in reports.iter().enumerate() {
            prop_assert_eq!(r.cycle_index, i as u64 + 1);
            prop_assert!(r.passed);
        }
    }

    /// Altering one non-marker byte fails exactly the cycle it belongs to.
    #[test]
    fn single_corruption_fails_one_cycle(
        n in 1usize..6,
        target in 0usize..6,
        offset in 0usize..254,
        delta in 1u8..=255,
    ) {
        let target = target % n;
        let mut data = clean_stream(n);
        // Cycle 0 is 256 bytes, later cycles 255; the marker is the last byte.
        let (start, len) = if target == 0 { (0, 256) } else { (256 + (target - 1) * 255, 255) };
        let pos = start + offset % (len - 1);
        let corrupted = data[pos].wrapping_add(delta);
        prop_assume!(corrupted != 0xFF);
        data[pos] = corrupted;

        let reports = run_stream(&data, 4096);
        prop_assert_eq!(reports.len(), n);
        for (i, r) in reports.iter().enumerate() {
            prop_assert_eq!(r.passed, i != target, "cycle {} passed={}", i + 1, r.passed);
        }
    }

    /// Whatever came before, the byte expected after a marker is 0x01.
    #[test]
    fn marker_always_restarts_at_one(prefix in proptest::collection::vec(any::<u8>(), 0..600)) {
        let mut state = VerificationState::new(&TestPattern::full());
        let mut sink = Vec::new();
        for b in prefix {
            state.observe(b, &mut sink);
        }
        let before = state.cycle_count();
        let report = state.observe(0xFF, &mut sink);
        prop_assert!(report.is_some());
        prop_assert_eq!(state.expected_next_byte(), 0x01);
        prop_assert_eq!(state.cycle_count(), before + 1);
        prop_assert!(!state.cycle_failed());
    }
}
