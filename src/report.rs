//! Per-cycle reports and the sinks that consume them.

use std::sync::mpsc;
use std::time::Duration;

/// Emitted once for every completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based index of the cycle.
    pub cycle_index: u64,
    /// Time from the start of the cycle to its marker byte.
    pub elapsed: Duration,
    /// Mean cycle time over all cycles so far, this one included.
    pub running_average: Duration,
    /// `true` if every byte of the cycle matched.
    pub passed: bool,
    /// Number of mismatching bytes seen in the cycle.
    pub mismatches: u32,
}

/// A byte that differed from the counter value expected at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// 1-based index of the cycle the byte belongs to.
    pub cycle_index: u64,
    /// Byte read from the transport.
    pub observed: u8,
    /// Byte the counter expected.
    pub expected: u8,
}

/// Everything a verifier reports, as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A cycle completed.
    Cycle(CycleReport),
    /// A byte mismatched. The run continues.
    Mismatch(Mismatch),
}

/// Receives verifier output.
///
/// Sinks are called from the thread running the verifier and must not
/// block for long.
pub trait ReportSink {
    /// Called when a cycle's marker byte is read.
    fn cycle_complete(&mut self, report: &CycleReport);

    /// Called for each mismatching byte.
    fn mismatch(&mut self, _mismatch: &Mismatch) {}
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn cycle_complete(&mut self, report: &CycleReport) {
        (**self).cycle_complete(report);
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        (**self).mismatch(mismatch);
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn cycle_complete(&mut self, report: &CycleReport) {
        (**self).cycle_complete(report);
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        (**self).mismatch(mismatch);
    }
}

/// Collects every event in order.
impl ReportSink for Vec<Event> {
    fn cycle_complete(&mut self, report: &CycleReport) {
        self.push(Event::Cycle(*report));
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        self.push(Event::Mismatch(*mismatch));
    }
}

/// Forwards events to another thread. Events sent after the receiver is
/// dropped are discarded.
impl ReportSink for mpsc::Sender<Event> {
    fn cycle_complete(&mut self, report: &CycleReport) {
        let _ = self.send(Event::Cycle(*report));
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        let _ = self.send(Event::Mismatch(*mismatch));
    }
}

/// Writes reports to the `log` facade.
///
/// Cycle results and each mismatching byte go to `debug`; a failed cycle
/// adds one `warn` line. Times are printed in microseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

fn micros(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000_000.0
}

impl ReportSink for LogSink {
    fn cycle_complete(&mut self, report: &CycleReport) {
        log::debug!("verify loop : {}", report.cycle_index);
        log::debug!("one loop    : {:.3} us", micros(report.elapsed));
        log::debug!("average     : {:.3} us", micros(report.running_average));
        if !report.passed {
            log::warn!(
                "verify failed in loop {} ({} bad bytes)",
                report.cycle_index,
                report.mismatches
            );
        }
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        log::debug!(
            "error read data : {:#04x} (expected {:#04x})",
            mismatch.observed,
            mismatch.expected
        );
    }
}

/// Sink that hands each [`Event`] to a closure. Built by [`from_fn`].
#[derive(Debug, Clone)]
pub struct FnSink<F>(F);

/// Build a sink from a closure, e.g. one that updates a UI widget.
///
/// ```
/// use ftloop::report::{from_fn, Event};
///
/// let mut failures = 0;
/// let sink = from_fn(|event| {
///     if let Event::Cycle(r) = event {
///         if !r.passed {
///             failures += 1;
///         }
///     }
/// });
/// # drop(sink);
/// ```
pub fn from_fn<F: FnMut(Event)>(f: F) -> FnSink<F> {
    FnSink(f)
}

impl<F: FnMut(Event)> ReportSink for FnSink<F> {
    fn cycle_complete(&mut self, report: &CycleReport) {
        (self.0)(Event::Cycle(*report));
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        (self.0)(Event::Mismatch(*mismatch));
    }
}
