//! Fill progress reporting.
//!
//! The renderer calls a [`ProgressObserver`] synchronously after each
//! field. To watch from another thread, hand the renderer a
//! [`ProgressPublisher`]: it never blocks, keeping only the newest event
//! when the reader falls behind.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::time::Duration;

/// Receives `(fields_done, total_fields)` after each drawn field.
pub trait ProgressObserver {
    fn on_progress(&mut self, done: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Pipeline stage of a fill job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStep {
    Analyze,
    Render,
    Merge,
    Done,
}

impl FillStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillStep::Analyze => "analyze",
            FillStep::Render => "render",
            FillStep::Merge => "merge",
            FillStep::Done => "done",
        }
    }

    /// Share of the whole job finished when this step starts and ends.
    fn overall_span(&self) -> (u8, u8) {
        match self {
            FillStep::Analyze => (0, 10),
            FillStep::Render => (10, 90),
            FillStep::Merge => (90, 100),
            FillStep::Done => (100, 100),
        }
    }
}

impl std::fmt::Display for FillStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A progress snapshot; percentages are always within 0..=100.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub step: FillStep,
    pub step_percent: u8,
    pub overall_percent: u8,
    pub message: String,
}

impl ProgressEvent {
    /// Event `step_percent` of the way through `step`.
    pub fn new(step: FillStep, step_percent: f32, message: impl Into<String>) -> Self {
        let step_percent = clamp_percent(step_percent);
        let (start, end) = step.overall_span();
        let overall = f32::from(start) + f32::from(end - start) * f32::from(step_percent) / 100.0;
        Self {
            step,
            step_percent,
            overall_percent: clamp_percent(overall),
            message: message.into(),
        }
    }

    /// Render-step event after `done` of `total` fields.
    pub fn fields(done: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            done as f32 * 100.0 / total as f32
        };
        Self::new(
            FillStep::Render,
            percent,
            format!("Filled {}/{} fields", done, total),
        )
    }
}

fn clamp_percent(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Create a publish-latest progress channel.
pub fn progress_channel() -> (ProgressPublisher, ProgressReceiver) {
    let (tx, rx) = bounded(1);
    (
        ProgressPublisher {
            tx,
            drain: rx.clone(),
        },
        ProgressReceiver { rx },
    )
}

/// Sending half; publishing never waits for the reader.
#[derive(Debug, Clone)]
pub struct ProgressPublisher {
    tx: Sender<ProgressEvent>,
    drain: Receiver<ProgressEvent>,
}

impl ProgressPublisher {
    /// Publish `event`, replacing one the reader has not taken yet.
    pub fn publish(&self, event: ProgressEvent) {
        let mut event = event;
        loop {
            match self.tx.try_send(event) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    let _ = self.drain.try_recv();
                    event = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl ProgressObserver for ProgressPublisher {
    fn on_progress(&mut self, done: usize, total: usize) {
        self.publish(ProgressEvent::fields(done, total));
    }
}

/// Receiving half.
#[derive(Debug, Clone)]
pub struct ProgressReceiver {
    rx: Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Newest pending event, without blocking.
    pub fn latest(&self) -> Option<ProgressEvent> {
        self.rx.try_iter().last()
    }

    /// Wait for the next event; `None` once every publisher is gone.
    pub fn recv(&self) -> Option<ProgressEvent> {
        self.rx.recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ProgressEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Blocking iterator that ends when every publisher is dropped.
    pub fn iter(&self) -> impl Iterator<Item = ProgressEvent> + '_ {
        self.rx.iter()
    }
}
