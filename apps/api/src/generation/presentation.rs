//! Presentation policy for generation progress.
//!
//! The state machine reports `done` the moment the backend answers; pollers
//! are shown `generating` with an animated progress figure until a minimum
//! duration has passed since the request started.

use std::time::Duration;

use serde::Serialize;

use crate::generation::pipeline::PipelineStatus;

pub const DEFAULT_MIN_SUCCESS_DISPLAY: Duration = Duration::from_millis(8000);

/// `(threshold %, message)`; the highest threshold reached wins.
const PROGRESS_MESSAGES: &[(u8, &str)] = &[
    (0, "Initializing AI pipeline..."),
    (15, "Understanding your profile..."),
    (30, "Extracting key information..."),
    (45, "Analyzing skills & experience..."),
    (60, "Generating resume structure..."),
    (75, "Enhancing with AI..."),
    (90, "Final polish & formatting..."),
    (98, "Almost there..."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPolicy {
    pub min_success_display: Duration,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            min_success_display: DEFAULT_MIN_SUCCESS_DISPLAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedStatus {
    pub status: PipelineStatus,
    /// Percentage 0–100 while the request is presented as running.
    pub progress: Option<u8>,
    pub message: Option<&'static str>,
}

impl DisplayPolicy {
    /// What a poller should see for `status`, `elapsed` after the request began.
    pub fn present(&self, status: PipelineStatus, elapsed: Option<Duration>) -> PresentedStatus {
        let elapsed = elapsed.unwrap_or_default();
        let held = status == PipelineStatus::Done && elapsed < self.min_success_display;

        if status.is_busy() || held {
            let progress = self.progress(elapsed);
            return PresentedStatus {
                status: PipelineStatus::Generating,
                progress: Some(progress),
                message: Some(progress_message(progress)),
            };
        }

        PresentedStatus {
            status,
            progress: None,
            message: None,
        }
    }

    fn progress(&self, elapsed: Duration) -> u8 {
        if self.min_success_display.is_zero() {
            return 100;
        }
        let ratio = elapsed.as_secs_f64() / self.min_success_display.as_secs_f64();
        (ratio * 100.0).clamp(0.0, 100.0) as u8
    }
}

pub fn progress_message(progress: u8) -> &'static str {
    PROGRESS_MESSAGES
        .iter()
        .rev()
        .find(|(threshold, _)| progress >= *threshold)
        .map(|(_, message)| *message)
        .unwrap_or(PROGRESS_MESSAGES[0].1)
}
