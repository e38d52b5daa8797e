/*!
 * Progress reporting for ingestion runs
 *
 * Notifications are advisory: the pipeline never looks at what a reporter
 * does with them. Reporters run synchronously on the pipeline's own thread,
 * so they must return promptly.
 *
 * Cancellation travels the other way: the caller flips a token and the
 * pipeline notices before its next discovered entry or file read.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use strum::Display;

/// Position of a run in the pipeline state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Stage {
    Idle,
    Discovering,
    Reading,
    BuildingTree,
    Summarizing,
    Serializing,
    Done,
    Failed,
}

impl Stage {
    /// Whether the run has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// A single progress notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: Stage,
    /// Human-readable description of what is happening
    pub message: String,
    /// Completion estimate, 0 to 100 and never decreasing within a run
    pub percent: Option<u8>,
}

/// Trait for receiving progress notifications
pub trait ProgressReporter {
    /// Called on every stage transition and periodically while reading
    fn report(&self, update: &ProgressUpdate);
}

// Implement ProgressReporter for closures
impl<F> ProgressReporter for F
where
    F: Fn(&ProgressUpdate),
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Shared flag used to stop a run early. Checked before each discovered
/// entry and before each file read.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
