//! Structured progress events.
//!
//! Generators optionally hold an [`EventSender`]; every saved file is
//! reported on it.  Nothing in the generators depends on a subscriber being
//! present, and a closed channel is silently ignored.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::augment::AugmentationDecision;

/// One observable step of a dataset run.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// An augmented clip was written.
    ClipSaved {
        label: String,
        index: usize,
        path: PathBuf,
        decision: AugmentationDecision,
    },
    /// A silence clip was written.
    SilenceSaved { index: usize, path: PathBuf },
    /// Every repeat of `label` was written.
    LabelFinished { label: String, files: usize },
}

pub type EventSender = mpsc::UnboundedSender<GenerationEvent>;

/// Send `event` if someone is listening.
pub(crate) fn emit(events: Option<&EventSender>, event: GenerationEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
