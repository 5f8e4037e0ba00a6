//! Undo log for the multi-store upload.

use tracing::{error, info, warn};

use super::store::BlobStore;

/// What happened to an already written blob after a later step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationOutcome {
    /// No side effect had been performed yet.
    NotNeeded,
    /// The blob was deleted again; no persistent trace remains.
    BlobRemoved,
    /// The compensating delete failed; the blob is orphaned.
    BlobLeftBehind {
        /// Locator of the orphaned blob.
        locator: String,
        /// Why the delete failed.
        reason: String,
    },
}

impl CompensationOutcome {
    /// True when an orphaned blob needs manual reconciliation.
    #[must_use]
    pub const fn left_blob_behind(&self) -> bool {
        matches!(self, Self::BlobLeftBehind { .. })
    }
}

impl std::fmt::Display for CompensationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotNeeded => f.write_str("nothing to undo"),
            Self::BlobRemoved => f.write_str("stored object was removed"),
            Self::BlobLeftBehind { reason, .. } => {
                write!(f, "stored object was left behind: {reason}")
            }
        }
    }
}

/// A single undo action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Compensation {
    /// Delete a blob that was written in this operation.
    RemoveBlob { locator: String },
}

/// Ordered list of undo actions for side effects performed so far.
///
/// Either [`commit`](Self::commit) it once every step succeeded or
/// [`unwind`](Self::unwind) it on failure.
#[must_use]
#[derive(Debug, Default)]
pub(crate) struct CompensationLog {
    steps: Vec<Compensation>,
}

impl CompensationLog {
    pub(crate) const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Registers the undo action for a side effect that just succeeded.
    pub(crate) fn record(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    /// All steps succeeded; forget the undo actions.
    pub(crate) fn commit(mut self) {
        self.steps.clear();
    }

    /// Runs the undo actions newest first. Each is attempted exactly once.
    pub(crate) async fn unwind<B: BlobStore>(mut self, blobs: &B) -> CompensationOutcome {
        let steps = std::mem::take(&mut self.steps);
        if steps.is_empty() {
            return CompensationOutcome::NotNeeded;
        }

        let mut outcome = CompensationOutcome::BlobRemoved;
        for step in steps.into_iter().rev() {
            match step {
                Compensation::RemoveBlob { locator } => match blobs.delete(&locator).await {
                    Ok(()) => {
                        info!(locator = %locator, "compensating delete removed stored object");
                    }
                    Err(e) => {
                        error!(
                            alert = "dangling_blob",
                            locator = %locator,
                            error = %e,
                            "compensating delete failed, stored object is orphaned"
                        );
                        // Keep the first failure; later steps still run.
                        if !outcome.left_blob_behind() {
                            outcome = CompensationOutcome::BlobLeftBehind {
                                locator,
                                reason: e.to_string(),
                            };
                        }
                    }
                },
            }
        }
        outcome
    }
}

impl Drop for CompensationLog {
    fn drop(&mut self) {
        if !self.steps.is_empty() {
            warn!(
                pending = self.steps.len(),
                "compensation log dropped without commit or unwind"
            );
        }
    }
}
