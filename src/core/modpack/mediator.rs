// ─── Failure Mediator ───
// Decision point for partially failed mod downloads. The synchronizer
// suspends until a decision arrives; who answers (a human behind a dialog,
// or a fixed policy) is the implementor's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What to do about a batch of failed downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Launch anyway with the failed mods missing.
    Continue,
    /// Re-run the whole sync cycle: re-sync the repo, re-scan, re-diff,
    /// re-fetch. Deliberately not per-item: the remote may have changed.
    Retry,
    /// Give up on this launch.
    Abort,
}

#[async_trait]
pub trait FailureMediator: Send + Sync {
    async fn mediate(&self, failed: &[String]) -> Decision;
}

/// Fixed-policy mediator for headless operation.
pub struct PolicyMediator {
    decision: Decision,
}

impl PolicyMediator {
    pub fn new(decision: Decision) -> Self {
        Self { decision }
    }
}

#[async_trait]
impl FailureMediator for PolicyMediator {
    async fn mediate(&self, _failed: &[String]) -> Decision {
        self.decision
    }
}
