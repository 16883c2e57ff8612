use crate::error::SyncResult;
use crate::hku_page::model::Seminar;
use async_trait::async_trait;
use std::fmt::{self, Display};

/// Common capability of the two sync targets. Both consume the same
/// normalized occurrence stream; only the persistence policy differs.
#[async_trait]
pub trait Synchronizer {
    async fn reconcile(&self, seminars: &[Seminar]) -> SyncResult<SyncReport>;
}

/// Counts reported by a completed pass, for the final log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub invites_sent: usize,
    pub events_created: usize,
    pub events_deleted: usize,
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sent {} new invitation(s), created {} event(s), deleted {} event(s)",
            self.invites_sent, self.events_created, self.events_deleted
        )
    }
}
