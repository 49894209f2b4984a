use crate::event::{BettingEvent, EventId};
use anyhow::Result;
use async_trait::async_trait;

/// A request for fresh random events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyRequest {
    /// Maximum number of events wanted.
    pub limit: usize,
    /// Ids that must not be returned.
    pub exclude_ids: Vec<EventId>,
}

/// Source of replacement events for the generator.
///
/// Implementations must honor `exclude_ids`; the selection manager rejects
/// responses that do not.
#[async_trait]
pub trait EventSupplier: Send + Sync {
    async fn random_events(&self, request: &SupplyRequest) -> Result<Vec<BettingEvent>>;
}
