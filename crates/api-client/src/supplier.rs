use crate::client::ApiClient;
use crate::types::EventFilters;
use async_trait::async_trait;
use parlay_core::{BettingEvent, EventSupplier, SupplyRequest};

/// Supplies replacement events from `GET /bet-events/random`.
#[derive(Debug)]
pub struct RandomEventSupplier<'a> {
    client: &'a ApiClient,
    filters: EventFilters,
}

impl<'a> RandomEventSupplier<'a> {
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            filters: EventFilters::default(),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: EventFilters) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn filters(&self) -> &EventFilters {
        &self.filters
    }
}

#[async_trait]
impl<'a> EventSupplier for RandomEventSupplier<'a> {
    async fn random_events(&self, request: &SupplyRequest) -> anyhow::Result<Vec<BettingEvent>> {
        let events = self
            .client
            .random_events(request.limit, &self.filters, &request.exclude_ids)
            .await?;
        Ok(events)
    }
}
