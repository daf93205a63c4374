//! Connections view state

use parlor_api::ApiClient;
use parlor_connections::{RequestView, RespondDecision, RespondOutcome};
use parlor_core::records::ConnectionStatus;
use parlor_core::{Page, RequestId, Result};
use serde::{Deserialize, Serialize};

/// Received, sent, and established request lists.
///
/// Counts are computed, not stored, so they cannot drift from the lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionsState {
    received: Vec<RequestView>,
    sent: Vec<RequestView>,
    established: Vec<RequestView>,
}

impl ConnectionsState {
    /// Build from already-loaded lists (query results, tests).
    pub fn from_parts(
        received: Vec<RequestView>,
        sent: Vec<RequestView>,
        established: Vec<RequestView>,
    ) -> Self {
        Self {
            received,
            sent,
            established,
        }
    }

    // ─── Queries (computed) ──────────────────────────────────

    /// Requests waiting for my decision.
    pub fn pending_received_count(&self) -> usize {
        self.received
            .iter()
            .filter(|v| v.request.status == ConnectionStatus::Pending)
            .count()
    }

    /// My requests still waiting on the other side.
    pub fn pending_sent_count(&self) -> usize {
        self.sent
            .iter()
            .filter(|v| v.request.status == ConnectionStatus::Pending)
            .count()
    }

    /// Established connections.
    pub fn established_count(&self) -> usize {
        self.established.len()
    }

    /// Whether anything needs my attention.
    pub fn has_pending(&self) -> bool {
        self.pending_received_count() > 0
    }

    /// All received requests.
    pub fn all_received(&self) -> &[RequestView] {
        &self.received
    }

    /// All sent requests.
    pub fn all_sent(&self) -> &[RequestView] {
        &self.sent
    }

    /// All established connections.
    pub fn all_established(&self) -> &[RequestView] {
        &self.established
    }

    /// Find a request anywhere in the three lists.
    pub fn request(&self, id: RequestId) -> Option<&RequestView> {
        self.received
            .iter()
            .chain(self.sent.iter())
            .chain(self.established.iter())
            .find(|v| v.request.id == id)
    }

    // ─── Operations ──────────────────────────────────────────

    /// Reload all three lists.
    pub async fn refresh<C>(&mut self, client: &C) -> Result<()>
    where
        C: ApiClient + ?Sized,
    {
        self.received = client.received_requests(Page::first()).await?.items;
        self.sent = client.sent_requests(Page::first()).await?.items;
        self.established = client.established_connections(Page::first()).await?.items;
        Ok(())
    }

    /// Respond to a received request and fold the outcome into the lists.
    ///
    /// A failed call changes nothing locally: `NotAuthorized` and
    /// `InvalidTransition` must leave the optimistic state untouched.
    pub async fn respond<C>(
        &mut self,
        client: &C,
        request: RequestId,
        decision: RespondDecision,
    ) -> Result<RespondOutcome>
    where
        C: ApiClient + ?Sized,
    {
        let outcome = client.respond_to_request(request, decision).await?;
        self.apply_outcome(&outcome);
        Ok(outcome)
    }

    /// Fold a confirmed respond outcome into the lists.
    pub fn apply_outcome(&mut self, outcome: &RespondOutcome) {
        if let Some(view) = self
            .received
            .iter_mut()
            .find(|v| v.request.id == outcome.request.id)
        {
            let accepted = outcome.request.status == ConnectionStatus::Accepted;
            view.request = outcome.request.clone();
            if accepted {
                let established = view.clone();
                self.established.insert(0, established);
            }
        }
    }
}
