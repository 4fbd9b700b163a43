//! Async wrapper that runs detail fetches for a [`SelectionCoordinator`].
//!
//! Each selection spawns one fetch task on the tokio runtime. Completed
//! fetches come back over an unbounded `mpsc` channel and are fed through
//! [`SelectionCoordinator::resolve`], so a superseded fetch still completes
//! but its result is discarded.

use speciation_types::{LineageCode, SpeciesDetail};
use tokio::sync::mpsc;
use tracing::debug;

use crate::client::DetailClient;
use crate::error::FetchError;
use crate::selection::{
    FetchTicket, ResolveOutcome, SelectionCoordinator, SelectionOrigin, SelectionStatus,
};

/// A finished fetch waiting to be resolved.
#[derive(Debug)]
struct Completion {
    ticket: FetchTicket,
    result: Result<SpeciesDetail, FetchError>,
}

/// Drives detail fetches and owns the coordinator they report to.
#[derive(Debug)]
pub struct SelectionDriver {
    coordinator: SelectionCoordinator,
    client: DetailClient,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl SelectionDriver {
    /// Create an idle driver fetching from `client`.
    pub fn new(client: DetailClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            coordinator: SelectionCoordinator::new(),
            client,
            tx,
            rx,
        }
    }

    /// Select a species and start fetching its detail.
    ///
    /// Must be called from within a tokio runtime.
    pub fn select(&mut self, code: LineageCode, origin: SelectionOrigin) -> FetchTicket {
        let ticket = self.coordinator.select(code, origin);
        self.spawn_fetch(ticket.clone());
        ticket
    }

    /// Refetch the current selection. `None` when idle.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        let ticket = self.coordinator.retry()?;
        self.spawn_fetch(ticket.clone());
        Some(ticket)
    }

    /// Drop the selection; fetches still in flight become stale.
    pub fn clear(&mut self) {
        self.coordinator.clear();
    }

    /// Wait for the next fetch to complete and resolve it.
    pub async fn next_update(&mut self) -> Option<ResolveOutcome> {
        let completion = self.rx.recv().await?;
        Some(
            self.coordinator
                .resolve(&completion.ticket, completion.result),
        )
    }

    /// Resolve completions until the current selection is no longer
    /// loading, and return the resulting status.
    pub async fn settle(&mut self) -> SelectionStatus {
        while self.coordinator.status() == SelectionStatus::Loading {
            if self.next_update().await.is_none() {
                break;
            }
        }
        self.coordinator.status()
    }

    /// Current coordinator state.
    pub const fn coordinator(&self) -> &SelectionCoordinator {
        &self.coordinator
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        debug!(
            code = %ticket.code(),
            generation = ticket.generation(),
            client = client.name(),
            "spawning detail fetch"
        );
        tokio::spawn(async move {
            let result = client.fetch(ticket.code()).await;
            if tx.send(Completion { ticket, result }).is_err() {
                debug!("selection driver dropped before detail fetch completed");
            }
        });
    }
}
