//! Selection state machine for the species detail panel.
//!
//! ```text
//! Idle --select--> Loading --resolve(Ok)--> Loaded
//!                     |
//!                     +----resolve(Err)--> Error
//!
//! any --select--> Loading   (supersedes the outstanding fetch)
//! any --clear---> Idle
//! ```
//!
//! Every [`select`](SelectionCoordinator::select) hands out a
//! [`FetchTicket`] stamped with a fresh generation. Only the ticket of the
//! current generation may write state; a superseded fetch that completes
//! later is reported as [`ResolveOutcome::Stale`] and ignored. Nothing is
//! aborted at the transport layer.

use serde::Serialize;
use speciation_types::{LineageCode, SpeciesDetail};
use tracing::{debug, warn};

use crate::error::FetchError;

/// Which view the user selected the species from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionOrigin {
    /// The genealogy tree.
    Tree,
    /// The food-web graph.
    Graph,
}

/// Coarse status of the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStatus {
    /// Nothing selected.
    Idle,
    /// A fetch for the current selection is outstanding.
    Loading,
    /// The detail for the current selection is available.
    Loaded,
    /// The fetch for the current selection failed.
    Error,
}

/// Handle for one detail fetch. Pass it back to
/// [`SelectionCoordinator::resolve`] with the fetch result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    code: LineageCode,
    generation: u64,
}

impl FetchTicket {
    /// Lineage to fetch.
    pub const fn code(&self) -> &LineageCode {
        &self.code
    }

    /// Generation the ticket was issued in.
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Whether a fetch result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The result belonged to the current selection and is now shown.
    Applied,
    /// The result belonged to a superseded selection and was discarded.
    Stale,
}

/// Error descriptor scoped to the selection it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    /// Lineage the failed fetch was for.
    pub code: LineageCode,
    /// Human-readable cause.
    pub message: String,
    /// Whether [`SelectionCoordinator::retry`] may help.
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    generation: u64,
    origin: SelectionOrigin,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Loading,
    Loaded(Box<SpeciesDetail>),
    Failed(FetchFailure),
}

/// Owner of the detail panel's state. Single writer: every transition goes
/// through `&mut self`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCoordinator {
    generation: u64,
    code: Option<LineageCode>,
    selection: Option<Selection>,
    phase: Phase,
}

impl Default for SelectionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionCoordinator {
    /// Create an idle coordinator.
    pub const fn new() -> Self {
        Self {
            generation: 0,
            code: None,
            selection: None,
            phase: Phase::Idle,
        }
    }

    /// Select a species. Supersedes any outstanding fetch and moves to
    /// [`SelectionStatus::Loading`].
    pub fn select(&mut self, code: LineageCode, origin: SelectionOrigin) -> FetchTicket {
        self.generation = self.generation.wrapping_add(1);
        debug!(
            code = %code,
            ?origin,
            generation = self.generation,
            "species selected"
        );
        self.selection = Some(Selection {
            generation: self.generation,
            origin,
        });
        self.code = Some(code.clone());
        self.phase = Phase::Loading;
        FetchTicket {
            code,
            generation: self.generation,
        }
    }

    /// Apply a fetch result if `ticket` is still authoritative.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<SpeciesDetail, FetchError>,
    ) -> ResolveOutcome {
        if !self.is_current(ticket) {
            debug!(
                code = %ticket.code,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale detail response"
            );
            return ResolveOutcome::Stale;
        }

        self.phase = match result {
            Ok(detail) => Phase::Loaded(Box::new(detail)),
            Err(err) => {
                warn!(code = %ticket.code, error = %err, "species detail fetch failed");
                Phase::Failed(FetchFailure {
                    code: ticket.code.clone(),
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                })
            }
        };
        ResolveOutcome::Applied
    }

    /// Drop the selection. Outstanding tickets become stale.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.code = None;
        self.selection = None;
        self.phase = Phase::Idle;
    }

    /// Re-issue a ticket for the current selection. `None` when idle.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        let code = self.code.clone()?;
        let origin = self.selection?.origin;
        Some(self.select(code, origin))
    }

    /// Whether `ticket` may still write state.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        matches!(self.phase, Phase::Loading)
            && self
                .selection
                .is_some_and(|s| s.generation == ticket.generation)
            && self.code.as_ref() == Some(&ticket.code)
    }

    /// Currently selected lineage.
    pub const fn selection(&self) -> Option<&LineageCode> {
        self.code.as_ref()
    }

    /// Where the current selection came from.
    pub fn origin(&self) -> Option<SelectionOrigin> {
        self.selection.map(|s| s.origin)
    }

    /// Current status.
    pub const fn status(&self) -> SelectionStatus {
        match self.phase {
            Phase::Idle => SelectionStatus::Idle,
            Phase::Loading => SelectionStatus::Loading,
            Phase::Loaded(_) => SelectionStatus::Loaded,
            Phase::Failed(_) => SelectionStatus::Error,
        }
    }

    /// Detail for the current selection, once loaded.
    pub fn detail(&self) -> Option<&SpeciesDetail> {
        match &self.phase {
            Phase::Loaded(detail) => Some(&**detail),
            _ => None,
        }
    }

    /// Failure for the current selection, if the fetch failed.
    pub const fn error(&self) -> Option<&FetchFailure> {
        match &self.phase {
            Phase::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Serializable snapshot of the panel state.
    pub fn view(&self) -> SelectionView<'_> {
        SelectionView {
            code: self.selection(),
            origin: self.origin(),
            status: self.status(),
            detail: self.detail(),
            error: self.error(),
        }
    }
}

/// Borrowed, serializable panel state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionView<'a> {
    /// Selected lineage.
    pub code: Option<&'a LineageCode>,
    /// Where the selection came from.
    pub origin: Option<SelectionOrigin>,
    /// Panel status.
    pub status: SelectionStatus,
    /// Loaded detail.
    pub detail: Option<&'a SpeciesDetail>,
    /// Failure scoped to `code`.
    pub error: Option<&'a FetchFailure>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn detail(code: &str) -> SpeciesDetail {
        SpeciesDetail {
            lineage_code: LineageCode::from(code),
            latin_name: format!("Species {code}"),
            common_name: String::new(),
            description: String::new(),
            state: None,
            trophic_level: None,
            population: 0,
            morphology: BTreeMap::new(),
            traits: BTreeMap::new(),
            capabilities: Vec::new(),
        }
    }

    #[test]
    fn starts_idle() {
        let coordinator = SelectionCoordinator::new();
        assert_eq!(coordinator.status(), SelectionStatus::Idle);
        assert!(coordinator.selection().is_none());
        assert!(coordinator.detail().is_none());
        assert!(coordinator.error().is_none());
    }

    #[test]
    fn select_then_load() {
        let mut coordinator = SelectionCoordinator::new();
        let ticket = coordinator.select(LineageCode::from("A1"), SelectionOrigin::Tree);
        assert_eq!(coordinator.status(), SelectionStatus::Loading);
        assert_eq!(coordinator.origin(), Some(SelectionOrigin::Tree));

        let outcome = coordinator.resolve(&ticket, Ok(detail("A1")));
        assert_eq!(outcome, ResolveOutcome::Applied);
        assert_eq!(coordinator.status(), SelectionStatus::Loaded);
        assert_eq!(
            coordinator.detail().map(|d| d.latin_name.as_str()),
            Some("Species A1")
        );
    }

    #[test]
    fn superseded_fetch_never_overwrites_newer_selection() {
        let mut coordinator = SelectionCoordinator::new();
        let first = coordinator.select(LineageCode::from("A1"), SelectionOrigin::Tree);
        let second = coordinator.select(LineageCode::from("B2"), SelectionOrigin::Graph);

        // Out-of-order: B2 resolves first, then the stale A1 response lands.
        assert_eq!(
            coordinator.resolve(&second, Ok(detail("B2"))),
            ResolveOutcome::Applied
        );
        assert_eq!(
            coordinator.resolve(&first, Ok(detail("A1"))),
            ResolveOutcome::Stale
        );

        assert_eq!(coordinator.selection(), Some(&LineageCode::from("B2")));
        assert_eq!(
            coordinator.detail().map(|d| d.lineage_code.as_str()),
            Some("B2")
        );
    }

    #[test]
    fn stale_error_does_not_mask_loading() {
        let mut coordinator = SelectionCoordinator::new();
        let first = coordinator.select(LineageCode::from("A1"), SelectionOrigin::Tree);
        let _second = coordinator.select(LineageCode::from("A1"), SelectionOrigin::Tree);

        let outcome = coordinator.resolve(&first, Err(FetchError::Timeout));
        assert_eq!(outcome, ResolveOutcome::Stale);
        assert_eq!(coordinator.status(), SelectionStatus::Loading);
    }

    #[test]
    fn failure_is_scoped_to_selection() {
        let mut coordinator = SelectionCoordinator::new();
        let ticket = coordinator.select(LineageCode::from("C3"), SelectionOrigin::Graph);
        coordinator.resolve(&ticket, Err(FetchError::Status { status: 502 }));

        assert_eq!(coordinator.status(), SelectionStatus::Error);
        let failure = coordinator.error();
        assert_eq!(failure.map(|f| f.code.as_str()), Some("C3"));
        assert!(failure.is_some_and(|f| f.retryable));
    }

    #[test]
    fn ticket_applies_only_once() {
        let mut coordinator = SelectionCoordinator::new();
        let ticket = coordinator.select(LineageCode::from("A1"), SelectionOrigin::Tree);
        assert_eq!(
            coordinator.resolve(&ticket, Ok(detail("A1"))),
            ResolveOutcome::Applied
        );
        assert_eq!(
            coordinator.resolve(&ticket, Err(FetchError::Timeout)),
            ResolveOutcome::Stale
        );
        assert_eq!(coordinator.status(), SelectionStatus::Loaded);
    }

    #[test]
    fn clear_invalidates_outstanding_ticket() {
        let mut coordinator = SelectionCoordinator::new();
        let ticket = coordinator.select(LineageCode::from("A1"), SelectionOrigin::Tree);
        coordinator.clear();

        assert_eq!(
            coordinator.resolve(&ticket, Ok(detail("A1"))),
            ResolveOutcome::Stale
        );
        assert_eq!(coordinator.status(), SelectionStatus::Idle);
        assert!(coordinator.retry().is_none());
    }

    #[test]
    fn retry_reissues_for_same_selection() {
        let mut coordinator = SelectionCoordinator::new();
        let ticket = coordinator.select(LineageCode::from("A1"), SelectionOrigin::Graph);
        coordinator.resolve(&ticket, Err(FetchError::Timeout));

        let retry = coordinator.retry();
        assert!(retry.as_ref().is_some_and(|t| t.generation() > ticket.generation()));
        assert_eq!(retry.as_ref().map(FetchTicket::code), Some(ticket.code()));
        assert_eq!(coordinator.status(), SelectionStatus::Loading);
        assert_eq!(coordinator.origin(), Some(SelectionOrigin::Graph));

        // The failed ticket can no longer write.
        assert_eq!(
            coordinator.resolve(&ticket, Ok(detail("A1"))),
            ResolveOutcome::Stale
        );
    }

    #[test]
    fn view_serializes_status() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.select(LineageCode::from("A1"), SelectionOrigin::Tree);
        let json = serde_json::to_value(coordinator.view()).unwrap_or_default();
        assert_eq!(json["status"], "loading");
        assert_eq!(json["origin"], "tree");
        assert_eq!(json["code"], "A1");
    }
}
