//! Selection coordination for the Speciation dashboard.
//!
//! The user selects a species in the genealogy tree or the food-web graph;
//! this crate tracks that selection and fetches its detail, making sure a
//! slow response for an earlier selection never overwrites a newer one.
//!
//! # Modules
//!
//! - [`selection`] -- [`SelectionCoordinator`] state machine and fetch tickets.
//! - [`client`] -- [`DetailClient`] over HTTP or in-memory payloads.
//! - [`driver`] -- [`SelectionDriver`], the tokio-backed fetch loop.
//! - [`error`] -- [`FetchError`].
//!
//! [`SelectionCoordinator`]: selection::SelectionCoordinator
//! [`DetailClient`]: client::DetailClient
//! [`SelectionDriver`]: driver::SelectionDriver
//! [`FetchError`]: error::FetchError

pub mod client;
pub mod driver;
pub mod error;
pub mod selection;
