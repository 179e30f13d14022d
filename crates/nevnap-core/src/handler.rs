//! Collaborator seam between the client and the presentation layer.
//!
//! List views, gesture handlers, and notification schedulers stay outside
//! the core; they receive published results through this trait. A published
//! list always replaces the previous one wholesale, and a failed refresh
//! leaves the previously published list in place from the collaborator's
//! point of view.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core_types::NameList;
use crate::errors::NameDayError;

#[async_trait]
pub trait NameDayHandler: Send + Sync {
    /// A refresh succeeded; `names` fully replaces anything shown before.
    async fn on_names_changed(&self, names: &NameList);

    /// A refresh failed. The previously published list stays valid; showing
    /// stale-but-valid data is preferred over flickering to an empty state.
    async fn on_fetch_error(&self, error: &NameDayError);
}

pub type NameDayHandlerArc = Arc<dyn NameDayHandler>;

/// Handler for callers that only consume the values returned by the
/// navigation calls themselves.
pub struct NoopHandler;

#[async_trait]
impl NameDayHandler for NoopHandler {
    async fn on_names_changed(&self, _names: &NameList) {}

    async fn on_fetch_error(&self, _error: &NameDayError) {}
}
