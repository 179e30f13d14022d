//! Shared value types published by the client.

use serde::{Deserialize, Serialize};

/// Ordered list of names celebrated on a single day.
///
/// An empty list is a valid lookup result (a date with no name days) and is
/// distinct from a failed fetch.
pub type NameList = Vec<String>;

/// Where the client currently is in its fetch cycle.
///
/// Any navigation or explicit refresh moves the phase to `InFlight`; the
/// completion of the newest fetch moves it to `Settled`, whether the lookup
/// succeeded or failed. A superseded fetch never touches the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    InFlight,
    Settled,
}

/// Display strings derived from the active cursor date, shown as a header
/// by list-style frontends. The daily notification collaborator reads only
/// `weekday`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateLabel {
    /// `"YYYY. MM. DD."`
    pub long_date: String,
    /// Weekday name in the configured locale.
    pub weekday: String,
}
