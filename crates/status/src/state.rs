use crate::error::ProbeError;
use crate::probe::HealthResponse;

/// The single value shown after "Backend status:".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayState {
    /// The health request has not settled yet.
    #[default]
    Loading,
    /// The endpoint answered with JSON.
    ///
    /// Shown as the literal text `data.status`; the response body is never
    /// read. This mirrors the shipped page, which rendered the expression
    /// text instead of the `status` field it presumably meant to show.
    DataStatus,
    /// The request failed or the body was not JSON.
    Error,
}

impl DisplayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayState::Loading => "loading...",
            DisplayState::DataStatus => "data.status",
            DisplayState::Error => "error",
        }
    }

    /// Returns true once the request has settled.
    pub fn is_settled(&self) -> bool {
        !matches!(self, DisplayState::Loading)
    }

    /// Maps a settled health check to the value to display.
    pub fn from_probe(outcome: &Result<HealthResponse, ProbeError>) -> Self {
        match outcome {
            Ok(_) => DisplayState::DataStatus,
            Err(_) => DisplayState::Error,
        }
    }
}

impl std::fmt::Display for DisplayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
