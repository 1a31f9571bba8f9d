//! Shared types for BRRRR Radar.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{PropertyId, ScrapeRunId};
