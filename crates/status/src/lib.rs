//! Backend status page for BRRRR Radar.
//!
//! A [`StatusPage`] shows a title and one line reporting whether the
//! backend health endpoint answered. Mounting the page issues exactly one
//! request; the displayed value moves from `loading...` to either
//! `data.status` or `error` once that request settles, and never changes
//! again for the lifetime of the mount.

pub mod config;
pub mod error;
pub mod page;
pub mod probe;
pub mod state;

pub use config::{DEFAULT_HEALTH_ENDPOINT, StatusConfig};
pub use error::ProbeError;
pub use page::{MountedStatusPage, StatusPage, TITLE};
pub use probe::{HealthProbe, HealthResponse, HttpHealthProbe};
pub use state::DisplayState;
