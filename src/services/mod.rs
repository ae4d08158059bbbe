//! Acquisition orchestration.

mod acquire;

pub use acquire::{AcquireResponse, AcquireStatus, AcquisitionService};
