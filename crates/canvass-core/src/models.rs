//! Domain models for the canvass access service.

pub mod access;
pub mod audit;
pub mod device;
pub mod identity;
