//! Route handlers

pub mod alerts;
pub mod groups;
pub mod incidents;
pub mod telemetry;
pub mod travelers;
