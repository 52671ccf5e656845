//! Control decisions and the per-tick data model.

pub mod context;
pub mod policy;
