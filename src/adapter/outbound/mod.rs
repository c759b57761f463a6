//! Outbound adapters (driven side).

pub mod jockmkt;
