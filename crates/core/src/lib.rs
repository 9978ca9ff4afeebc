//! EditAI domain core.
//!
//! Edit plan model, command intake, plan validation, quota rules,
//! exporters, the generation contract and the client-side plan session.
//! Nothing in this crate performs I/O.

pub mod command;
pub mod error;
pub mod export;
pub mod generation;
pub mod plan;
pub mod quota;
pub mod session;
pub mod timecode;
pub mod types;
pub mod validation;
