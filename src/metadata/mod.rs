//! Identities shared between the instruction model and the host.
//!
//! - [`token`] - Metadata tokens carried by call instructions
//! - [`signature`] - Declarative identities of host operations

pub mod signature;
pub mod token;
