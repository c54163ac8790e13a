//! Core models for sealed-bid bond RFQ settlement
//!
//! This crate defines the data structures shared by the circuit, the prover
//! and the settlement service:
//! - Bond descriptors (the instrument a round trades)
//! - Quote values and the decimal-to-cents encoding
//! - Auction direction and best-quote selection
//! - Round receipts and rejection reasons
//!
//! Nothing here depends on the proving backend; field embeddings live in
//! `rfq-circuit`.

mod bond;
mod encoding;
mod quote;
mod receipt;

pub use bond::*;
pub use encoding::*;
pub use quote::*;
pub use receipt::*;
