//! Participants of a sealed-bid RFQ round
//!
//! Provides agents for:
//! - Dealers: encode and sign quotes for the bond in play
//! - Initiators: collect signed quotes, pick the best and assemble the
//!   round for settlement (honest and adversarial)
//! - A client for the settlement service

pub mod client;
pub mod dealer;
pub mod initiator;

pub use client::SettlementClient;
pub use dealer::{DealerAgent, SignedQuote};
pub use initiator::{InitiatorAgent, InitiatorStrategy};
