//! # flight-desk
//!
//! An airline help line built from three modes.
//!
//! ```text
//!                 ┌───────────────┐
//!        ┌───────▶│  orientation  │◀───────┐
//!        │        └──┬─────────┬──┘        │
//!        │ book_flight          policy_qa  │
//!        │           ▼         ▼           │
//!  ┌─────┴────────────────┐  ┌─────────────┴────────┐
//!  │ book_flight          │  │ policy_qa            │
//!  │  search_flights      │  │  lookup_policy       │
//!  │  buy_ticket          │  │                      │
//!  └──────────────────────┘  └──────────────────────┘
//! ```
//!
//! Entering a desk replaces the model's history with that desk's seed, so
//! the booking desk never sees the small talk that led there.

pub mod error;
pub mod inventory;
pub mod model;
pub mod modes;
pub mod svckit;

pub use error::{DeskError, Result};
pub use inventory::{FlightInventory, MockInventory};
pub use model::{Cabin, Flight, Policy, Ticket};
pub use modes::{registry, BOOK_FLIGHT, ORIENTATION, POLICY_QA};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{BuyTicketTool, LookupPolicyTool, SearchFlightsTool};
}
