//! Flight Inventory
//!
//! Abstraction over the reservation backend the desk tools talk to.

mod mock;

pub use mock::MockInventory;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Cabin, Flight, Policy, Ticket};

/// Reservation backend (Strategy pattern)
///
/// Implement this for each reservation system.
#[async_trait]
pub trait FlightInventory: Send + Sync {
    /// Flights serving a destination code or city, soonest first
    async fn search(&self, destination: &str) -> Result<Vec<Flight>>;

    /// Look up a single flight by number
    async fn flight(&self, number: &str) -> Result<Flight>;

    /// Sell one seat on a flight
    async fn purchase(&self, number: &str, passenger: &str, cabin: Cabin) -> Result<Ticket>;

    /// Policy on a topic
    async fn policy(&self, topic: &str) -> Result<Policy>;

    /// Known policy topics
    async fn policy_topics(&self) -> Vec<String>;

    /// Inventory name
    fn name(&self) -> &str;
}
