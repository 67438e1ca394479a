//! Mock Inventory
//!
//! For testing and demo purposes. Holds a small static schedule in memory.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use super::FlightInventory;
use crate::error::{DeskError, Result};
use crate::model::{Cabin, Flight, Policy, Ticket};

/// In-memory inventory with a static schedule
pub struct MockInventory {
    flights: RwLock<BTreeMap<String, Flight>>,
    policies: BTreeMap<String, Policy>,
    tickets: RwLock<Vec<Ticket>>,
}

impl Default for MockInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInventory {
    pub fn new() -> Self {
        Self::with_flights(Self::schedule())
    }

    /// Create with a custom schedule
    pub fn with_flights(flights: Vec<Flight>) -> Self {
        Self {
            flights: RwLock::new(
                flights
                    .into_iter()
                    .map(|f| (f.number.clone(), f))
                    .collect(),
            ),
            policies: Self::policies()
                .into_iter()
                .map(|p| (p.topic.clone(), p))
                .collect(),
            tickets: RwLock::new(Vec::new()),
        }
    }

    fn schedule() -> Vec<Flight> {
        vec![
            Flight::new("HA11", "LAX", "HNL", "Honolulu, Hawaii", dec!(389.00))
                .departing_in(3, 345)
                .with_seats(12),
            Flight::new("HA35", "SFO", "OGG", "Maui, Hawaii", dec!(412.00))
                .departing_in(5, 340)
                .with_seats(2),
            Flight::new("UA1", "SFO", "HNL", "Honolulu, Hawaii", dec!(455.00))
                .departing_in(1, 330)
                .with_seats(0),
            Flight::new("AF83", "SFO", "CDG", "Paris", dec!(1120.00))
                .departing_in(9, 645)
                .with_seats(30),
            Flight::new("JL1", "SFO", "HND", "Tokyo", dec!(980.00))
                .departing_in(6, 690)
                .with_seats(8),
            Flight::new("DL2050", "JFK", "LAX", "Los Angeles", dec!(219.00))
                .departing_in(2, 380)
                .with_seats(40),
        ]
    }

    fn policies() -> Vec<Policy> {
        vec![
            Policy::new(
                "baggage",
                "Checked baggage",
                "One checked bag up to 23kg is included on international fares. \
                 Domestic economy fares charge per bag.",
            )
            .with_fee(dec!(35.00)),
            Policy::new(
                "changes",
                "Changing a flight",
                "Economy tickets can be changed up to 24 hours before departure; \
                 the fare difference applies.",
            )
            .with_fee(dec!(75.00)),
            Policy::new(
                "refunds",
                "Refunds",
                "Tickets are fully refundable within 24 hours of purchase. \
                 After that, refunds are issued as travel credit.",
            ),
            Policy::new(
                "pets",
                "Travelling with pets",
                "Cats and small dogs may travel in the cabin in an approved carrier \
                 that fits under the seat.",
            )
            .with_fee(dec!(125.00)),
        ]
    }

    /// Tickets sold so far
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tickets.read().await.clone()
    }
}

#[async_trait]
impl FlightInventory for MockInventory {
    async fn search(&self, destination: &str) -> Result<Vec<Flight>> {
        if destination.trim().is_empty() {
            return Err(DeskError::InvalidRequest("destination is empty".into()));
        }

        let flights = self.flights.read().await;
        let mut matches: Vec<Flight> = flights
            .values()
            .filter(|f| f.serves(destination))
            .cloned()
            .collect();
        matches.sort_by_key(|f| f.departs_at);
        Ok(matches)
    }

    async fn flight(&self, number: &str) -> Result<Flight> {
        self.flights
            .read()
            .await
            .get(&number.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| DeskError::FlightNotFound(number.to_string()))
    }

    async fn purchase(&self, number: &str, passenger: &str, cabin: Cabin) -> Result<Ticket> {
        if passenger.trim().is_empty() {
            return Err(DeskError::InvalidRequest("passenger name is empty".into()));
        }

        let key = number.trim().to_uppercase();
        let ticket = {
            let mut flights = self.flights.write().await;
            let flight = flights
                .get_mut(&key)
                .ok_or_else(|| DeskError::FlightNotFound(number.to_string()))?;
            if flight.is_sold_out() {
                return Err(DeskError::SoldOut(flight.number.clone()));
            }
            flight.seats_available -= 1;
            Ticket::issue(flight, passenger.trim(), cabin)
        };

        tracing::info!(
            flight = %ticket.flight_number,
            confirmation = %ticket.confirmation,
            fare = %ticket.fare,
            "Ticket issued"
        );
        self.tickets.write().await.push(ticket.clone());
        Ok(ticket)
    }

    async fn policy(&self, topic: &str) -> Result<Policy> {
        let topic = topic.trim().to_lowercase();
        if topic.is_empty() {
            return Err(DeskError::InvalidRequest("policy topic is empty".into()));
        }

        self.policies
            .get(&topic)
            .or_else(|| {
                self.policies
                    .values()
                    .find(|p| topic.contains(&p.topic) || p.title.to_lowercase().contains(&topic))
            })
            .cloned()
            .ok_or(DeskError::UnknownPolicy(topic))
    }

    async fn policy_topics(&self) -> Vec<String> {
        self.policies.keys().cloned().collect()
    }

    fn name(&self) -> &str {
        "MockInventory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_by_city() {
        let inventory = MockInventory::new();

        let flights = inventory.search("Hawaii").await.unwrap();
        assert_eq!(flights.len(), 3);
        assert!(flights.windows(2).all(|w| w[0].departs_at <= w[1].departs_at));

        let flights = inventory.search("CDG").await.unwrap();
        assert_eq!(flights[0].number, "AF83");
    }

    #[tokio::test]
    async fn test_purchase_takes_a_seat() {
        let inventory = MockInventory::new();

        let ticket = inventory.purchase("ha35", "Grace Hopper", Cabin::Economy).await.unwrap();
        assert_eq!(ticket.flight_number, "HA35");
        assert_eq!(inventory.flight("HA35").await.unwrap().seats_available, 1);
        assert_eq!(inventory.tickets().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sold_out() {
        let inventory = MockInventory::new();
        let result = inventory.purchase("UA1", "Grace Hopper", Cabin::Economy).await;
        assert!(matches!(result, Err(DeskError::SoldOut(_))));
    }

    #[tokio::test]
    async fn test_unknown_flight() {
        let inventory = MockInventory::new();
        let result = inventory.flight("ZZ999").await;
        assert!(matches!(result, Err(DeskError::FlightNotFound(_))));
    }

    #[tokio::test]
    async fn test_policy_lookup() {
        let inventory = MockInventory::new();

        let policy = inventory.policy("Baggage").await.unwrap();
        assert_eq!(policy.fee, Some(dec!(35.00)));

        let policy = inventory.policy("what about refunds").await.unwrap();
        assert_eq!(policy.topic, "refunds");

        assert!(inventory.policy("lounges").await.is_err());
        assert!(matches!(
            inventory.policy("  ").await,
            Err(DeskError::InvalidRequest(_))
        ));
        assert_eq!(inventory.policy_topics().await.len(), 4);
    }
}
