//! Domain Models
//!
//! Flights, tickets and fare policies.
//! Uses `rust_decimal` for all fares - never use f64 for money!

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cabin class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cabin {
    #[default]
    Economy,
    Premium,
    Business,
}

impl Cabin {
    /// Fare multiplier over the economy base fare
    pub fn multiplier(self) -> Decimal {
        match self {
            Self::Economy => Decimal::ONE,
            Self::Premium => Decimal::new(16, 1),
            Self::Business => Decimal::new(32, 1),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "economy" | "coach" => Some(Self::Economy),
            "premium" | "premium_economy" => Some(Self::Premium),
            "business" => Some(Self::Business),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cabin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Economy => write!(f, "economy"),
            Self::Premium => write!(f, "premium"),
            Self::Business => write!(f, "business"),
        }
    }
}

/// A scheduled flight
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flight {
    /// Flight number (e.g., "HA11")
    pub number: String,

    /// Origin airport code
    pub origin: String,

    /// Destination airport code
    pub destination: String,

    /// Destination city name, used for free-text search
    pub destination_city: String,

    /// Scheduled departure
    pub departs_at: DateTime<Utc>,

    /// Block time in minutes
    pub duration_minutes: u32,

    /// Economy base fare in USD
    pub base_fare: Decimal,

    /// Seats still for sale
    pub seats_available: u32,
}

impl Flight {
    pub fn new(
        number: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        destination_city: impl Into<String>,
        base_fare: Decimal,
    ) -> Self {
        Self {
            number: number.into().to_uppercase(),
            origin: origin.into().to_uppercase(),
            destination: destination.into().to_uppercase(),
            destination_city: destination_city.into(),
            departs_at: Utc::now() + Duration::days(7),
            duration_minutes: 0,
            base_fare,
            seats_available: 0,
        }
    }

    pub fn departing_in(mut self, days: i64, minutes: u32) -> Self {
        self.departs_at = Utc::now() + Duration::days(days);
        self.duration_minutes = minutes;
        self
    }

    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats_available = seats;
        self
    }

    /// Fare for a cabin
    pub fn fare(&self, cabin: Cabin) -> Decimal {
        (self.base_fare * cabin.multiplier()).round_dp(2)
    }

    pub fn is_sold_out(&self) -> bool {
        self.seats_available == 0
    }

    /// Whether `query` names this flight's destination code or city
    pub fn serves(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.destination.to_lowercase() == query
            || self.destination_city.to_lowercase().contains(&query)
            || query.contains(&self.destination_city.to_lowercase())
    }
}

/// A purchased ticket
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,

    /// Six-character booking reference
    pub confirmation: String,

    pub flight_number: String,

    pub passenger: String,

    pub cabin: Cabin,

    /// Fare paid in USD
    pub fare: Decimal,

    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    pub fn issue(flight: &Flight, passenger: impl Into<String>, cabin: Cabin) -> Self {
        let id = Uuid::new_v4();
        let confirmation = id.simple().to_string()[..6].to_uppercase();
        Self {
            id,
            confirmation,
            flight_number: flight.number.clone(),
            passenger: passenger.into(),
            cabin,
            fare: flight.fare(cabin),
            issued_at: Utc::now(),
        }
    }
}

/// A fare or travel policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Policy {
    /// Topic key (e.g., "baggage")
    pub topic: String,

    pub title: String,

    pub summary: String,

    /// Fee in USD, if the policy carries one
    pub fee: Option<Decimal>,
}

impl Policy {
    pub fn new(topic: impl Into<String>, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            title: title.into(),
            summary: summary.into(),
            fee: None,
        }
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = Some(fee);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn hawaii() -> Flight {
        Flight::new("ha11", "lax", "hnl", "Honolulu, Hawaii", dec!(389.00)).with_seats(4)
    }

    #[test]
    fn test_cabin_fares() {
        let flight = hawaii();
        assert_eq!(flight.number, "HA11");
        assert_eq!(flight.fare(Cabin::Economy), dec!(389.00));
        assert_eq!(flight.fare(Cabin::Premium), dec!(622.40));
        assert_eq!(flight.fare(Cabin::Business), dec!(1244.80));
    }

    #[test]
    fn test_destination_matching() {
        let flight = hawaii();
        assert!(flight.serves("HNL"));
        assert!(flight.serves("hawaii"));
        assert!(flight.serves("Flight to Honolulu, Hawaii"));
        assert!(!flight.serves("Paris"));
        assert!(!flight.serves("  "));
    }

    #[test]
    fn test_ticket_issue() {
        let flight = hawaii();
        let ticket = Ticket::issue(&flight, "Ada Lovelace", Cabin::Premium);
        assert_eq!(ticket.confirmation.len(), 6);
        assert_eq!(ticket.fare, dec!(622.40));
        assert_eq!(ticket.flight_number, "HA11");
    }

    #[test]
    fn test_cabin_parse() {
        assert_eq!(Cabin::parse("Business"), Some(Cabin::Business));
        assert_eq!(Cabin::parse("coach"), Some(Cabin::Economy));
        assert_eq!(Cabin::parse("first"), None);
    }
}
