//! Flight Search Tool
//!
//! Lists scheduled flights to a destination with fares for a cabin.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use mode_core::{
    tool::ParameterSchema, PresentationBody, Result as CoreResult, Tool, ToolCall, ToolResult,
    ToolSchema,
};

use crate::inventory::FlightInventory;
use crate::model::Cabin;

/// Tool for searching flights
pub struct SearchFlightsTool {
    inventory: Arc<dyn FlightInventory>,
}

impl SearchFlightsTool {
    pub fn new(inventory: Arc<dyn FlightInventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for SearchFlightsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_flights".into(),
            description: "Search scheduled flights to a destination. Returns flight numbers, departure times, fares and seats left.".into(),
            parameters: vec![
                ParameterSchema::required(
                    "destination",
                    "string",
                    "Destination airport code or city (e.g., 'HNL' or 'Hawaii')",
                ),
                super::cabin_parameter(),
            ],
            category: Some("booking".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let destination = call
            .arguments
            .get("destination")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let cabin = call
            .arguments
            .get("cabin")
            .and_then(|v| v.as_str())
            .and_then(Cabin::parse)
            .unwrap_or_default();

        let flights = match self.inventory.search(destination).await {
            Ok(flights) => flights,
            Err(e) => return Ok(ToolResult::failure("search_flights", e.to_string())),
        };

        if flights.is_empty() {
            return Ok(ToolResult::success(
                "search_flights",
                format!("No flights found to {destination}."),
            )
            .with_data(json!({ "destination": destination, "cabin": cabin, "flights": [] })));
        }

        let mut output = format!("Flights to {destination} ({cabin}):\n");
        let mut rows = Vec::with_capacity(flights.len());
        for flight in &flights {
            let fare = flight.fare(cabin);
            let availability = if flight.is_sold_out() {
                "sold out".to_string()
            } else {
                format!("{} seats", flight.seats_available)
            };
            let _ = writeln!(
                output,
                "  {} {}→{} departs {} - ${:.2} - {}",
                flight.number,
                flight.origin,
                flight.destination,
                flight.departs_at.format("%Y-%m-%d %H:%M UTC"),
                fare,
                availability
            );
            rows.push(json!({
                "number": flight.number,
                "origin": flight.origin,
                "destination": flight.destination,
                "departs_at": flight.departs_at,
                "duration_minutes": flight.duration_minutes,
                "fare": fare,
                "seats_available": flight.seats_available,
            }));
        }

        Ok(ToolResult::success("search_flights", output.trim_end())
            .with_data(json!({ "destination": destination, "cabin": cabin, "flights": rows })))
    }

    fn render(&self, result: &ToolResult) -> PresentationBody {
        match (&result.data, result.success) {
            (Some(data), true) => json!({
                "kind": "flight_list",
                "destination": data["destination"],
                "cabin": data["cabin"],
                "flights": data["flights"],
            }),
            _ => super::notice(result),
        }
    }
}
