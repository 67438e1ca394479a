//! Ticket Purchase Tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use mode_core::{
    tool::ParameterSchema, PresentationBody, Result as CoreResult, Tool, ToolCall, ToolResult,
    ToolSchema,
};

use crate::inventory::FlightInventory;
use crate::model::Cabin;

/// Tool for buying a seat on a flight
pub struct BuyTicketTool {
    inventory: Arc<dyn FlightInventory>,
}

impl BuyTicketTool {
    pub fn new(inventory: Arc<dyn FlightInventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for BuyTicketTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "buy_ticket".into(),
            description: "Buy one ticket on a flight for a named passenger. Only call after the traveller confirmed the flight and fare.".into(),
            parameters: vec![
                ParameterSchema::required("flight_number", "string", "Flight number from search results (e.g., 'HA11')"),
                ParameterSchema::required("passenger", "string", "Full name of the passenger"),
                super::cabin_parameter(),
            ],
            category: Some("booking".into()),
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let number = call
            .arguments
            .get("flight_number")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let passenger = call
            .arguments
            .get("passenger")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let cabin = call
            .arguments
            .get("cabin")
            .and_then(|v| v.as_str())
            .and_then(Cabin::parse)
            .unwrap_or_default();

        match self.inventory.purchase(number, passenger, cabin).await {
            Ok(ticket) => {
                let output = format!(
                    "Ticket {} issued: {} on {} ({}), ${:.2}",
                    ticket.confirmation, ticket.passenger, ticket.flight_number, ticket.cabin, ticket.fare
                );
                Ok(ToolResult::success("buy_ticket", output).with_data(serde_json::to_value(&ticket)?))
            }
            Err(e) => Ok(ToolResult::failure("buy_ticket", e.to_string())),
        }
    }

    fn render(&self, result: &ToolResult) -> PresentationBody {
        match (&result.data, result.success) {
            (Some(ticket), true) => json!({
                "kind": "ticket",
                "confirmation": ticket["confirmation"],
                "flight": ticket["flight_number"],
                "passenger": ticket["passenger"],
                "cabin": ticket["cabin"],
                "fare": ticket["fare"],
            }),
            _ => super::notice(result),
        }
    }
}
