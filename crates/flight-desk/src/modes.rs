//! Desk Modes
//!
//! `orientation` routes the traveller; `book_flight` and `policy_qa` each
//! handle one job and can hand back to `orientation`. The modes reference
//! each other by identity, so the cycle needs no construction order.

use std::sync::Arc;

use serde_json::{json, Value};

use mode_core::{
    Message, ModeDefinition, ModeRegistry, ModelConfig, ParameterSchema, Result,
};

use crate::inventory::FlightInventory;
use crate::svckit::{BuyTicketTool, LookupPolicyTool, SearchFlightsTool};

pub const ORIENTATION: &str = "orientation";
pub const BOOK_FLIGHT: &str = "book_flight";
pub const POLICY_QA: &str = "policy_qa";

/// System prompt for the orientation mode
pub const ORIENTATION_PROMPT: &str = r#"You are the front desk of an airline's help line.

Find out what the traveller needs and hand them to the right desk:

- To book, change or search for a flight, use `book_flight` with a short summary of the request.
- For questions about baggage, changes, refunds or pets, use `policy_qa` with the question.

If the request is unclear, ask one short clarifying question. Do not answer policy questions or quote fares yourself."#;

/// System prompt for the booking mode
pub const BOOKING_PROMPT: &str = r#"You are the booking desk of an airline.

1. Use `search_flights` to find flights matching the traveller's request.
2. Confirm flight, cabin and passenger name with the traveller before buying.
3. Use `buy_ticket` only after explicit confirmation.

If the traveller wants something other than a booking, use `orientation`."#;

/// System prompt for the policy mode
pub const POLICY_PROMPT: &str = r#"You answer questions about airline policy.

Always use `lookup_policy` before answering, then answer in two or three sentences, quoting fees exactly.
If the traveller wants to book, use `orientation`."#;

fn argument(arguments: &Value, key: &str) -> String {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn orientation(model: &ModelConfig) -> Result<ModeDefinition> {
    ModeDefinition::builder(ORIENTATION)
        .description("Return to the front desk to start over or switch topics.")
        .model(model.clone())
        .initial_state(|_| vec![Message::system(ORIENTATION_PROMPT)])
        .mode_tool(BOOK_FLIGHT)
        .mode_tool(POLICY_QA)
        .render_text(|text| json!({ "kind": "message", "desk": ORIENTATION, "text": text }))
        .build()
}

pub fn book_flight(model: &ModelConfig, inventory: &Arc<dyn FlightInventory>) -> Result<ModeDefinition> {
    ModeDefinition::builder(BOOK_FLIGHT)
        .description("Hand the traveller to the booking desk to search for and buy flights.")
        .model(model.clone())
        .parameter(ParameterSchema::required(
            "request",
            "string",
            "What the traveller wants to book (e.g., 'flight to Hawaii next week')",
        ))
        .initial_state(|arguments| {
            vec![
                Message::system(BOOKING_PROMPT),
                Message::user(format!("Booking request: {}", argument(arguments, "request"))),
            ]
        })
        .tool(SearchFlightsTool::new(inventory.clone()))
        .tool(BuyTicketTool::new(inventory.clone()))
        .mode_tool(ORIENTATION)
        .render_text(|text| json!({ "kind": "message", "desk": BOOK_FLIGHT, "text": text }))
        .build()
}

pub fn policy_qa(model: &ModelConfig, inventory: &Arc<dyn FlightInventory>) -> Result<ModeDefinition> {
    // Policy answers should not drift between turns
    let model = model.clone().with_temperature(0.2);

    ModeDefinition::builder(POLICY_QA)
        .description("Hand the traveller to the policy desk for questions about baggage, changes, refunds or pets.")
        .model(model)
        .parameter(ParameterSchema::required("question", "string", "The traveller's policy question"))
        .initial_state(|arguments| {
            vec![
                Message::system(POLICY_PROMPT),
                Message::user(argument(arguments, "question")),
            ]
        })
        .tool(LookupPolicyTool::new(inventory.clone()))
        .mode_tool(ORIENTATION)
        .render_text(|text| json!({ "kind": "answer", "desk": POLICY_QA, "text": text }))
        .build()
}

/// Build the desk's registry with every mode sharing `model`
pub fn registry(inventory: Arc<dyn FlightInventory>, model: &ModelConfig) -> Result<ModeRegistry> {
    let mut builder = ModeRegistry::builder();
    builder
        .register(orientation(model)?)?
        .register(book_flight(model, &inventory)?)?
        .register(policy_qa(model, &inventory)?)?;

    let registry = builder.build()?;
    tracing::info!(modes = registry.len(), inventory = inventory.name(), "Desk registry built");
    Ok(registry)
}
