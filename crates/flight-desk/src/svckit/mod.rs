//! Service Kit - Desk Tools
//!
//! Ordinary tools that implement `mode_core::Tool` for the flight desk.

mod search_flights;
mod buy_ticket;
mod lookup_policy;

pub use search_flights::SearchFlightsTool;
pub use buy_ticket::BuyTicketTool;
pub use lookup_policy::LookupPolicyTool;

use mode_core::{PresentationBody, ToolResult};

/// Presentation for a failed tool result
fn notice(result: &ToolResult) -> PresentationBody {
    serde_json::json!({
        "kind": "notice",
        "tool": result.name,
        "text": result.output,
    })
}

fn cabin_parameter() -> mode_core::ParameterSchema {
    mode_core::ParameterSchema::optional("cabin", "string", "Cabin class: 'economy', 'premium', or 'business'")
        .with_default(serde_json::json!("economy"))
        .with_enum(vec![
            serde_json::json!("economy"),
            serde_json::json!("premium"),
            serde_json::json!("business"),
        ])
}
