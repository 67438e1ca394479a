//! Terminal formatting for presentations and history

use std::fmt::Write as _;

use mode_core::{Message, Presentation};
use serde_json::Value;

const CONTENT_PREVIEW: usize = 160;

/// Format one presentation record for the terminal
pub fn render(presentation: &Presentation) -> String {
    let mut out = String::new();

    if let Some(from) = &presentation.entered_from {
        let _ = writeln!(out, "── {from} → {} ──", presentation.mode);
    }

    let body = &presentation.body;
    match body["kind"].as_str() {
        Some("message" | "answer") => {
            let _ = write!(out, "[{}] {}", presentation.mode, text(body));
        }
        Some("flight_list") => flight_list(&mut out, body),
        Some("ticket") => {
            let _ = write!(
                out,
                "✓ Booked {} for {} ({}), ${} - confirmation {}",
                text_of(&body["flight"]),
                text_of(&body["passenger"]),
                text_of(&body["cabin"]),
                text_of(&body["fare"]),
                text_of(&body["confirmation"]),
            );
        }
        Some("notice") => {
            let _ = write!(out, "⚠ {}", text(body));
        }
        _ => {
            out.push_str(&serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()));
        }
    }

    out
}

fn flight_list(out: &mut String, body: &Value) {
    let flights = body["flights"].as_array().map(Vec::as_slice).unwrap_or_default();
    if flights.is_empty() {
        let _ = write!(out, "No flights to {}.", text_of(&body["destination"]));
        return;
    }

    let _ = writeln!(
        out,
        "Flights to {} ({}):",
        text_of(&body["destination"]),
        text_of(&body["cabin"])
    );
    for flight in flights {
        let seats = flight["seats_available"].as_u64().unwrap_or(0);
        let availability = if seats == 0 {
            "sold out".to_string()
        } else {
            format!("{seats} left")
        };
        let _ = writeln!(
            out,
            "  {:<7} {}→{}  {}  ${:>8}  {}",
            text_of(&flight["number"]),
            text_of(&flight["origin"]),
            text_of(&flight["destination"]),
            text_of(&flight["departs_at"]),
            text_of(&flight["fare"]),
            availability
        );
    }
    out.truncate(out.trim_end().len());
}

fn text(body: &Value) -> String {
    text_of(&body["text"])
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}

/// One history line, truncated
pub fn history_line(index: usize, message: &Message) -> String {
    let content = message.content.replace('\n', " ");
    let preview = if content.chars().count() > CONTENT_PREVIEW {
        let cut: String = content.chars().take(CONTENT_PREVIEW).collect();
        format!("{cut}…")
    } else {
        content
    };
    format!("{index:>3} {:<9} {preview}", message.role.to_string())
}
