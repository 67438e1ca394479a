//! Policy Lookup Tool
//!
//! Retrieves fare and travel policy text. The result feeds back to the
//! model, which phrases the answer for the traveller.

use std::sync::Arc;

use async_trait::async_trait;

use mode_core::{
    tool::ParameterSchema, FollowUp, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::inventory::FlightInventory;

pub struct LookupPolicyTool {
    inventory: Arc<dyn FlightInventory>,
}

impl LookupPolicyTool {
    pub fn new(inventory: Arc<dyn FlightInventory>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for LookupPolicyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "lookup_policy".into(),
            description: "Look up airline policy on a topic such as baggage, changes, refunds or pets.".into(),
            parameters: vec![ParameterSchema::required("topic", "string", "Policy topic")],
            category: Some("policy".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let topic = call
            .arguments
            .get("topic")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        match self.inventory.policy(topic).await {
            Ok(policy) => {
                let mut output = format!("{}: {}", policy.title, policy.summary);
                if let Some(fee) = policy.fee {
                    output.push_str(&format!(" Fee: ${fee:.2}."));
                }
                Ok(ToolResult::success("lookup_policy", output).with_data(serde_json::to_value(&policy)?))
            }
            Err(e) => {
                let topics = self.inventory.policy_topics().await.join(", ");
                Ok(ToolResult::failure(
                    "lookup_policy",
                    format!("{e}. Known topics: {topics}"),
                ))
            }
        }
    }

    fn follow_up(&self) -> FollowUp {
        FollowUp::Continue
    }
}
