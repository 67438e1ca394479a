//! Transition Controller
//!
//! Every mode entry goes through [`TransitionController::apply`], whether the
//! host asked for it or the model selected a mode-entry tool. The trigger is
//! recorded in the transition log and nowhere else, so both paths leave the
//! same mode and history behind.

use serde_json::Value;

use crate::error::{ModeError, Result};
use crate::message::Conversation;
use crate::registry::ModeRegistry;
use crate::session::{ModeSession, Staged, TransitionRecord, Trigger};
use crate::validation::ParameterValidator;

/// Performs mode entry
pub struct TransitionController<'a> {
    registry: &'a ModeRegistry,
    validator: &'a dyn ParameterValidator,
}

impl<'a> TransitionController<'a> {
    pub fn new(registry: &'a ModeRegistry, validator: &'a dyn ParameterValidator) -> Self {
        Self {
            registry,
            validator,
        }
    }

    /// Enter `target` on behalf of the host.
    ///
    /// Leaves the presentation transcript alone; rendering the new mode's
    /// first turn is the render pipeline's job.
    pub fn enter(
        &self,
        session: &mut ModeSession,
        target: &str,
        arguments: &Value,
    ) -> Result<TransitionRecord> {
        let mut staged = session.stage(self.registry)?;
        let record = self.apply(&mut staged, target, arguments, Trigger::Application)?;
        session.commit(staged, None);
        Ok(record)
    }

    pub(crate) fn apply(
        &self,
        staged: &mut Staged,
        target: &str,
        arguments: &Value,
        trigger: Trigger,
    ) -> Result<TransitionRecord> {
        let definition = self.registry.resolve(target)?;

        let parsed = self
            .validator
            .validate(definition.parameters(), arguments)
            .map_err(|e| ModeError::InvalidParameters {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        let seed = definition.initial_state(&parsed);
        if seed.is_empty() {
            return Err(ModeError::InvalidSessionState(format!(
                "mode `{target}` produced an empty initial state"
            )));
        }

        let record = TransitionRecord {
            from: staged.mode.clone(),
            to: definition.id().clone(),
            trigger,
            arguments: parsed,
            at: chrono::Utc::now(),
        };

        if staged.entered_from.is_none() {
            staged.entered_from = Some(staged.mode.clone());
        }
        staged.mode = definition.id().clone();
        staged.conversation = Conversation::from(seed);
        staged.opening = true;
        staged.transitions.push(record.clone());

        tracing::info!(
            from = %record.from,
            to = %record.to,
            trigger = %trigger,
            "Entered mode"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::mode::ModeDefinition;
    use crate::tool::ParameterSchema;
    use crate::validation::SchemaValidator;
    use serde_json::json;

    fn registry() -> ModeRegistry {
        ModeRegistry::builder()
            .with_mode(
                ModeDefinition::builder("orientation")
                    .initial_state(|_| vec![Message::system("How can I help?")])
                    .mode_tool("book_flight")
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .with_mode(
                ModeDefinition::builder("book_flight")
                    .parameter(ParameterSchema::required("request", "string", "Request"))
                    .initial_state(|args| {
                        vec![
                            Message::system("You book flights."),
                            Message::user(args["request"].as_str().unwrap_or_default()),
                        ]
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_enter_replaces_history() {
        let registry = registry();
        let validator = SchemaValidator::new();
        let controller = TransitionController::new(&registry, &validator);

        let mut session = ModeSession::create(&registry, "orientation", &json!({})).unwrap();
        session.append_user_message("I'd like to book a flight").unwrap();

        let args = json!({"request": "flight to Hawaii"});
        let record = controller.enter(&mut session, "book_flight", &args).unwrap();

        assert_eq!(record.from, "orientation");
        assert_eq!(record.trigger, Trigger::Application);
        assert_eq!(session.current_mode(), "book_flight");
        assert_eq!(
            session.conversation(),
            registry.resolve("book_flight").unwrap().initial_state(&args).as_slice()
        );
        assert_eq!(session.transitions().len(), 1);
        assert!(session.presentation().is_empty());
    }

    #[test]
    fn test_failed_entry_leaves_session_untouched() {
        let registry = registry();
        let validator = SchemaValidator::new();
        let controller = TransitionController::new(&registry, &validator);
        let mut session = ModeSession::create(&registry, "orientation", &json!({})).unwrap();
        let before = session.conversation().to_vec();

        let err = controller
            .enter(&mut session, "book_flight", &json!({"destination": "Hawaii"}))
            .unwrap_err();
        assert!(matches!(err, ModeError::InvalidParameters { target, .. } if target == "book_flight"));

        let err = controller.enter(&mut session, "nowhere", &json!({})).unwrap_err();
        assert!(matches!(err, ModeError::UnknownMode(_)));

        assert_eq!(session.current_mode(), "orientation");
        assert_eq!(session.conversation(), before.as_slice());
        assert!(session.transitions().is_empty());
    }

    #[test]
    fn test_ended_session_cannot_transition() {
        let registry = registry();
        let validator = SchemaValidator::new();
        let controller = TransitionController::new(&registry, &validator);
        let mut session = ModeSession::create(&registry, "orientation", &json!({})).unwrap();
        session.end();

        let err = controller
            .enter(&mut session, "book_flight", &json!({"request": "x"}))
            .unwrap_err();
        assert!(matches!(err, ModeError::InvalidSessionState(_)));
    }
}
