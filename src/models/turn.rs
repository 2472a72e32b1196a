//! Wire shapes exchanged with the conversational layer on every turn.
//!
//! These follow the Lex V2 code-hook event/response layout so the service can
//! sit behind a bot directly; the engine itself only ever sees
//! [`ConversationState`](crate::models::ConversationState).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum InvocationSource {
    #[default]
    DialogCodeHook,
    FulfillmentCodeHook,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConfirmationState {
    #[default]
    None,
    Confirmed,
    Denied,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum IntentStatus {
    #[default]
    InProgress,
    Waiting,
    ReadyForFulfillment,
    FulfillmentInProgress,
    Fulfilled,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotInterpretation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
    #[serde(default)]
    pub interpreted_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotPayload {
    pub value: SlotInterpretation,
}

impl SlotPayload {
    pub fn interpreted(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            value: SlotInterpretation {
                original_value: Some(value.clone()),
                interpreted_value: Some(value),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentPayload {
    pub name: String,
    #[serde(default)]
    pub slots: BTreeMap<String, Option<SlotPayload>>,
    #[serde(default)]
    pub confirmation_state: ConfirmationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IntentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DialogAction {
    ElicitSlot {
        #[serde(rename = "slotToElicit")]
        slot_to_elicit: String,
    },
    Delegate,
    Close,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_action: Option<DialogAction>,
    pub intent: IntentPayload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub invocation_source: InvocationSource,
    pub session_state: SessionState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TurnMessage {
    pub content_type: String,
    pub content: String,
}

impl TurnMessage {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content_type: "PlainText".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub session_state: SessionState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<TurnMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_hook_event() {
        let json = r#"{
            "sessionId": "abc-123",
            "invocationSource": "FulfillmentCodeHook",
            "sessionState": {
                "intent": {
                    "name": "BookAppointment",
                    "slots": {
                        "DoctorName": {"value": {"originalValue": "dr lee", "interpretedValue": "Dr. Sophia Lee"}},
                        "Date": null
                    },
                    "confirmationState": "Confirmed",
                    "state": "ReadyForFulfillment"
                }
            }
        }"#;
        let turn: TurnRequest = serde_json::from_str(json).unwrap();
        assert_eq!(turn.session_id.as_deref(), Some("abc-123"));
        assert_eq!(turn.invocation_source, InvocationSource::FulfillmentCodeHook);
        let intent = &turn.session_state.intent;
        assert_eq!(intent.confirmation_state, ConfirmationState::Confirmed);
        assert_eq!(intent.state, Some(IntentStatus::ReadyForFulfillment));
        assert_eq!(
            intent.slots["DoctorName"]
                .as_ref()
                .and_then(|s| s.value.interpreted_value.as_deref()),
            Some("Dr. Sophia Lee")
        );
        assert!(intent.slots["Date"].is_none());
    }

    #[test]
    fn test_missing_flags_use_defaults() {
        let json = r#"{"sessionState":{"intent":{"name":"BookAppointment"}}}"#;
        let turn: TurnRequest = serde_json::from_str(json).unwrap();
        assert_eq!(turn.invocation_source, InvocationSource::DialogCodeHook);
        assert_eq!(
            turn.session_state.intent.confirmation_state,
            ConfirmationState::None
        );
        assert!(turn.session_state.intent.slots.is_empty());
    }

    #[test]
    fn test_dialog_action_serialization() {
        let elicit = serde_json::to_value(DialogAction::ElicitSlot {
            slot_to_elicit: "Time".to_string(),
        })
        .unwrap();
        assert_eq!(
            elicit,
            serde_json::json!({"type": "ElicitSlot", "slotToElicit": "Time"})
        );
        let close = serde_json::to_value(DialogAction::Close).unwrap();
        assert_eq!(close, serde_json::json!({"type": "Close"}));
    }
}
