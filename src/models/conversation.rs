use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::appointment::BookingRequest;
use crate::models::turn::{
    ConfirmationState, IntentPayload, IntentStatus, InvocationSource, SlotPayload, TurnRequest,
};

/// Fields collected by the booking dialog, in the order they are filled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    DoctorName,
    Date,
    Time,
    PatientName,
    PhoneNumber,
    Confirmation,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::DoctorName,
        Field::Date,
        Field::Time,
        Field::PatientName,
        Field::PhoneNumber,
        Field::Confirmation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::DoctorName => "DoctorName",
            Field::Date => "Date",
            Field::Time => "Time",
            Field::PatientName => "PatientName",
            Field::PhoneNumber => "PhoneNumber",
            Field::Confirmation => "Confirmation",
        }
    }

    /// Accepts the canonical slot names plus the short `Name`/`Phone` aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DoctorName" => Some(Field::DoctorName),
            "Date" => Some(Field::Date),
            "Time" => Some(Field::Time),
            "PatientName" | "Name" => Some(Field::PatientName),
            "PhoneNumber" | "Phone" => Some(Field::PhoneNumber),
            "Confirmation" => Some(Field::Confirmation),
            _ => None,
        }
    }
}

/// One turn's view of the conversation. Owned by the caller between turns.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub session_id: Option<String>,
    pub intent_name: String,
    pub confirmation: ConfirmationState,
    pub invocation: InvocationSource,
    pub intent_status: IntentStatus,
    fields: BTreeMap<Field, String>,
    /// Slot names the caller used for a field when not the canonical ones.
    slot_names: BTreeMap<Field, String>,
    other_slots: BTreeMap<String, Option<SlotPayload>>,
}

impl ConversationState {
    pub fn new(intent_name: impl Into<String>) -> Self {
        Self {
            session_id: None,
            intent_name: intent_name.into(),
            confirmation: ConfirmationState::None,
            invocation: InvocationSource::DialogCodeHook,
            intent_status: IntentStatus::InProgress,
            fields: BTreeMap::new(),
            slot_names: BTreeMap::new(),
            other_slots: BTreeMap::new(),
        }
    }

    pub fn from_request(request: TurnRequest) -> Self {
        let intent = request.session_state.intent;
        let mut state = Self::new(intent.name);
        state.session_id = request.session_id;
        state.invocation = request.invocation_source;
        state.confirmation = intent.confirmation_state;
        state.intent_status = intent.state.unwrap_or_default();

        for (name, slot) in intent.slots {
            match Field::parse(&name) {
                Some(field) => {
                    if name != field.as_str() {
                        state.slot_names.insert(field, name);
                    }
                    let value = slot.and_then(|s| s.value.interpreted_value);
                    if let Some(value) = value {
                        state.set(field, value);
                    }
                }
                None => {
                    state.other_slots.insert(name, slot);
                }
            }
        }
        state
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// The name this field's slot goes by on the wire for this caller.
    pub fn slot_name(&self, field: Field) -> &str {
        self.slot_names
            .get(&field)
            .map(String::as_str)
            .unwrap_or(field.as_str())
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Blank values count as unset.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, trimmed.to_string());
        }
    }

    pub fn clear(&mut self, field: Field) {
        self.fields.remove(&field);
    }

    /// Drops every collected field and starts the intent over.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.confirmation = ConfirmationState::None;
        self.intent_status = IntentStatus::InProgress;
    }

    pub fn first_missing(&self, fields: &[Field]) -> Option<Field> {
        fields.iter().copied().find(|f| !self.is_set(*f))
    }

    pub fn booking_request(&self) -> Option<BookingRequest> {
        Some(BookingRequest {
            doctor_name: self.value(Field::DoctorName)?.to_string(),
            date: self.value(Field::Date)?.to_string(),
            time: self.value(Field::Time)?.to_string(),
            patient_name: self.value(Field::PatientName)?.to_string(),
            phone_number: self.value(Field::PhoneNumber)?.to_string(),
        })
    }

    /// Serialises back to the wire intent, listing every field (unset ones as null).
    pub fn to_intent_payload(&self) -> IntentPayload {
        let mut slots = self.other_slots.clone();
        for field in Field::ALL {
            slots.insert(
                self.slot_name(field).to_string(),
                self.value(field).map(SlotPayload::interpreted),
            );
        }
        IntentPayload {
            name: self.intent_name.clone(),
            slots,
            confirmation_state: self.confirmation,
            state: Some(self.intent_status),
        }
    }
}
