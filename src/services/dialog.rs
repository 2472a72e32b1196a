//! Slot-filling state machine for the booking intent.
//!
//! Each call is one turn: the caller hands in the conversation as it stands,
//! gets back the next state plus what to say and which field to ask for. No
//! state survives between calls; availability is re-read on every turn and
//! the only write happens through [`ClinicStore::commit_booking`].

use crate::errors::BookingError;
use crate::models::{
    ConfirmationState, ConversationState, DialogAction, Doctor, Field, IntentStatus,
    InvocationSource, SessionState, TurnMessage, TurnRequest, TurnResponse,
};
use crate::services::availability::available_times;
use crate::services::booking::confirmation_message;
use crate::services::store::ClinicStore;

pub const APOLOGY: &str = "Something went wrong. Please try again later.";
const RESTART_PROMPT: &str =
    "Okay, let's start over. Which doctor would you like to book an appointment with?";
const CANCELLED_PROMPT: &str =
    "Your booking was canceled. Which doctor would you like to book with?";

const BOOKING_FIELDS: [Field; 5] = [
    Field::DoctorName,
    Field::Date,
    Field::Time,
    Field::PatientName,
    Field::PhoneNumber,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Elicit(Field),
    Delegate,
    Close,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub state: ConversationState,
    pub action: Action,
    pub messages: Vec<String>,
}

impl Outcome {
    fn elicit(state: ConversationState, field: Field, message: impl Into<String>) -> Self {
        Self {
            state,
            action: Action::Elicit(field),
            messages: vec![message.into()],
        }
    }

    fn delegate(state: ConversationState) -> Self {
        Self {
            state,
            action: Action::Delegate,
            messages: vec![],
        }
    }

    fn close(state: ConversationState, message: impl Into<String>) -> Self {
        Self {
            state,
            action: Action::Close,
            messages: vec![message.into()],
        }
    }

    pub fn into_response(self) -> TurnResponse {
        let dialog_action = match self.action {
            Action::Elicit(field) => DialogAction::ElicitSlot {
                slot_to_elicit: self.state.slot_name(field).to_string(),
            },
            Action::Delegate => DialogAction::Delegate,
            Action::Close => DialogAction::Close,
        };
        TurnResponse {
            session_state: SessionState {
                dialog_action: Some(dialog_action),
                intent: self.state.to_intent_payload(),
            },
            messages: self.messages.into_iter().map(TurnMessage::plain).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
}

impl Answer {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "yeah" | "yep" | "sure" | "correct" | "confirm" | "confirmed" => {
                Some(Answer::Yes)
            }
            "no" | "n" | "nope" | "cancel" => Some(Answer::No),
            _ => None,
        }
    }
}

pub fn handle_turn(store: &dyn ClinicStore, request: TurnRequest) -> anyhow::Result<TurnResponse> {
    let state = ConversationState::from_request(request);
    Ok(evaluate(store, state)?.into_response())
}

/// Decides the next step for one turn. Rules are checked in priority order
/// and the first one that produces a response wins.
pub fn evaluate(store: &dyn ClinicStore, mut state: ConversationState) -> anyhow::Result<Outcome> {
    let doctor = match state.value(Field::DoctorName).map(str::to_owned) {
        Some(raw) => match Doctor::parse(&raw) {
            Some(doctor) => {
                state.set(Field::DoctorName, doctor.name());
                Some(doctor)
            }
            None => {
                tracing::info!(doctor = %raw, "unknown doctor requested");
                return Ok(Outcome::elicit(
                    state,
                    Field::DoctorName,
                    format!("Please choose from our available doctors:\n{}", Doctor::menu()),
                ));
            }
        },
        None => None,
    };

    if state.invocation == InvocationSource::DialogCodeHook {
        if let Some(doctor) = doctor {
            if let Some(outcome) = elicit_missing(store, doctor, state.clone())? {
                return Ok(outcome);
            }
        }
    }

    if let Some(answer) = state.value(Field::Confirmation).and_then(Answer::parse) {
        match answer {
            Answer::No => return Ok(restart(state, RESTART_PROMPT)),
            // A denial from upstream is never promoted to a confirmation.
            Answer::Yes if state.confirmation != ConfirmationState::Denied => {
                state.confirmation = ConfirmationState::Confirmed;
                if state.invocation == InvocationSource::DialogCodeHook {
                    return Ok(Outcome::delegate(state));
                }
            }
            Answer::Yes => {}
        }
    }

    if state.confirmation == ConfirmationState::Denied {
        return Ok(restart(state, CANCELLED_PROMPT));
    }

    if state.invocation == InvocationSource::FulfillmentCodeHook
        && state.confirmation == ConfirmationState::Confirmed
    {
        return fulfill(store, state);
    }

    Ok(Outcome::delegate(state))
}

/// Elicitation rules, in dependency order. `None` means every field up to the
/// confirmation prompt is in place and valid.
fn elicit_missing(
    store: &dyn ClinicStore,
    doctor: Doctor,
    mut state: ConversationState,
) -> anyhow::Result<Option<Outcome>> {
    let Some(date) = state.value(Field::Date).map(str::to_owned) else {
        return Ok(Some(Outcome::elicit(
            state,
            Field::Date,
            format!("What date would you like to see {doctor}?"),
        )));
    };

    let times = available_times(store, doctor, &date)?;

    let Some(time) = state.value(Field::Time).map(str::to_owned) else {
        if times.is_empty() {
            state.clear(Field::Date);
            return Ok(Some(Outcome::elicit(
                state,
                Field::Date,
                format!("Sorry, {doctor} has no available slots on {date}. Please choose another date."),
            )));
        }
        return Ok(Some(Outcome::elicit(
            state,
            Field::Time,
            format!(
                "{doctor} is available on {date} at: {}. Please choose a time.",
                times.join(", ")
            ),
        )));
    };

    if !times.contains(&time) {
        tracing::info!(doctor = %doctor, date = %date, time = %time, "requested time not available");
        state.clear(Field::Time);
        if times.is_empty() {
            state.clear(Field::Date);
            return Ok(Some(Outcome::elicit(
                state,
                Field::Date,
                format!("Sorry, {time} is not available and {doctor} has no other openings on {date}. Please choose another date."),
            )));
        }
        return Ok(Some(Outcome::elicit(
            state,
            Field::Time,
            format!(
                "Sorry, {time} is not available. {doctor} is available on {date} at: {}. Please choose one of these times.",
                times.join(", ")
            ),
        )));
    }

    let Some(name) = state.value(Field::PatientName).map(str::to_owned) else {
        return Ok(Some(Outcome::elicit(state, Field::PatientName, "May I know your name?")));
    };

    let Some(phone) = state.value(Field::PhoneNumber).map(str::to_owned) else {
        return Ok(Some(Outcome::elicit(
            state,
            Field::PhoneNumber,
            "Could you please provide your phone number?",
        )));
    };

    if !state.is_set(Field::Confirmation) {
        let summary = format!(
            "Please confirm your booking details:\nDoctor: {doctor}\nDate: {date}\nTime: {time}\nName: {name}\nPhone: {phone}\nIs this correct?"
        );
        return Ok(Some(Outcome::elicit(state, Field::Confirmation, summary)));
    }

    Ok(None)
}

fn restart(mut state: ConversationState, prompt: &str) -> Outcome {
    tracing::info!(session = ?state.session_id, "booking restarted");
    state.reset();
    Outcome::elicit(state, Field::DoctorName, prompt)
}

fn fulfill(store: &dyn ClinicStore, mut state: ConversationState) -> anyhow::Result<Outcome> {
    let Some(request) = state.booking_request() else {
        let missing = state
            .first_missing(&BOOKING_FIELDS)
            .unwrap_or(Field::DoctorName);
        tracing::warn!(field = missing.as_str(), "fulfillment with incomplete booking");
        return Ok(Outcome::elicit(
            state,
            missing,
            "I still need a few details before I can book that.",
        ));
    };

    match store.commit_booking(&request) {
        Ok(appointment) => {
            state.intent_status = IntentStatus::Fulfilled;
            Ok(Outcome::close(state, confirmation_message(&appointment)))
        }
        Err(BookingError::Conflict { .. }) => {
            state.clear(Field::Time);
            state.clear(Field::Confirmation);
            state.confirmation = ConfirmationState::None;

            let remaining = match Doctor::parse(&request.doctor_name) {
                Some(doctor) => available_times(store, doctor, &request.date)?,
                None => vec![],
            };
            if remaining.is_empty() {
                state.clear(Field::Date);
                return Ok(Outcome::elicit(
                    state,
                    Field::Date,
                    format!(
                        "Sorry, that time slot was just booked by someone else, and {} has no other openings on {}. Please choose another date.",
                        request.doctor_name, request.date
                    ),
                ));
            }
            Ok(Outcome::elicit(
                state,
                Field::Time,
                format!(
                    "Sorry, that time slot was just booked by someone else. {} is available on {} at: {}. Please choose another time.",
                    request.doctor_name,
                    request.date,
                    remaining.join(", ")
                ),
            ))
        }
        Err(BookingError::Store(e)) => Err(e.into()),
    }
}
