pub mod appointment;
pub mod conversation;
pub mod doctor;
pub mod slot;
pub mod turn;

pub use appointment::{Appointment, AppointmentStatus, BookingRequest, ReferenceNumber};
pub use conversation::{ConversationState, Field};
pub use doctor::Doctor;
pub use slot::{Slot, SlotKey, SlotStatus};
pub use turn::{
    ConfirmationState, DialogAction, IntentPayload, IntentStatus, InvocationSource, SessionState,
    SlotPayload, TurnMessage, TurnRequest, TurnResponse,
};
