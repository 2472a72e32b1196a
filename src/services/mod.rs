pub mod availability;
pub mod booking;
pub mod calendar;
pub mod dialog;
pub mod schedule;
pub mod sequence;
pub mod store;
