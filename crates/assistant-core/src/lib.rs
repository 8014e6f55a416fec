//! Core types and pure scheduling logic for the Minder assistant bot.
//!
//! This crate holds everything the notification engine reasons about,
//! with no I/O attached:
//!
//! - [`CalendarEvent`] / [`EventTime`] - calendar event model
//! - [`Task`] - user-owned to-do items and their listing order
//! - [`timewindow`] - interval predicates and query windows
//! - [`select`] - active/next event selection
//! - [`compose`] - notification message rendering
//!
//! Everything here is deterministic: same inputs, same outputs. The
//! database, calendar, and scheduler crates feed data in and act on what
//! comes out.

pub mod compose;
mod event;
pub mod selector;
mod task;
pub mod timewindow;

pub use compose::{
    compose_current_status, compose_morning_summary, MessageKind, TASK_DISPLAY_CAP,
};
pub use event::{CalendarEvent, EventStatus, EventTime};
pub use selector::{select, Selection};
pub use task::{listing_order, Task, TaskStatus};
