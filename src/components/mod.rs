//! External collaborators the agenda core talks to.

pub mod google_calendar;

pub use google_calendar::GoogleCalendarClient;
