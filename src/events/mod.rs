//! Stream event types and parsing.

pub mod extract;
pub mod parser;

pub use parser::{parse_event_line, EventParseError, PatchsetCreatedEvent};
