// ABOUTME: Deterministic decoders for engine CLI text and raw byte streams.
// ABOUTME: Malformed records are dropped with a log line, never fatal to a batch.

pub mod json_lines;
pub mod listing;
pub mod ports;
pub mod size;
pub mod stream;

pub use json_lines::{parse_records, split_records};
pub use listing::parse_listing;
pub use ports::parse_ports;
pub use size::{parse_percent, parse_size, parse_size_pair};
pub use stream::{strip_control, strip_multiplexed};
