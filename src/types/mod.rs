// ABOUTME: Type-safe identifiers and the engine source selector.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod source;

pub use id::{ContainerId, ImageId, NetworkId};
pub use source::{ParseSourceError, Source};
