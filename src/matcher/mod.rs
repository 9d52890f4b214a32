//! Pattern matching for Ethereum addresses.
//!
//! Patterns are tested against the `0x`-prefixed rendering of an address:
//! - Literal prefix: byte-for-byte `starts_with`
//! - Regex: anchored at the start of the rendering
//!
//! Rendering is EIP-55 checksummed unless checksumming is disabled or the
//! search is case-insensitive.

mod pattern;
mod predicate;

pub use pattern::{Pattern, PatternError};
pub use predicate::{MatchConfig, Matcher};
