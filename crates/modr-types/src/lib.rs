//! modr-types
//!
//! Shared vocabulary of the moderation engine:
//! - `Atto`: 18-decimal fixed-point amount/ratio type
//! - content classes, votes, participants
//! - evaluation and settlement result records
//! - the engine error taxonomy
//!
//! No logic beyond construction helpers lives here; the evaluator and the
//! settlement calculator are in their own crates.

mod error;
mod fixedpoint;
mod types;

pub use error::{EngineError, OrOverflow};
pub use fixedpoint::{checked_sum, Atto, ParseAttoError, ATTO_DECIMALS, ATTO_SCALE};
pub use types::*;
