use std::fmt;

/// Errors produced by the moderation engine.
///
/// None of these are retryable: the engine performs no I/O, so every error is
/// either bad input from the caller or a broken contract.  They are meant to
/// trip alerting, never to be shown to an end user (see `UserFacingStatus`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// A share or threshold is out of range, or a share group sums past 1.
    InvalidConfiguration { field: String, detail: String },
    /// `settle` was called on a decision that is not Validated/Rejected.
    PrematureSettlement { status: String },
    /// A fixed-point operation would leave the representable range.
    ArithmeticOverflow { op: &'static str },
    /// The override path was invoked without a valid, unused grant.
    UnauthorizedOverride { invoker: String },
    /// A caller-supplied value is out of its documented domain.
    InvalidInput { detail: String },
    /// A participant was supplied in a pool its classification does not match.
    RosterMismatch { wallet: String, expected: String, actual: String },
    /// Settlement could not be balanced against the pool.
    PoolImbalance { sources: String, uses: String },
}

impl EngineError {
    pub fn invalid_config(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::InvalidInput {
            detail: detail.into(),
        }
    }

    /// Stable machine code for logs and alert routing.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            Self::PrematureSettlement { .. } => "PREMATURE_SETTLEMENT",
            Self::ArithmeticOverflow { .. } => "ARITHMETIC_OVERFLOW",
            Self::UnauthorizedOverride { .. } => "UNAUTHORIZED_OVERRIDE",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::RosterMismatch { .. } => "ROSTER_MISMATCH",
            Self::PoolImbalance { .. } => "POOL_IMBALANCE",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { field, detail } => {
                write!(f, "invalid configuration '{field}': {detail}")
            }
            Self::PrematureSettlement { status } => {
                write!(f, "settlement requested while decision is {status}")
            }
            Self::ArithmeticOverflow { op } => {
                write!(f, "fixed-point overflow in {op}")
            }
            Self::UnauthorizedOverride { invoker } => {
                write!(f, "override invoked without authorization by '{invoker}'")
            }
            Self::InvalidInput { detail } => write!(f, "invalid input: {detail}"),
            Self::RosterMismatch {
                wallet,
                expected,
                actual,
            } => write!(
                f,
                "participant '{wallet}' supplied as {expected} but classifies as {actual}"
            ),
            Self::PoolImbalance { sources, uses } => {
                write!(f, "settlement does not balance: sources {sources} != uses {uses}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Convert a `None` from checked fixed-point arithmetic into an engine error.
pub trait OrOverflow<T> {
    fn or_overflow(self, op: &'static str) -> Result<T, EngineError>;
}

impl<T> OrOverflow<T> for Option<T> {
    #[inline]
    fn or_overflow(self, op: &'static str) -> Result<T, EngineError> {
        self.ok_or(EngineError::ArithmeticOverflow { op })
    }
}
