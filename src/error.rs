use core::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Number of arguments a procedure accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Self::Exact(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }

    pub(crate) fn check(&self, procedure: &str, count: usize) -> Result<(), LispError> {
        if self.accepts(count) {
            return Ok(());
        }
        Err(LispError::ArityMismatch {
            procedure: procedure.to_owned(),
            expected: *self,
            found: count,
        })
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{}", n),
            Self::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LispError {
    #[error("unexpected EOF while reading")]
    UnexpectedEof,

    #[error("unexpected )")]
    UnexpectedCloseParen,

    #[error("unexpected tokens after expression, starting at `{0}`")]
    TrailingTokens(String),

    #[error("malformed `{form}`: expected {expected} operands, found {found}")]
    MalformedSpecialForm {
        form: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unbound variable `{0}`")]
    UnboundVariable(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("`{procedure}` expects {expected} arguments, found {found}")]
    ArityMismatch {
        procedure: String,
        expected: Arity,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in `{0}`")]
    IntegerOverflow(&'static str),

    #[error("recursion limit of {0} exceeded")]
    RecursionLimit(usize),
}

/// The kind of a [`LispError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ErrorKind {
    UnexpectedEof,
    UnexpectedCloseParen,
    TrailingTokens,
    MalformedSpecialForm,
    UnboundVariable,
    TypeMismatch,
    ArityMismatch,
    DivisionByZero,
    IntegerOverflow,
    RecursionLimit,
}

impl ErrorKind {
    pub fn is_syntax_error(self) -> bool {
        matches!(self, Self::UnexpectedEof | Self::UnexpectedCloseParen | Self::TrailingTokens)
    }
}

impl LispError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedEof => ErrorKind::UnexpectedEof,
            Self::UnexpectedCloseParen => ErrorKind::UnexpectedCloseParen,
            Self::TrailingTokens(_) => ErrorKind::TrailingTokens,
            Self::MalformedSpecialForm { .. } => ErrorKind::MalformedSpecialForm,
            Self::UnboundVariable(_) => ErrorKind::UnboundVariable,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            Self::DivisionByZero => ErrorKind::DivisionByZero,
            Self::IntegerOverflow(_) => ErrorKind::IntegerOverflow,
            Self::RecursionLimit(_) => ErrorKind::RecursionLimit,
        }
    }

    /// Errors raised while reading text rather than while evaluating it.
    pub fn is_syntax_error(&self) -> bool {
        self.kind().is_syntax_error()
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: impl fmt::Display) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.to_string(),
        }
    }
}
