mod builtin;
mod config;
mod context;
mod environment;
mod error;
mod interpreter;
mod parser;
mod stack;

#[cfg(test)]
mod test_utils;

pub use config::InterpreterConfig;
pub use context::EvaluationContext;
pub use environment::Environment;
pub use error::{Arity, ErrorKind, LispError};
pub use interpreter::{Closure, EvaluationResult, Evaluator, Expression, Primitive, Procedure};
pub use parser::{atom, parse, parse_program, read_from_tokens, tokenize, MAX_NESTING};
