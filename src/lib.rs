//! Arithmetic expression engine for chat-command calculators.
//!
//! An expression goes through three stages: [`tokenize`] scans it,
//! [`verify`] resolves symbols and functions against an [`Environment`] and
//! checks call arities, and [`evaluate`] runs the verified tokens through a
//! shunting-yard machine. [`Interpreter`] chains the stages for hosts.

pub mod diagnostics;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod repl;
pub mod resolver;
pub mod runtime;
pub mod stdlib;
pub mod token;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, ReckonerError};
pub use environment::Environment;
pub use evaluator::{evaluate, try_evaluate};
pub use lexer::tokenize;
pub use repl::Repl;
pub use resolver::verify;
pub use runtime::{ExecutionContext, Interpreter};
pub use stdlib::help_text;
pub use token::{Operator, Token, TokenKind};
pub use value::Function;
