use std::fmt;

use thiserror::Error;

/// Stage of the pipeline that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexer,
    Resolver,
    Evaluator,
}

/// A single failure, optionally anchored at a character offset of the source.
///
/// `position` is `None` when the problem belongs to the whole expression
/// (unclosed parentheses) rather than to one offending character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub position: Option<usize>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    pub fn lexer(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Lexer, message)
    }

    pub fn resolver(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Resolver, message)
    }

    pub fn evaluator(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Evaluator, message)
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Splits the diagnostic into the `(message, position)` pair hosts consume.
    pub fn into_parts(self) -> (String, Option<usize>) {
        (self.message, self.position)
    }

    /// Renders the diagnostic the way a chat reply shows it.
    pub fn to_reply(&self) -> String {
        match self.position {
            Some(position) => format!("{} | Position: {position}", self.message),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(position) = self.position {
            write!(f, " | Position: {position}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

impl From<Diagnostic> for (String, Option<usize>) {
    fn from(diagnostic: Diagnostic) -> Self {
        diagnostic.into_parts()
    }
}

/// Unified error type for the engine and its front ends.
#[derive(Debug, Error)]
pub enum ReckonerError {
    #[error("{0}")]
    Diagnostic(#[from] Diagnostic),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{0}` is not a valid variable name")]
    InvalidName(String),
}

impl ReckonerError {
    /// Returns the underlying diagnostic, if this error came from the pipeline.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Diagnostic(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReckonerError>;
