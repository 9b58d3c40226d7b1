use std::sync::Arc;

use crate::{
    diagnostics::{Diagnostic, ReckonerError, Result},
    environment::Environment,
    evaluator, lexer, resolver,
    token::TokenKind,
};

pub const DEFAULT_MAX_INPUT_LEN: usize = 1024;

/// Per-interpreter settings.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Longest accepted expression, in characters. `None` disables the check.
    pub max_input_len: Option<usize>,
    /// Prompt shown by the interactive session.
    pub prompt: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            max_input_len: Some(DEFAULT_MAX_INPUT_LEN),
            prompt: "> ".into(),
        }
    }
}

impl ExecutionContext {
    pub fn with_max_input_len(mut self, limit: Option<usize>) -> Self {
        self.max_input_len = limit;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

/// Runs the full lex, verify, evaluate pipeline against a shared environment.
///
/// Cloning an interpreter is cheap and the clone shares the environment, which
/// is how a host hands one symbol table to several worker threads.
#[derive(Debug, Clone)]
pub struct Interpreter {
    env: Arc<Environment>,
    context: ExecutionContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_context(ExecutionContext::default())
    }

    pub fn with_context(context: ExecutionContext) -> Self {
        Self {
            env: Arc::new(Environment::new()),
            context,
        }
    }

    pub fn with_environment(env: Arc<Environment>, context: ExecutionContext) -> Self {
        Self { env, context }
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    fn check_length(&self, source: &str) -> std::result::Result<(), Diagnostic> {
        let Some(limit) = self.context.max_input_len else {
            return Ok(());
        };
        match source.chars().nth(limit) {
            Some(_) => Err(Diagnostic::lexer(format!(
                "Expression is longer than {limit} characters"
            ))
            .at(limit)),
            None => Ok(()),
        }
    }

    /// Evaluates `source`, stopping at the first diagnostic.
    pub fn eval(&self, source: &str) -> std::result::Result<f64, Diagnostic> {
        self.check_length(source)?;
        let tokens = lexer::tokenize(source)?;
        let verified = resolver::verify(tokens, &self.env)?;
        let value = evaluator::try_evaluate(&verified).inspect_err(|diagnostic| {
            tracing::error!(%diagnostic, source, "evaluator rejected a verified expression");
        })?;
        tracing::debug!(source, value, "evaluated expression");
        Ok(value)
    }

    pub fn eval_source(&self, source: &str) -> Result<f64> {
        self.eval(source).map_err(|diagnostic| {
            tracing::warn!(%diagnostic, "expression rejected");
            ReckonerError::from(diagnostic)
        })
    }

    /// Evaluates `source` and, only on success, stores the result as variable
    /// `name`.
    pub fn define(&self, name: &str, source: &str) -> Result<f64> {
        if !is_valid_name(name) || self.env.has_function(name) {
            return Err(ReckonerError::InvalidName(name.to_string()));
        }
        let value = self.eval_source(source)?;
        self.env.assign_variable(name, value);
        Ok(value)
    }

    /// Handles one line of input: either `name = expression` or a bare
    /// expression. Returns the defined name alongside the value.
    pub fn eval_line(&self, line: &str) -> Result<(Option<String>, f64)> {
        match line.split_once('=') {
            Some((name, source)) => {
                let name = name.trim();
                let value = self.define(name, source)?;
                Ok((Some(name.to_string()), value))
            }
            None => Ok((None, self.eval_source(line)?)),
        }
    }
}

/// Whether `name` would lex as a single symbol token.
pub fn is_valid_name(name: &str) -> bool {
    match lexer::tokenize(name) {
        Ok(tokens) => matches!(
            tokens.as_slice(),
            [token] if matches!(token.kind, TokenKind::SymbolRef { .. })
        ) && !name.chars().any(char::is_whitespace),
        Err(_) => false,
    }
}
