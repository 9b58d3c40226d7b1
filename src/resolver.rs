use std::collections::HashMap;

use crate::{
    diagnostics::Diagnostic,
    environment::Environment,
    token::{Token, TokenKind},
};

/// Argument bookkeeping for a function call whose parenthesis is still open.
#[derive(Debug)]
struct CallTracker {
    name: String,
    arity: usize,
    arg_count: usize,
    origin: usize,
}

/// Resolves every symbol and function reference against `env` and checks the
/// argument count of every call.
///
/// Consumes the raw tokens and returns a new, fully resolved sequence; no
/// `SymbolRef` or `FunctionRef` in the result lacks its payload.
pub fn verify(tokens: Vec<Token>, env: &Environment) -> Result<Vec<Token>, Diagnostic> {
    let mut depth: usize = 0;
    let mut pending_calls: HashMap<usize, CallTracker> = HashMap::new();
    let mut verified = Vec::with_capacity(tokens.len());

    for token in tokens {
        let Token { kind, origin } = token;
        let kind = match kind {
            TokenKind::SymbolRef { name, .. } => {
                let Some(value) = env.lookup(&name) else {
                    return Err(Diagnostic::resolver(format!("Undefined symbol: {name}")).at(origin));
                };
                TokenKind::SymbolRef {
                    name,
                    resolved: Some(value),
                }
            }
            TokenKind::FunctionRef { name, .. } => {
                let Some(function) = env.lookup_function(&name) else {
                    return Err(
                        Diagnostic::resolver(format!("Undefined function symbol: {name}"))
                            .at(origin),
                    );
                };
                // The argument list lives one level deeper; the first argument
                // has no separator in front of it, hence the count starts at 1.
                pending_calls.insert(
                    depth + 1,
                    CallTracker {
                        name: name.clone(),
                        arity: function.arity,
                        arg_count: 1,
                        origin,
                    },
                );
                TokenKind::FunctionRef {
                    name,
                    resolved: Some(function),
                }
            }
            TokenKind::ParenOpen => {
                depth += 1;
                TokenKind::ParenOpen
            }
            TokenKind::ArgSeparator => {
                let Some(call) = pending_calls.get_mut(&depth) else {
                    return Err(Diagnostic::resolver("Unexpected argument separator").at(origin));
                };
                call.arg_count += 1;
                TokenKind::ArgSeparator
            }
            TokenKind::ParenClose => {
                if let Some(call) = pending_calls.remove(&depth) {
                    if call.arg_count != call.arity {
                        return Err(Diagnostic::resolver(format!(
                            "Invalid number of arguments for {} (got {} expected {})",
                            call.name, call.arg_count, call.arity
                        ))
                        .at(call.origin));
                    }
                }
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Diagnostic::resolver("Closed a subexpression before it was opened").at(origin)
                })?;
                TokenKind::ParenClose
            }
            other => other,
        };
        verified.push(Token::new(kind, origin));
    }

    if depth != 0 {
        return Err(Diagnostic::resolver(format!(
            "{depth} subexpression(s) were not closed"
        )));
    }

    tracing::trace!(count = verified.len(), "verified token sequence");
    Ok(verified)
}
