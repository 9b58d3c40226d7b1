use std::f64::consts;

use indexmap::IndexMap;

use crate::{environment::Environment, value::Function};

pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Process-wide constants, each under every alias it answers to.
pub fn constants() -> IndexMap<String, f64> {
    let mut constants = IndexMap::new();
    constants.insert("pi".into(), consts::PI);
    constants.insert("π".into(), consts::PI);
    constants.insert("e".into(), consts::E);
    constants.insert("φ".into(), GOLDEN_RATIO);
    constants
}

/// Registers the built-in functions.
pub fn install(env: &Environment) {
    env.assign_function("sqrt", Function::new("sqrt", 1, math_sqrt));
    env.assign_function("ln", Function::new("ln", 1, math_ln));
    env.assign_function("log10", Function::new("log10", 1, math_log10));
    env.assign_function("log", Function::new("log", 2, math_log));
    env.assign_function("root", Function::new("root", 2, math_root));
}

/// Missing arguments read as `NaN`.
fn arg(args: &[f64], idx: usize) -> f64 {
    args.get(idx).copied().unwrap_or(f64::NAN)
}

fn math_sqrt(args: &[f64]) -> f64 {
    arg(args, 0).sqrt()
}

fn math_ln(args: &[f64]) -> f64 {
    arg(args, 0).ln()
}

fn math_log10(args: &[f64]) -> f64 {
    arg(args, 0).log10()
}

/// `log(x, base)`
fn math_log(args: &[f64]) -> f64 {
    arg(args, 0).ln() / arg(args, 1).ln()
}

/// `root(x, n)`: the n-th root of x.
fn math_root(args: &[f64]) -> f64 {
    arg(args, 0).powf(arg(args, 1).recip())
}

/// Usage summary for the calculator, listing what `env` currently offers.
pub fn help_text(env: &Environment) -> String {
    let constants = env
        .constants()
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let functions = env
        .function_signatures()
        .into_iter()
        .map(|(name, arity)| format!("{name}/{arity}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Operators: + - * / ^ (right-associative), unary -, parentheses, ',' between arguments. \
         Constants: {constants}. Functions: {functions}."
    )
}
