use crate::{
    diagnostics::Diagnostic,
    token::{Operator, Token, TokenKind},
    value::Function,
};

/// Entries of the control stack.
#[derive(Debug, Clone, Copy)]
enum Control<'t> {
    Operator(Operator),
    Function(&'t Function),
    ParenOpen,
}

/// Shunting-yard machine: pending operators, calls, and open parentheses on
/// one stack, computed values on the other.
#[derive(Debug, Default)]
struct Machine<'t> {
    control: Vec<Control<'t>>,
    output: Vec<f64>,
}

fn defect(message: impl Into<String>, origin: Option<usize>) -> Diagnostic {
    let diagnostic = Diagnostic::evaluator(message);
    match origin {
        Some(origin) => diagnostic.at(origin),
        None => diagnostic,
    }
}

impl<'t> Machine<'t> {
    fn pop_value(&mut self) -> Result<f64, Diagnostic> {
        self.output
            .pop()
            .ok_or_else(|| defect("Output stack underflow", None))
    }

    fn apply_operator(&mut self, op: Operator) -> Result<(), Diagnostic> {
        if op.is_unary() {
            let operand = self.pop_value()?;
            self.output.push(-operand);
            return Ok(());
        }
        let right = self.pop_value()?;
        let left = self.pop_value()?;
        let result = match op {
            Operator::Add => left + right,
            Operator::Sub => left - right,
            Operator::Mul => left * right,
            Operator::Div => left / right,
            Operator::Pow => left.powf(right),
            Operator::UnaryMinus => unreachable!("unary operators handled above"),
        };
        self.output.push(result);
        Ok(())
    }

    fn apply_function(&mut self, function: &Function) -> Result<(), Diagnostic> {
        if self.output.len() < function.arity {
            return Err(defect(
                format!("Not enough values for a call to {function}"),
                None,
            ));
        }
        // Arguments were pushed left to right, so the tail is in order.
        let args = self.output.split_off(self.output.len() - function.arity);
        self.output.push(function.call(&args));
        Ok(())
    }

    /// Applies operators from the top of the control stack while `keep_going`
    /// approves them.
    fn unwind_operators<F>(&mut self, mut keep_going: F) -> Result<(), Diagnostic>
    where
        F: FnMut(Operator) -> bool,
    {
        while let Some(Control::Operator(top)) = self.control.last().copied() {
            if !keep_going(top) {
                break;
            }
            self.control.pop();
            self.apply_operator(top)?;
        }
        Ok(())
    }

    fn push_operator(&mut self, op: Operator) -> Result<(), Diagnostic> {
        self.unwind_operators(|top| op.yields_to(top))?;
        self.control.push(Control::Operator(op));
        Ok(())
    }

    fn separate_argument(&mut self, origin: usize) -> Result<(), Diagnostic> {
        self.unwind_operators(|_| true)?;
        match self.control.last() {
            Some(Control::ParenOpen) => Ok(()),
            _ => Err(defect("Argument separator outside a subexpression", Some(origin))),
        }
    }

    fn close_paren(&mut self, origin: usize) -> Result<(), Diagnostic> {
        self.unwind_operators(|_| true)?;
        match self.control.pop() {
            Some(Control::ParenOpen) => {}
            _ => return Err(defect("Unmatched closing parenthesis", Some(origin))),
        }
        if let Some(Control::Function(function)) = self.control.last().copied() {
            self.control.pop();
            self.apply_function(function)?;
        }
        Ok(())
    }

    fn step(&mut self, token: &'t Token) -> Result<(), Diagnostic> {
        match &token.kind {
            TokenKind::Number(value) => self.output.push(*value),
            TokenKind::SymbolRef {
                resolved: Some(value),
                ..
            } => self.output.push(*value),
            TokenKind::FunctionRef {
                resolved: Some(function),
                ..
            } => self.control.push(Control::Function(function)),
            TokenKind::SymbolRef { name, .. } | TokenKind::FunctionRef { name, .. } => {
                return Err(defect(format!("Unresolved reference: {name}"), Some(token.origin)));
            }
            TokenKind::ParenOpen => self.control.push(Control::ParenOpen),
            TokenKind::Operator(op) => self.push_operator(*op)?,
            TokenKind::ArgSeparator => self.separate_argument(token.origin)?,
            TokenKind::ParenClose => self.close_paren(token.origin)?,
        }
        Ok(())
    }

    fn finish(mut self) -> Result<f64, Diagnostic> {
        while let Some(entry) = self.control.pop() {
            match entry {
                Control::Operator(op) => self.apply_operator(op)?,
                Control::Function(function) => {
                    return Err(defect(format!("Call to {function} was never closed"), None));
                }
                Control::ParenOpen => {
                    return Err(defect("Subexpression was never closed", None));
                }
            }
        }
        match self.output.as_slice() {
            [value] => Ok(*value),
            [] => Err(defect("Expression produced no value", None)),
            values => Err(defect(
                format!("Expression left {} values on the stack", values.len()),
                None,
            )),
        }
    }
}

/// Runs the stack machine over a verified token sequence.
///
/// Any error returned here means the sequence did not come out of
/// [`verify`](crate::resolver::verify) intact.
pub fn try_evaluate(verified: &[Token]) -> Result<f64, Diagnostic> {
    let mut machine = Machine::default();
    for token in verified {
        machine.step(token)?;
    }
    machine.finish()
}

/// Evaluates a verified token sequence.
///
/// A malformed sequence is an internal defect: it panics in debug builds and
/// is logged and reported as `NaN` in release builds.
pub fn evaluate(verified: &[Token]) -> f64 {
    match try_evaluate(verified) {
        Ok(value) => value,
        Err(diagnostic) => {
            tracing::error!(
                reason = %diagnostic.message,
                position = ?diagnostic.position,
                "evaluator invariant violated"
            );
            if cfg!(debug_assertions) {
                panic!("evaluator invariant violated: {diagnostic}");
            }
            f64::NAN
        }
    }
}
