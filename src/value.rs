use std::{fmt, sync::Arc};

pub type Callback = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// A fixed-arity numeric function.
///
/// Cloning is cheap: the body is shared, so a resolved token and the
/// environment that produced it point at the same callback.
#[derive(Clone)]
pub struct Function {
    pub name: String,
    pub arity: usize,
    body: Callback,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            body: Arc::new(body),
        }
    }

    /// Applies the body. A call with the wrong number of arguments never
    /// reaches the body and yields `NaN`.
    pub fn call(&self, args: &[f64]) -> f64 {
        if args.len() != self.arity {
            tracing::warn!(
                function = %self,
                got = args.len(),
                "function called with the wrong number of arguments"
            );
            return f64::NAN;
        }
        (self.body)(args)
    }

    pub fn same_body(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}/{}>", self.name, self.arity)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity && self.same_body(other)
    }
}
