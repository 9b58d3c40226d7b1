use std::fmt;

use crate::value::Function;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    UnaryMinus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl Operator {
    /// Maps a binary operator character. `-` always maps to `Sub`; the lexer
    /// decides when it is a unary minus instead.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 0,
            Self::Mul | Self::Div => 1,
            Self::UnaryMinus | Self::Pow => 2,
        }
    }

    pub fn associativity(self) -> Associativity {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div => Associativity::Left,
            Self::UnaryMinus | Self::Pow => Associativity::Right,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Self::UnaryMinus)
    }

    /// Whether `top`, sitting on the control stack, must be applied before
    /// `self` is pushed.
    pub fn yields_to(self, top: Operator) -> bool {
        top.precedence() > self.precedence()
            || (top.precedence() == self.precedence()
                && self.associativity() == Associativity::Left)
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub | Self::UnaryMinus => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Operator(Operator),
    ParenOpen,
    ParenClose,
    ArgSeparator,
    FunctionRef {
        name: String,
        resolved: Option<Function>,
    },
    SymbolRef {
        name: String,
        resolved: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Zero-based character offset of the first character of the token.
    pub origin: usize,
}

impl Token {
    pub fn new(kind: TokenKind, origin: usize) -> Self {
        Self { kind, origin }
    }

    pub fn number(value: f64, origin: usize) -> Self {
        Self::new(TokenKind::Number(value), origin)
    }

    pub fn operator(op: Operator, origin: usize) -> Self {
        Self::new(TokenKind::Operator(op), origin)
    }

    pub fn function(name: impl Into<String>, origin: usize) -> Self {
        Self::new(
            TokenKind::FunctionRef {
                name: name.into(),
                resolved: None,
            },
            origin,
        )
    }

    pub fn symbol(name: impl Into<String>, origin: usize) -> Self {
        Self::new(
            TokenKind::SymbolRef {
                name: name.into(),
                resolved: None,
            },
            origin,
        )
    }

    /// True for symbol and function references still lacking a payload.
    pub fn is_unresolved(&self) -> bool {
        matches!(
            &self.kind,
            TokenKind::FunctionRef { resolved: None, .. }
                | TokenKind::SymbolRef { resolved: None, .. }
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Number(value) => write!(f, "{value}"),
            TokenKind::Operator(Operator::UnaryMinus) => write!(f, "neg"),
            TokenKind::Operator(op) => write!(f, "{}", op.symbol()),
            TokenKind::ParenOpen => write!(f, "("),
            TokenKind::ParenClose => write!(f, ")"),
            TokenKind::ArgSeparator => write!(f, ","),
            TokenKind::FunctionRef { name, .. } => write!(f, "{name}"),
            TokenKind::SymbolRef { name, .. } => write!(f, "{name}"),
        }
    }
}
