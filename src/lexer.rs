use std::str::Chars;

use crate::{
    diagnostics::Diagnostic,
    token::{Operator, Token, TokenKind},
};

/// Set of token classes the lexer will accept at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClasses(u8);

impl TokenClasses {
    pub const NUMBER: Self = Self(1);
    pub const UNARY_MINUS: Self = Self(1 << 1);
    pub const OPERATOR: Self = Self(1 << 2);
    pub const LPAREN: Self = Self(1 << 3);
    pub const RPAREN: Self = Self(1 << 4);
    pub const SYMBOL: Self = Self(1 << 5);

    pub const OPERAND: Self = Self::NUMBER.union(Self::SYMBOL);
    pub const EXPR_BEGIN: Self = Self::OPERAND.union(Self::UNARY_MINUS).union(Self::LPAREN);

    pub const AFTER_DIGIT: Self = Self::NUMBER.union(Self::OPERATOR).union(Self::RPAREN);
    /// A symbol may continue, start a call, close a subexpression, or be
    /// followed by an operator or separator.
    pub const AFTER_SYMBOL_CHAR: Self = Self::SYMBOL
        .union(Self::OPERATOR)
        .union(Self::LPAREN)
        .union(Self::RPAREN);
    pub const AFTER_CLOSE: Self = Self::OPERATOR.union(Self::RPAREN);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Character-class state machine turning an expression into tokens.
///
/// Offsets are counted in characters, not bytes, so `π` advances by one.
pub struct Lexer<'a> {
    chars: Chars<'a>,
    offset: usize,
    allowed: TokenClasses,
    balance: usize,
    number: String,
    number_start: usize,
    seen_dot: bool,
    symbol: String,
    symbol_start: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars(),
            offset: 0,
            allowed: TokenClasses::EXPR_BEGIN,
            balance: 0,
            number: String::new(),
            number_start: 0,
            seen_dot: false,
            symbol: String::new(),
            symbol_start: 0,
            tokens: Vec::new(),
        }
    }

    fn allows(&self, class: TokenClasses) -> bool {
        self.allowed.contains(class)
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::lexer(message).at(self.offset)
    }

    /// Emits whichever operand buffer is pending as a number or symbol token.
    fn flush_operand(&mut self) -> Result<(), Diagnostic> {
        if !self.number.is_empty() {
            let literal = std::mem::take(&mut self.number);
            let value = literal.parse::<f64>().map_err(|_| {
                Diagnostic::lexer(format!("Invalid number literal: {literal}"))
                    .at(self.number_start)
            })?;
            self.tokens.push(Token::number(value, self.number_start));
            self.seen_dot = false;
        } else if !self.symbol.is_empty() {
            let name = std::mem::take(&mut self.symbol);
            self.tokens.push(Token::symbol(name, self.symbol_start));
        }
        Ok(())
    }

    fn push_digit(&mut self, ch: char) {
        if self.number.is_empty() {
            self.number_start = self.offset;
        }
        self.number.push(ch);
        self.allowed = TokenClasses::AFTER_DIGIT;
    }

    fn push_decimal_point(&mut self) -> Result<(), Diagnostic> {
        if !self.allows(TokenClasses::NUMBER) {
            return Err(self.error("Unexpected decimal point"));
        }
        if self.seen_dot {
            return Err(self.error("Duplicate decimal point"));
        }
        if self.number.is_empty() {
            self.number_start = self.offset;
            self.number.push('0');
        }
        self.number.push('.');
        self.seen_dot = true;
        self.allowed = TokenClasses::NUMBER;
        Ok(())
    }

    fn open_paren(&mut self) -> Result<(), Diagnostic> {
        if !self.allows(TokenClasses::LPAREN) {
            return Err(self.error("Unexpected opening parenthesis"));
        }
        if !self.symbol.is_empty() {
            let name = std::mem::take(&mut self.symbol);
            self.tokens.push(Token::function(name, self.symbol_start));
        }
        self.tokens.push(Token::new(TokenKind::ParenOpen, self.offset));
        self.balance += 1;
        self.allowed = TokenClasses::EXPR_BEGIN;
        Ok(())
    }

    fn close_paren(&mut self) -> Result<(), Diagnostic> {
        if self.balance == 0 {
            return Err(self.error("Closed a subexpression before it was opened"));
        }
        if !self.allows(TokenClasses::RPAREN) {
            return Err(self.error("Unexpected closing parenthesis"));
        }
        self.flush_operand()?;
        self.tokens.push(Token::new(TokenKind::ParenClose, self.offset));
        self.balance -= 1;
        self.allowed = TokenClasses::AFTER_CLOSE;
        Ok(())
    }

    fn separator(&mut self) -> Result<(), Diagnostic> {
        if !self.allows(TokenClasses::OPERATOR) || self.balance == 0 {
            return Err(self.error("Unexpected argument separator"));
        }
        self.flush_operand()?;
        self.tokens.push(Token::new(TokenKind::ArgSeparator, self.offset));
        self.allowed = TokenClasses::EXPR_BEGIN;
        Ok(())
    }

    fn operator(&mut self, ch: char, op: Operator) -> Result<(), Diagnostic> {
        if !self.allows(TokenClasses::OPERATOR) {
            return Err(self.error(format!("Unexpected operator '{ch}'")));
        }
        self.flush_operand()?;
        self.tokens.push(Token::operator(op, self.offset));
        self.allowed = TokenClasses::EXPR_BEGIN;
        Ok(())
    }

    fn push_symbol_char(&mut self, ch: char) {
        if self.symbol.is_empty() {
            self.symbol_start = self.offset;
        }
        self.symbol.push(ch);
        self.allowed = TokenClasses::AFTER_SYMBOL_CHAR;
    }

    fn unexpected(&self, ch: char) -> Diagnostic {
        if ch.is_ascii_digit() {
            self.error("Unexpected number")
        } else if ch.is_control() {
            self.error("Unsupported character")
        } else {
            self.error(format!("Unexpected symbol '{ch}'"))
        }
    }

    fn step(&mut self, ch: char) -> Result<(), Diagnostic> {
        match ch {
            _ if ch.is_ascii_digit() && self.allows(TokenClasses::NUMBER) => {
                self.push_digit(ch);
                Ok(())
            }
            '.' => self.push_decimal_point(),
            '-' if self.allows(TokenClasses::UNARY_MINUS) => {
                self.tokens.push(Token::operator(Operator::UnaryMinus, self.offset));
                self.allowed = TokenClasses::EXPR_BEGIN;
                Ok(())
            }
            '(' => self.open_paren(),
            ')' => self.close_paren(),
            ',' => self.separator(),
            _ if ch.is_whitespace() => Ok(()),
            _ => {
                if let Some(op) = Operator::from_char(ch) {
                    self.operator(ch, op)
                } else if !ch.is_control() && self.allows(TokenClasses::SYMBOL) {
                    self.push_symbol_char(ch);
                    Ok(())
                } else {
                    Err(self.unexpected(ch))
                }
            }
        }
    }

    fn finish(mut self) -> Result<Vec<Token>, Diagnostic> {
        match self.balance {
            0 => {}
            1 => return Err(Diagnostic::lexer("1 subexpression was not closed")),
            n => return Err(Diagnostic::lexer(format!("{n} subexpressions were not closed"))),
        }
        self.flush_operand()?;
        if !self.allows(TokenClasses::OPERATOR) {
            return Err(self.error("Expression did not end with a number or closing parenthesis"));
        }
        Ok(self.tokens)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        while let Some(ch) = self.chars.next() {
            self.step(ch)?;
            self.offset += 1;
        }
        let tokens = self.finish()?;
        tracing::trace!(count = tokens.len(), "tokenized expression");
        Ok(tokens)
    }
}

/// Scans `source` into an ordered token sequence.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source).tokenize()
}
