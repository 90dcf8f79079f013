//! Preprocessor expressions used as define values.
//!
//! Location defines are either literals or sums of other defines, e.g.
//! `#define MATERIAL_LOCATION LIGHT_LOCATION + LIGHT_LOCATIONS`. This module
//! parses that subset and evaluates it against a table of defines.
//!
//! Evaluation follows the preprocessor: a referenced define is replaced by
//! its tokens, not by its value. With `#define A 5 - 3`, `10 - A` is
//! `10 - 5 - 3`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::error::{InterfaceError, Result};

/// A parsed define value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefineExpr {
    Literal(i64),
    Symbol(String),
    /// Explicit parentheses, kept so that substitution sees them.
    Group(Box<DefineExpr>),
    Add(Box<DefineExpr>, Box<DefineExpr>),
    Sub(Box<DefineExpr>, Box<DefineExpr>),
}

impl DefineExpr {
    pub fn literal(value: i64) -> Self {
        Self::Literal(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// `lhs + rhs` over two symbols.
    pub fn sum(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::Add(
            Box::new(Self::Symbol(lhs.into())),
            Box::new(Self::Symbol(rhs.into())),
        )
    }

    /// `symbol + offset`.
    pub fn offset(symbol: impl Into<String>, offset: i64) -> Self {
        Self::Add(
            Box::new(Self::Symbol(symbol.into())),
            Box::new(Self::Literal(offset)),
        )
    }

    /// Parse `expr := term (('+' | '-') term)*`, `term := INT | IDENT | '(' expr ')'`.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let mut parser = ExprParser {
            source: text,
            tokens: &tokens,
            pos: 0,
        };
        let expr = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(parser.error("unexpected trailing tokens"));
        }
        Ok(expr)
    }

    /// Symbols referenced by this expression, in order of appearance.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Symbol(name) => out.push(name),
            Self::Group(inner) => inner.collect_symbols(out),
            Self::Add(lhs, rhs) | Self::Sub(lhs, rhs) => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
        }
    }

    /// Evaluate with a resolver that maps each symbol to a value.
    ///
    /// Symbols behave as parenthesized values here. Use
    /// [`DefineTable::evaluate_expr`] for preprocessor substitution.
    pub fn eval_with<F>(&self, resolve: &mut F) -> Result<i64>
    where
        F: FnMut(&str) -> Result<i64>,
    {
        match self {
            Self::Literal(value) => Ok(*value),
            Self::Symbol(name) => resolve(name),
            Self::Group(inner) => inner.eval_with(resolve),
            Self::Add(lhs, rhs) => {
                let (lhs, rhs) = (lhs.eval_with(resolve)?, rhs.eval_with(resolve)?);
                lhs.checked_add(rhs).ok_or_else(|| self.overflow())
            }
            Self::Sub(lhs, rhs) => {
                let (lhs, rhs) = (lhs.eval_with(resolve)?, rhs.eval_with(resolve)?);
                lhs.checked_sub(rhs).ok_or_else(|| self.overflow())
            }
        }
    }

    fn overflow(&self) -> InterfaceError {
        InterfaceError::InvalidExpression {
            expr: self.to_string(),
            message: "integer overflow".to_string(),
        }
    }

    /// Token stream matching the `Display` text.
    fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.push_tokens(&mut out);
        out
    }

    fn push_tokens(&self, out: &mut Vec<Token>) {
        match self {
            Self::Literal(value) => out.push(Token::Int(*value)),
            Self::Symbol(name) => out.push(Token::Ident(name.clone())),
            Self::Group(inner) => {
                out.push(Token::Open);
                inner.push_tokens(out);
                out.push(Token::Close);
            }
            Self::Add(lhs, rhs) | Self::Sub(lhs, rhs) => {
                lhs.push_tokens(out);
                out.push(if matches!(self, Self::Add(..)) {
                    Token::Plus
                } else {
                    Token::Minus
                });
                if matches!(**rhs, Self::Add(..) | Self::Sub(..)) {
                    out.push(Token::Open);
                    rhs.push_tokens(out);
                    out.push(Token::Close);
                } else {
                    rhs.push_tokens(out);
                }
            }
        }
    }
}

impl fmt::Display for DefineExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Symbol(name) => f.write_str(name),
            Self::Group(inner) => write!(f, "({inner})"),
            Self::Add(lhs, rhs) => write!(f, "{lhs} + {}", Parenthesized(rhs)),
            Self::Sub(lhs, rhs) => write!(f, "{lhs} - {}", Parenthesized(rhs)),
        }
    }
}

/// Right operands that are themselves sums need parentheses to keep
/// left-associative evaluation intact.
struct Parenthesized<'a>(&'a DefineExpr);

impl fmt::Display for Parenthesized<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            DefineExpr::Add(..) | DefineExpr::Sub(..) => write!(f, "({})", self.0),
            other => write!(f, "{other}"),
        }
    }
}

// ============================================================================
// Tokenizer and parser
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(i64),
    Ident(String),
    Plus,
    Minus,
    Open,
    Close,
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let invalid = |message: &str| InterfaceError::InvalidExpression {
        expr: text.to_string(),
        message: message.to_string(),
    };

    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            c if c.is_ascii_digit() => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let value = text[start..end]
                    .parse::<i64>()
                    .map_err(|_| invalid("integer out of range"))?;
                tokens.push(Token::Int(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if !(d.is_ascii_alphanumeric() || d == '_') {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(text[start..end].to_string()));
            }
            other => return Err(invalid(&format!("unexpected character '{other}'"))),
        }
    }

    if tokens.is_empty() {
        return Err(invalid("empty expression"));
    }
    Ok(tokens)
}

struct ExprParser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl ExprParser<'_> {
    fn error(&self, message: &str) -> InterfaceError {
        InterfaceError::InvalidExpression {
            expr: self.source.to_string(),
            message: message.to_string(),
        }
    }

    fn expr(&mut self) -> Result<DefineExpr> {
        let mut lhs = self.term()?;
        while let Some(token) = self.tokens.get(self.pos) {
            let add = match token {
                Token::Plus => true,
                Token::Minus => false,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = if add {
                DefineExpr::Add(Box::new(lhs), Box::new(rhs))
            } else {
                DefineExpr::Sub(Box::new(lhs), Box::new(rhs))
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<DefineExpr> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| self.error("expected a term"))?;
        self.pos += 1;
        match token {
            Token::Int(value) => Ok(DefineExpr::Literal(*value)),
            Token::Ident(name) => Ok(DefineExpr::Symbol(name.clone())),
            Token::Open => {
                let inner = self.expr()?;
                match self.tokens.get(self.pos) {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(DefineExpr::Group(Box::new(inner)))
                    }
                    _ => Err(self.error("missing ')'")),
                }
            }
            _ => Err(self.error("expected a number or identifier")),
        }
    }
}

// ============================================================================
// Define table
// ============================================================================

/// Named define expressions plus externally supplied values.
#[derive(Debug, Clone, Default)]
pub struct DefineTable {
    defines: BTreeMap<String, DefineExpr>,
    externals: HashMap<String, i64>,
}

impl DefineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a define. Returns the previous expression, if any.
    pub fn insert(&mut self, name: impl Into<String>, expr: DefineExpr) -> Option<DefineExpr> {
        self.defines.insert(name.into(), expr)
    }

    /// Provide a value for a symbol the header uses but does not define.
    pub fn with_external(mut self, name: impl Into<String>, value: i64) -> Self {
        self.externals.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DefineExpr> {
        self.defines.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defines.contains_key(name) || self.externals.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Evaluate a define by substituting referenced defines token by token.
    ///
    /// Defines take precedence over externals with the same name. Externals
    /// substitute as a single number.
    pub fn evaluate(&self, name: &str) -> Result<i64> {
        let mut tokens = Vec::new();
        self.expand_symbol(name, &mut BTreeSet::new(), &mut tokens)?;
        fold_tokens(name, &tokens)
    }

    /// Evaluate an expression that is not itself in the table, such as a
    /// `layout` qualifier value.
    pub fn evaluate_expr(&self, expr: &DefineExpr) -> Result<i64> {
        let mut tokens = Vec::new();
        let mut visiting = BTreeSet::new();
        for token in expr.tokens() {
            self.expand_token(token, &mut visiting, &mut tokens)?;
        }
        fold_tokens(&expr.to_string(), &tokens)
    }

    fn expand_symbol(
        &self,
        name: &str,
        visiting: &mut BTreeSet<String>,
        out: &mut Vec<Token>,
    ) -> Result<()> {
        let Some(expr) = self.defines.get(name) else {
            let value = self
                .externals
                .get(name)
                .copied()
                .ok_or_else(|| InterfaceError::UnknownSymbol(name.to_string()))?;
            out.push(Token::Int(value));
            return Ok(());
        };

        if !visiting.insert(name.to_string()) {
            return Err(InterfaceError::CyclicDefine(name.to_string()));
        }
        for token in expr.tokens() {
            self.expand_token(token, visiting, out)?;
        }
        visiting.remove(name);
        Ok(())
    }

    fn expand_token(
        &self,
        token: Token,
        visiting: &mut BTreeSet<String>,
        out: &mut Vec<Token>,
    ) -> Result<()> {
        match token {
            Token::Ident(name) => self.expand_symbol(&name, visiting, out),
            other => {
                out.push(other);
                Ok(())
            }
        }
    }

    /// Evaluate every define.
    pub fn evaluate_all(&self) -> Result<BTreeMap<String, i64>> {
        self.defines
            .keys()
            .map(|name| Ok((name.clone(), self.evaluate(name)?)))
            .collect()
    }

    /// Symbols referenced directly by a define's expression.
    pub fn dependencies(&self, name: &str) -> Result<Vec<&str>> {
        self.defines
            .get(name)
            .map(DefineExpr::symbols)
            .ok_or_else(|| InterfaceError::UnknownSymbol(name.to_string()))
    }
}

/// Parse and evaluate a fully expanded token stream left to right.
fn fold_tokens(label: &str, tokens: &[Token]) -> Result<i64> {
    let mut parser = ExprParser {
        source: label,
        tokens,
        pos: 0,
    };
    let expr = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(parser.error("unexpected trailing tokens"));
    }
    expr.eval_with(&mut |symbol| Err(InterfaceError::UnknownSymbol(symbol.to_string())))
}
