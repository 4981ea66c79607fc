//! Formula parser: converts formula text into an expression tree.
//!
//! Supports number literals, `true`/`false`, cell references (`A1`),
//! parentheses, arithmetic (`+ - * / %`), comparisons (`< <= > >= == !=`)
//! and logical operators (`&& || !`). Precedence from lowest to highest:
//! `||`, `&&`, equality, comparison, additive, multiplicative, unary.
//!
//! A run of same-level operators (`1+2-3+...`) becomes one flat
//! [`Expr::Chain`], so formula length never turns into tree depth. Depth only
//! grows with parentheses and prefix operators, and is capped at
//! [`MAX_NESTING`].

use super::cell_ref::CellRef;
use super::error::FormulaError;

/// Deepest allowed nesting of parentheses and prefix operators.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

/// Parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Ref(CellRef),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    /// `first op1 e1 op2 e2 ...`, applied left to right. All operators are
    /// of one precedence level.
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
}

impl Expr {
    /// Cell references in the expression, left to right.
    pub fn references(&self) -> Vec<CellRef> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, out: &mut Vec<CellRef>) {
        match self {
            Expr::Number(_) | Expr::Bool(_) => {}
            Expr::Ref(r) => out.push(r.clone()),
            Expr::Unary { expr, .. } => expr.collect_references(out),
            Expr::Chain { first, rest } => {
                first.collect_references(out);
                for (_, operand) in rest {
                    operand.collect_references(out);
                }
            }
        }
    }
}

/// Parse a formula. A leading `=` is optional.
pub fn parse_formula(formula: &str) -> Result<Expr, FormulaError> {
    let body = formula.strip_prefix('=').unwrap_or(formula);
    let tokens = tokenize(body)?;
    let (expr, pos) = parse_or(&tokens, 0, 0)?;
    match tokens.get(pos) {
        None => Ok(expr),
        Some(tok) => Err(FormulaError::UnexpectedToken(format!("{:?}", tok))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Bool(bool),
    Ref(CellRef),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Bang,
}

fn single_char_token(c: char) -> Option<Token> {
    match c {
        '+' => Some(Token::Plus),
        '-' => Some(Token::Minus),
        '*' => Some(Token::Star),
        '/' => Some(Token::Slash),
        '%' => Some(Token::Percent),
        '(' => Some(Token::LParen),
        ')' => Some(Token::RParen),
        _ => None,
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if let Some(tok) = single_char_token(c) {
            tokens.push(tok);
            chars.next();
            continue;
        }
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '<' | '>' | '=' | '!' => {
                chars.next();
                let followed_by_eq = matches!(chars.peek(), Some(&(_, '=')));
                if followed_by_eq {
                    chars.next();
                }
                let tok = match (c, followed_by_eq) {
                    ('<', false) => Token::Lt,
                    ('<', true) => Token::LtEq,
                    ('>', false) => Token::Gt,
                    ('>', true) => Token::GtEq,
                    ('=', true) => Token::EqEq,
                    ('!', true) => Token::NotEq,
                    ('!', false) => Token::Bang,
                    _ => return Err(FormulaError::UnexpectedChar(c, offset)),
                };
                tokens.push(tok);
            }
            '&' | '|' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, next)) if next == c => {
                        chars.next();
                        tokens.push(if c == '&' { Token::AndAnd } else { Token::OrOr });
                    }
                    _ => return Err(FormulaError::UnexpectedChar(c, offset)),
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = text
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(text.clone()))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        word.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(word_token(word)?);
            }
            _ => return Err(FormulaError::UnexpectedChar(c, offset)),
        }
    }

    Ok(tokens)
}

// References must be written in uppercase, matching dependency extraction.
fn word_token(word: String) -> Result<Token, FormulaError> {
    match word.as_str() {
        "true" => return Ok(Token::Bool(true)),
        "false" => return Ok(Token::Bool(false)),
        _ => {}
    }
    let letters = word.bytes().take_while(|b| b.is_ascii_uppercase()).count();
    let digits = word.len() - letters;
    if letters > 0
        && digits > 0
        && word.bytes().skip(letters).all(|b| b.is_ascii_digit())
        && let Some(cell_ref) = CellRef::from_str(&word)
    {
        return Ok(Token::Ref(cell_ref));
    }
    Err(FormulaError::UnknownName(word))
}

type Parsed = Result<(Expr, usize), FormulaError>;

type Level = fn(&[Token], usize, usize) -> Parsed;

fn deeper(depth: usize) -> Result<usize, FormulaError> {
    if depth >= MAX_NESTING {
        return Err(FormulaError::TooDeep);
    }
    Ok(depth + 1)
}

/// Parse one left-associative precedence level into a flat chain.
fn parse_level(
    tokens: &[Token],
    pos: usize,
    depth: usize,
    ops: &[(Token, BinaryOp)],
    next: Level,
) -> Parsed {
    let (first, mut pos) = next(tokens, pos, depth)?;
    let mut rest = Vec::new();

    while let Some(tok) = tokens.get(pos) {
        let Some((_, op)) = ops.iter().find(|(t, _)| t == tok) else {
            break;
        };
        let (operand, new_pos) = next(tokens, pos + 1, depth)?;
        rest.push((*op, operand));
        pos = new_pos;
    }

    if rest.is_empty() {
        return Ok((first, pos));
    }
    let chain = Expr::Chain {
        first: Box::new(first),
        rest,
    };
    Ok((chain, pos))
}

fn parse_or(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    parse_level(tokens, pos, depth, &[(Token::OrOr, BinaryOp::Or)], parse_and)
}

fn parse_and(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    parse_level(tokens, pos, depth, &[(Token::AndAnd, BinaryOp::And)], parse_equality)
}

fn parse_equality(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    parse_level(
        tokens,
        pos,
        depth,
        &[(Token::EqEq, BinaryOp::Eq), (Token::NotEq, BinaryOp::NotEq)],
        parse_comparison,
    )
}

fn parse_comparison(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    parse_level(
        tokens,
        pos,
        depth,
        &[
            (Token::Lt, BinaryOp::Lt),
            (Token::LtEq, BinaryOp::LtEq),
            (Token::Gt, BinaryOp::Gt),
            (Token::GtEq, BinaryOp::GtEq),
        ],
        parse_add_sub,
    )
}

fn parse_add_sub(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    parse_level(
        tokens,
        pos,
        depth,
        &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
        parse_mul_div,
    )
}

fn parse_mul_div(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    parse_level(
        tokens,
        pos,
        depth,
        &[
            (Token::Star, BinaryOp::Mul),
            (Token::Slash, BinaryOp::Div),
            (Token::Percent, BinaryOp::Rem),
        ],
        parse_unary,
    )
}

fn parse_unary(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    let op = match tokens.get(pos) {
        Some(Token::Minus) => UnaryOp::Neg,
        Some(Token::Plus) => UnaryOp::Plus,
        Some(Token::Bang) => UnaryOp::Not,
        _ => return parse_primary(tokens, pos, depth),
    };
    let (expr, pos) = parse_unary(tokens, pos + 1, deeper(depth)?)?;
    Ok((
        Expr::Unary {
            op,
            expr: Box::new(expr),
        },
        pos,
    ))
}

fn parse_primary(tokens: &[Token], pos: usize, depth: usize) -> Parsed {
    match tokens.get(pos) {
        None => Err(FormulaError::UnexpectedEnd),
        Some(Token::Number(n)) => Ok((Expr::Number(*n), pos + 1)),
        Some(Token::Bool(b)) => Ok((Expr::Bool(*b), pos + 1)),
        Some(Token::Ref(r)) => Ok((Expr::Ref(r.clone()), pos + 1)),
        Some(Token::LParen) => {
            let (expr, pos) = parse_or(tokens, pos + 1, deeper(depth)?)?;
            match tokens.get(pos) {
                Some(Token::RParen) => Ok((expr, pos + 1)),
                Some(tok) => Err(FormulaError::UnexpectedToken(format!("{:?}", tok))),
                None => Err(FormulaError::UnexpectedEnd),
            }
        }
        Some(tok) => Err(FormulaError::UnexpectedToken(format!("{:?}", tok))),
    }
}
