//! Arithmetic over a fixed grammar. The query text is tokenized, parsed
//! into an [`Expr`] tree and evaluated; nothing else is ever interpreted.
//!
//! Integer literals stay integers, `/` always produces a float, `//`
//! floors and `%` takes the sign of the divisor.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use thiserror::Error;

use super::Tool;
use crate::consts::{MAX_EXPRESSION_LEN, MAX_INT_BITS};

const TRIGGER: &str = "calculate";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("expression too long (max {0} characters)")]
    TooLong(usize),
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parentheses")]
    Unbalanced,
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer result too large (over {bits} bits)", bits = MAX_INT_BITS)]
    TooLarge,
    #[error("numerical result out of range")]
    OutOfRange,
    #[error("complex results are not supported")]
    Complex,
}

/// A value is either an exact integer of any size or a float.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(BigInt),
    Float(f64),
}

impl Number {
    pub fn int(i: i64) -> Self {
        Number::Int(BigInt::from(i))
    }

    /// Float view of the value. Integers beyond `f64` range are an error.
    fn to_float(&self) -> Result<f64, CalcError> {
        match self {
            Number::Int(i) => i
                .to_f64()
                .filter(|x| x.is_finite())
                .ok_or(CalcError::OutOfRange),
            Number::Float(x) => Ok(*x),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => i.is_zero(),
            Number::Float(x) => *x == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Shortest round-trip digits. Fixed notation for exponents in `-4..16`,
/// otherwise scientific with a signed two-digit exponent (`1e+16`).
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", x);
    if let Some((mantissa, exp)) = sci.split_once('e')
        && let Ok(exp) = exp.parse::<i32>()
        && !(-4..16).contains(&exp)
    {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }

    let fixed = format!("{}", x);
    if fixed.contains('.') {
        fixed
    } else {
        format!("{}.0", fixed)
    }
}

fn checked_int(value: BigInt) -> Result<Number, CalcError> {
    if value.bits() > MAX_INT_BITS {
        return Err(CalcError::TooLarge);
    }
    Ok(Number::Int(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(Number),
    Neg(Box<Expr>),
    Pos(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn eval(&self) -> Result<Number, CalcError> {
        match self {
            Expr::Num(n) => Ok(n.clone()),
            Expr::Pos(inner) => inner.eval(),
            Expr::Neg(inner) => match inner.eval()? {
                Number::Int(i) => Ok(Number::Int(-i)),
                Number::Float(x) => Ok(Number::Float(-x)),
            },
            Expr::Binary { op, lhs, rhs } => apply(*op, &lhs.eval()?, &rhs.eval()?),
        }
    }
}

fn apply(op: BinOp, lhs: &Number, rhs: &Number) -> Result<Number, CalcError> {
    use Number::{Float, Int};

    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul => match (lhs, rhs) {
            (Int(a), Int(b)) => match op {
                BinOp::Add => checked_int(a + b),
                BinOp::Sub => checked_int(a - b),
                _ => {
                    if a.bits() + b.bits() > MAX_INT_BITS + 1 {
                        return Err(CalcError::TooLarge);
                    }
                    checked_int(a * b)
                }
            },
            _ => {
                let (a, b) = (lhs.to_float()?, rhs.to_float()?);
                Ok(Float(match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    _ => a * b,
                }))
            }
        },
        BinOp::Div => {
            if rhs.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            Ok(Float(lhs.to_float()? / rhs.to_float()?))
        }
        BinOp::FloorDiv => {
            if rhs.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            match (lhs, rhs) {
                (Int(a), Int(b)) => Ok(Int(a.div_floor(b))),
                _ => Ok(Float((lhs.to_float()? / rhs.to_float()?).floor())),
            }
        }
        BinOp::Mod => {
            if rhs.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            match (lhs, rhs) {
                (Int(a), Int(b)) => Ok(Int(a.mod_floor(b))),
                _ => {
                    let (a, b) = (lhs.to_float()?, rhs.to_float()?);
                    let r = a % b;
                    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                        Ok(Float(r + b))
                    } else {
                        Ok(Float(r))
                    }
                }
            }
        }
        BinOp::Pow => match (lhs, rhs) {
            (Int(base), Int(exp)) if !exp.is_negative() => int_pow(base, exp),
            _ => {
                let (base, exp) = (lhs.to_float()?, rhs.to_float()?);
                if base == 0.0 && exp < 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                if base < 0.0 && exp.fract() != 0.0 {
                    return Err(CalcError::Complex);
                }
                let result = base.powf(exp);
                if result.is_infinite() && base.is_finite() && exp.is_finite() {
                    return Err(CalcError::OutOfRange);
                }
                Ok(Float(result))
            }
        },
    }
}

/// Exact integer power. Bases 0, 1 and -1 never grow, so any exponent is
/// fine for them; otherwise the result size is bounded before computing.
fn int_pow(base: &BigInt, exp: &BigInt) -> Result<Number, CalcError> {
    if exp.is_zero() || base.is_one() {
        return Ok(Number::Int(BigInt::one()));
    }
    if base.is_zero() {
        return Ok(Number::Int(BigInt::zero()));
    }
    if *base == BigInt::from(-1) {
        let value = if exp.is_even() { 1 } else { -1 };
        return Ok(Number::int(value));
    }

    let exp = exp
        .to_u32()
        .filter(|&e| (base.bits() - 1).saturating_mul(u64::from(e)) <= MAX_INT_BITS)
        .ok_or(CalcError::TooLarge)?;
    checked_int(base.pow(exp))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::DoubleSlash => f.write_str("//"),
            Token::Percent => f.write_str("%"),
            Token::Power => f.write_str("**"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let (number, next) = scan_number(&chars, i)?;
                tokens.push(Token::Number(number));
                i = next;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Power);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(CalcError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

/// Scan a numeric literal starting at `start`. Returns the value and the
/// index just past it.
fn scan_number(chars: &[char], start: usize) -> Result<(Number, usize), CalcError> {
    let mut i = start;
    let mut is_float = false;

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        is_float = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Exponent only when digits actually follow, so "2e" stays an error.
    if i < chars.len() && chars[i] == 'e' {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            is_float = true;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    let literal: String = chars[start..i].iter().collect();
    if literal == "." {
        return Err(CalcError::InvalidNumber(literal));
    }

    let number = if is_float {
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| CalcError::InvalidNumber(literal.clone()))?
    } else {
        literal
            .parse::<BigInt>()
            .map(Number::Int)
            .map_err(|_| CalcError::InvalidNumber(literal.clone()))?
    };

    Ok((number, i))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse(mut self) -> Result<Expr, CalcError> {
        if self.tokens.is_empty() {
            return Err(CalcError::Empty);
        }
        let expr = self.expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(Token::RParen) => Err(CalcError::Unbalanced),
            Some(token) => Err(CalcError::UnexpectedToken(token.to_string())),
        }
    }

    fn expr(&mut self) -> Result<Expr, CalcError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr, CalcError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::DoubleSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                Ok(Expr::Pos(Box::new(self.unary()?)))
            }
            _ => self.power(),
        }
    }

    // Right associative; the exponent may carry its own sign.
    fn power(&mut self) -> Result<Expr, CalcError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Power) {
            self.pos += 1;
            let exp = self.unary()?;
            return Ok(binary(BinOp::Pow, base, exp));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, CalcError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Num(n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    None => Err(CalcError::Unbalanced),
                    Some(token) => Err(CalcError::UnexpectedToken(token.to_string())),
                }
            }
            Some(Token::RParen) => Err(CalcError::Unbalanced),
            Some(token) => Err(CalcError::UnexpectedToken(token.to_string())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Parse an arithmetic expression into a tree without evaluating it.
pub fn parse(expression: &str) -> Result<Expr, CalcError> {
    if expression.chars().count() > MAX_EXPRESSION_LEN {
        return Err(CalcError::TooLong(MAX_EXPRESSION_LEN));
    }
    let tokens = tokenize(expression)?;
    Parser { tokens, pos: 0 }.parse()
}

pub fn evaluate(expression: &str) -> Result<Number, CalcError> {
    parse(expression)?.eval()
}

/// Pull the expression out of a query: every "calculate" removed,
/// surrounding whitespace trimmed.
pub fn extract_expression(query: &str) -> String {
    query.to_lowercase().replace(TRIGGER, "").trim().to_string()
}

/// Answer a calculator query. Failures come back as text.
pub fn calculate(query: &str) -> String {
    let expression = extract_expression(query);
    match evaluate(&expression) {
        Ok(value) => format!("The result is: {}", value),
        Err(e) => format!("Error in calculation: {}", e),
    }
}

pub struct Calculator;

impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn trigger(&self) -> &str {
        TRIGGER
    }

    fn execute(&self, query: &str) -> String {
        calculate(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> Number {
        evaluate(s).unwrap()
    }

    #[test]
    fn adds_integers() {
        assert_eq!(calculate("calculate 2 + 2"), "The result is: 4");
    }

    #[test]
    fn trigger_is_case_insensitive() {
        assert_eq!(calculate("CALCULATE 3*4"), "The result is: 12");
    }

    #[test]
    fn division_by_zero_is_reported() {
        let out = calculate("calculate 10 / 0");
        assert!(out.starts_with("Error in calculation:"), "{}", out);
        assert!(out.contains("division by zero"));
    }

    #[test]
    fn true_division_yields_float() {
        assert_eq!(calculate("calculate 10 / 2"), "The result is: 5.0");
        assert_eq!(calculate("calculate 7 / 2"), "The result is: 3.5");
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("2 + 3 * 4"), Number::int(14));
        assert_eq!(eval("(2 + 3) * 4"), Number::int(20));
        assert_eq!(eval("10 - 4 - 3"), Number::int(3));
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(eval("2 ** 3 ** 2"), Number::int(512));
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        assert_eq!(eval("-2 ** 2"), Number::int(-4));
        assert_eq!(eval("(-2) ** 2"), Number::int(4));
    }

    #[test]
    fn negative_exponent_yields_float() {
        assert_eq!(eval("2 ** -1"), Number::Float(0.5));
    }

    #[test]
    fn floor_division_rounds_down() {
        assert_eq!(eval("7 // 2"), Number::int(3));
        assert_eq!(eval("-7 // 2"), Number::int(-4));
        assert_eq!(eval("7.5 // 2"), Number::Float(3.0));
    }

    #[test]
    fn modulo_takes_divisor_sign() {
        assert_eq!(eval("7 % 3"), Number::int(1));
        assert_eq!(eval("-7 % 3"), Number::int(2));
        assert_eq!(eval("7 % -3"), Number::int(-2));
    }

    #[test]
    fn float_literals() {
        assert_eq!(eval("1.5 + 1"), Number::Float(2.5));
        assert_eq!(eval(".5 * 4"), Number::Float(2.0));
        assert_eq!(eval("1e3"), Number::Float(1000.0));
    }

    #[test]
    fn every_zero_divisor_fails() {
        for expr in ["1 / 0", "1 // 0", "1 % 0", "1.0 / 0.0", "0 ** -1"] {
            assert_eq!(evaluate(expr), Err(CalcError::DivisionByZero), "{}", expr);
        }
    }

    #[test]
    fn rejects_names_and_calls() {
        assert_eq!(
            evaluate("__import__('os')"),
            Err(CalcError::UnexpectedChar('_'))
        );
        assert!(matches!(evaluate("abs(1)"), Err(CalcError::UnexpectedChar('a'))));
    }

    #[test]
    fn malformed_syntax() {
        assert_eq!(evaluate(""), Err(CalcError::Empty));
        assert_eq!(evaluate("2 +"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(CalcError::Unbalanced));
        assert_eq!(evaluate("1 + 2)"), Err(CalcError::Unbalanced));
        assert!(matches!(evaluate("2 3"), Err(CalcError::UnexpectedToken(_))));
        assert!(matches!(evaluate("* 2"), Err(CalcError::UnexpectedToken(_))));
    }

    #[test]
    fn integers_grow_past_64_bits() {
        assert_eq!(
            calculate("calculate 2 ** 64"),
            "The result is: 18446744073709551616"
        );
        assert_eq!(
            calculate("calculate 9223372036854775807 + 1"),
            "The result is: 9223372036854775808"
        );
        assert_eq!(
            calculate("calculate -9223372036854775808 // -1"),
            "The result is: 9223372036854775808"
        );
        assert_eq!(
            calculate("calculate 123456789012345678901234567891 % 7"),
            "The result is: 1"
        );
    }

    #[test]
    fn unit_bases_take_any_exponent() {
        assert_eq!(calculate("calculate 1 ** 10000000000"), "The result is: 1");
        assert_eq!(calculate("calculate 0 ** 10000000000"), "The result is: 0");
        assert_eq!(calculate("calculate (-1) ** 10000000001"), "The result is: -1");
        assert_eq!(calculate("calculate 5 ** 0"), "The result is: 1");
    }

    #[test]
    fn huge_powers_are_refused() {
        assert_eq!(evaluate("9 ** 9 ** 9"), Err(CalcError::TooLarge));
        assert_eq!(evaluate("2 ** 10000000000"), Err(CalcError::TooLarge));
        assert_eq!(
            calculate("calculate 2 ** 100000"),
            "Error in calculation: integer result too large (over 16384 bits)"
        );
    }

    #[test]
    fn power_at_the_size_limit() {
        let value = eval("2 ** 16383");
        assert!(matches!(value, Number::Int(ref i) if i.bits() == 16384));
    }

    #[test]
    fn big_integer_to_float_out_of_range() {
        assert_eq!(evaluate("2 ** 2000 / 3"), Err(CalcError::OutOfRange));
    }

    #[test]
    fn float_power_out_of_range() {
        assert_eq!(evaluate("10.0 ** 400"), Err(CalcError::OutOfRange));
    }

    #[test]
    fn too_long_rejected() {
        let long = "1+".repeat(600) + "1";
        assert_eq!(
            evaluate(&long),
            Err(CalcError::TooLong(MAX_EXPRESSION_LEN))
        );
    }

    #[test]
    fn parse_builds_tree() {
        let tree = parse("1 + 2").unwrap();
        assert_eq!(
            tree,
            Expr::Binary {
                op: BinOp::Add,
                lhs: Box::new(Expr::Num(Number::int(1))),
                rhs: Box::new(Expr::Num(Number::int(2))),
            }
        );
    }

    #[test]
    fn number_display() {
        assert_eq!(Number::int(-3).to_string(), "-3");
        assert_eq!(Number::Float(2.0).to_string(), "2.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
        assert_eq!(Number::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Number::Float(f64::NAN).to_string(), "nan");
    }

    #[test]
    fn float_exponent_form() {
        assert_eq!(calculate("calculate 10.0 ** 16"), "The result is: 1e+16");
        assert_eq!(Number::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Number::Float(1.5e-5).to_string(), "1.5e-05");
        assert_eq!(Number::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Number::Float(-2.5e300).to_string(), "-2.5e+300");
        assert_eq!(Number::Float(-0.0).to_string(), "-0.0");
    }

    #[test]
    fn extraction_strips_every_trigger() {
        assert_eq!(extract_expression("  Calculate 1+1 calculate "), "1+1");
    }
}
