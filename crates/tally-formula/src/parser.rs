//! Formula parser
//!
//! A recursive descent parser for plain arithmetic with conventional
//! precedence.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};

/// Nesting limit used by [`parse_expression`]
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parse an arithmetic string into an AST
///
/// # Example
/// ```rust
/// use tally_formula::{parse_expression, Expr};
///
/// let ast = parse_expression("1 + 2 * 3").unwrap();
/// let ast = parse_expression("-(4 ^ 0.5)").unwrap();
/// assert_eq!(parse_expression("42").unwrap(), Expr::Number(42.0));
/// ```
pub fn parse_expression(input: &str) -> FormulaResult<Expr> {
    parse_expression_with_depth(input, DEFAULT_MAX_DEPTH)
}

/// Parse with an explicit limit on parenthesis/unary nesting
pub fn parse_expression_with_depth(input: &str, max_depth: usize) -> FormulaResult<Expr> {
    let mut parser = FormulaParser::new(input, max_depth)?;
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if *parser.current_token() != Token::Eof {
        return Err(FormulaError::malformed(format!(
            "unexpected {} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    LeftParen,
    RightParen,

    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {n}"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Caret => f.write_str("'^'"),
            Token::LeftParen => f.write_str("'('"),
            Token::RightParen => f.write_str("')'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    depth: usize,
    max_depth: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str, max_depth: usize) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            depth: 0,
            max_depth,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            c if c.is_ascii_digit() || c == '.' => return self.scan_number(),
            c => {
                return Err(FormulaError::InvalidCharacters(c));
            }
        };
        self.advance();
        Ok(token)
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::malformed(format!("invalid number '{num_str}'")))
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::malformed(format!(
                "expected {}, got {}",
                expected,
                self.current_token()
            )))
        }
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::malformed(format!(
                "expression nested more than {} levels deep",
                self.max_depth
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -      (left associative, flat chain)
    // 2. Multiplication/Division: *, /   (left associative, flat chain)
    // 3. Unary: -, +
    // 4. Exponentiation: ^               (right associative)
    // 5. Primary: numbers, parentheses
    //
    // Unary minus sits below '^', so -2^2 is -(2^2). The exponent itself
    // is parsed at unary level, which admits 2^-1.

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let first = self.parse_multiplicative()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            rest.push((op, self.parse_multiplicative()?));
        }

        Ok(Expr::chain(first, rest))
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let first = self.parse_unary()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            rest.push((op, self.parse_unary()?));
        }

        Ok(Expr::chain(first, rest))
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_power(),
        };

        self.consume()?;
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::unary(op, operand))
    }

    fn parse_power(&mut self) -> FormulaResult<Expr> {
        let base = self.parse_primary()?;

        if matches!(self.current_token(), Token::Caret) {
            self.consume()?;
            self.enter()?;
            let exponent = self.parse_unary()?; // Right associative
            self.leave();
            return Ok(Expr::binary(BinaryOperator::Power, base, exponent));
        }

        Ok(base)
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(Expr::Number(n))
            }

            Token::LeftParen => {
                self.consume()?;
                self.enter()?;
                let expr = self.parse_expression()?;
                self.leave();
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            token => Err(FormulaError::malformed(format!("expected a number, got {token}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_expression("42").unwrap(), num(42.0));
        assert_eq!(parse_expression("2.75").unwrap(), num(2.75));
        assert_eq!(parse_expression(".5").unwrap(), num(0.5));
        assert_eq!(parse_expression("5.").unwrap(), num(5.0));
        assert_eq!(parse_expression("  7  ").unwrap(), num(7.0));
    }

    #[test]
    fn test_parse_invalid_numbers() {
        assert!(matches!(
            parse_expression("."),
            Err(FormulaError::MalformedExpression(_))
        ));
        assert!(matches!(
            parse_expression("1.2.3"),
            Err(FormulaError::MalformedExpression(_))
        ));
        assert!(matches!(
            parse_expression("1 2"),
            Err(FormulaError::MalformedExpression(_))
        ));
    }

    #[test]
    fn test_parse_precedence() {
        // 1+(2*3)
        assert_eq!(
            parse_expression("1+2*3").unwrap(),
            Expr::chain(
                num(1.0),
                vec![(
                    BinaryOperator::Add,
                    Expr::chain(num(2.0), vec![(BinaryOperator::Multiply, num(3.0))])
                )]
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        // (8-3)-2, kept as one flat run
        assert_eq!(
            parse_expression("8-3-2").unwrap(),
            Expr::chain(
                num(8.0),
                vec![
                    (BinaryOperator::Subtract, num(3.0)),
                    (BinaryOperator::Subtract, num(2.0)),
                ]
            )
        );
    }

    #[test]
    fn test_parse_power_right_associative() {
        // 2^(3^2)
        assert_eq!(
            parse_expression("2^3^2").unwrap(),
            Expr::binary(
                BinaryOperator::Power,
                num(2.0),
                Expr::binary(BinaryOperator::Power, num(3.0), num(2.0))
            )
        );
    }

    #[test]
    fn test_parse_unary_below_power() {
        // -(2^2)
        assert_eq!(
            parse_expression("-2^2").unwrap(),
            Expr::unary(
                UnaryOperator::Negate,
                Expr::binary(BinaryOperator::Power, num(2.0), num(2.0))
            )
        );
        // 2^(-1)
        assert_eq!(
            parse_expression("2^-1").unwrap(),
            Expr::binary(
                BinaryOperator::Power,
                num(2.0),
                Expr::unary(UnaryOperator::Negate, num(1.0))
            )
        );
    }

    #[test]
    fn test_parse_unary_chain() {
        assert_eq!(
            parse_expression("--3").unwrap(),
            Expr::unary(
                UnaryOperator::Negate,
                Expr::unary(UnaryOperator::Negate, num(3.0))
            )
        );
        assert_eq!(
            parse_expression("+3").unwrap(),
            Expr::unary(UnaryOperator::Plus, num(3.0))
        );
    }

    #[test]
    fn test_parse_parentheses() {
        assert_eq!(
            parse_expression("(1+2)*3").unwrap(),
            Expr::chain(
                Expr::chain(num(1.0), vec![(BinaryOperator::Add, num(2.0))]),
                vec![(BinaryOperator::Multiply, num(3.0))]
            )
        );
    }

    #[test]
    fn test_parse_missing_operand() {
        for input in ["", "3 +", "* 3", "()", "(1+)", "2(3)", "(1)(2)", "3 ^"] {
            assert!(
                matches!(
                    parse_expression(input),
                    Err(FormulaError::MalformedExpression(_))
                ),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_rejects_other_characters() {
        assert_eq!(
            parse_expression("1 % 2"),
            Err(FormulaError::InvalidCharacters('%'))
        );
    }

    #[test]
    fn test_parse_depth_limit() {
        let nested = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse_expression_with_depth(&nested, 10).is_ok());
        assert!(matches!(
            parse_expression_with_depth(&nested, 9),
            Err(FormulaError::MalformedExpression(_))
        ));

        let negations = format!("{}1", "-".repeat(100));
        assert!(parse_expression(&negations).is_err());
        assert!(parse_expression_with_depth(&negations, 100).is_ok());

        let powers = format!("2{}", "^2".repeat(100));
        assert!(matches!(
            parse_expression(&powers),
            Err(FormulaError::MalformedExpression(_))
        ));
    }

    #[test]
    fn test_parse_long_flat_chain() {
        // Width is not nesting: a long run stays one level deep
        let sum = format!("1{}", "+1".repeat(100_000));
        match parse_expression(&sum).unwrap() {
            Expr::Chain { first, rest } => {
                assert_eq!(*first, num(1.0));
                assert_eq!(rest.len(), 100_000);
            }
            other => panic!("expected a chain, got {other:?}"),
        }
    }
}
