//! Recursive-descent parser for search expressions.
//!
//! Parses queries like `tag:climate AND NOT creator:"jane@example.org"` into
//! a [`Sexpr`] tree. Precedence from lowest to highest is `OR`, `AND`, `NOT`;
//! binary operators are left-associative and adjacent terms are never
//! implicitly combined.

use thiserror::Error;

use super::lexer::{tokenize, Token, TokenKind};
use super::sexpr::Sexpr;

/// Maximum tree depth and parenthesis/NOT nesting accepted by the parser.
pub const MAX_DEPTH: usize = 128;

/// Maximum number of terms in one expression.
pub const MAX_TERMS: usize = 1024;

/// A grammar error with the character offset of the offending token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (at offset {offset})")]
pub struct SyntaxError {
    pub message: String,
    /// 0-based character offset into the expression
    pub offset: usize,
}

impl SyntaxError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Outcome of a parse: a tree or a syntax error, never both.
pub type ParseResult = std::result::Result<Sexpr, SyntaxError>;

/// Parse a search expression.
///
/// # Examples
///
/// ```
/// use annosearch::search::{parse, Sexpr};
///
/// let tree = parse("a AND b OR c").unwrap();
/// assert_eq!(
///     tree,
///     Sexpr::or(Sexpr::and(Sexpr::tag("a"), Sexpr::tag("b")), Sexpr::tag("c"))
/// );
/// ```
pub fn parse(expression: &str) -> ParseResult {
    Parser::new(tokenize(expression)).parse_expression()
}

/// A subtree together with its depth.
struct Node {
    expr: Sexpr,
    depth: usize,
}

impl Node {
    fn leaf(expr: Sexpr) -> Self {
        Node { expr, depth: 1 }
    }
}

type ParseStep = std::result::Result<Node, SyntaxError>;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    terms: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            terms: 0,
        }
    }

    fn count_term(&mut self, offset: usize) -> std::result::Result<(), SyntaxError> {
        self.terms += 1;
        if self.terms > MAX_TERMS {
            return Err(SyntaxError::new(
                format!("expression has too many terms (limit {MAX_TERMS})"),
                offset,
            ));
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn parse_expression(mut self) -> ParseResult {
        if self.peek().kind == TokenKind::Eof {
            return Err(SyntaxError::new("empty expression", 0));
        }

        let node = self.parse_or(0, "at start of expression")?;

        let token = self.peek();
        match &token.kind {
            TokenKind::Eof => Ok(node.expr),
            TokenKind::RParen => Err(SyntaxError::new("unmatched ')'", token.offset)),
            TokenKind::Invalid(message) => Err(SyntaxError::new(message.clone(), token.offset)),
            TokenKind::Ident(_) | TokenKind::Str(_) | TokenKind::LParen | TokenKind::Not => Err(
                SyntaxError::new(
                    format!("expected AND or OR between terms, found {}", token.describe()),
                    token.offset,
                ),
            ),
            _ => Err(SyntaxError::new(
                format!("unexpected {}", token.describe()),
                token.offset,
            )),
        }
    }

    fn parse_or(&mut self, nesting: usize, context: &str) -> ParseStep {
        let mut left = self.parse_and(nesting, context)?;
        while self.peek().kind == TokenKind::Or {
            let op = self.advance();
            let right = self.parse_and(nesting, "after OR")?;
            left = combine(Sexpr::or, left, right, &op)?;
        }
        Ok(left)
    }

    fn parse_and(&mut self, nesting: usize, context: &str) -> ParseStep {
        let mut left = self.parse_not(nesting, context)?;
        while self.peek().kind == TokenKind::And {
            let op = self.advance();
            let right = self.parse_not(nesting, "after AND")?;
            left = combine(Sexpr::and, left, right, &op)?;
        }
        Ok(left)
    }

    fn parse_not(&mut self, nesting: usize, context: &str) -> ParseStep {
        if self.peek().kind != TokenKind::Not {
            return self.parse_primary(nesting, context);
        }

        let op = self.advance();
        check_nesting(nesting + 1, op.offset)?;
        let inner = self.parse_primary(nesting + 1, "after NOT")?;
        check_tree_depth(inner.depth + 1, op.offset)?;
        Ok(Node {
            depth: inner.depth + 1,
            expr: Sexpr::not(inner.expr),
        })
    }

    fn parse_primary(&mut self, nesting: usize, context: &str) -> ParseStep {
        let token = self.advance();
        match token.kind {
            TokenKind::LParen => {
                check_nesting(nesting + 1, token.offset)?;
                let inner = self.parse_or(nesting + 1, "after '('")?;
                let close = self.advance();
                match close.kind {
                    TokenKind::RParen => Ok(inner),
                    TokenKind::Invalid(message) => Err(SyntaxError::new(message, close.offset)),
                    _ => Err(SyntaxError::new(
                        format!(
                            "expected ')' to close '(' at offset {}, found {}",
                            token.offset,
                            close.describe()
                        ),
                        close.offset,
                    )),
                }
            }
            TokenKind::Ident(name) => {
                self.count_term(token.offset)?;
                if self.peek().kind == TokenKind::Colon {
                    self.advance();
                    let value = self.parse_value(&name)?;
                    Ok(Node::leaf(Sexpr::Field { name, value }))
                } else {
                    Ok(Node::leaf(Sexpr::Tag(name)))
                }
            }
            TokenKind::Str(term) => {
                self.count_term(token.offset)?;
                Ok(Node::leaf(Sexpr::Tag(term)))
            }
            TokenKind::Invalid(message) => Err(SyntaxError::new(message, token.offset)),
            _ => Err(SyntaxError::new(
                format!("expected term {}, found {}", context, token.describe()),
                token.offset,
            )),
        }
    }

    fn parse_value(&mut self, field: &str) -> std::result::Result<String, SyntaxError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(value) | TokenKind::Str(value) => Ok(value),
            TokenKind::Invalid(message) => Err(SyntaxError::new(message, token.offset)),
            _ => Err(SyntaxError::new(
                format!("expected value after '{}:', found {}", field, token.describe()),
                token.offset,
            )),
        }
    }
}

/// Parenthesis and NOT nesting.
fn check_nesting(nesting: usize, offset: usize) -> std::result::Result<(), SyntaxError> {
    if nesting > MAX_DEPTH {
        Err(SyntaxError::new(
            format!("expression nested too deeply (limit {MAX_DEPTH})"),
            offset,
        ))
    } else {
        Ok(())
    }
}

/// Depth of the built tree; each chained AND/OR adds a level.
fn check_tree_depth(depth: usize, offset: usize) -> std::result::Result<(), SyntaxError> {
    if depth > MAX_DEPTH {
        Err(SyntaxError::new(
            format!(
                "expression too long (limit {MAX_DEPTH} operator levels); \
                 group terms with parentheses"
            ),
            offset,
        ))
    } else {
        Ok(())
    }
}

fn combine(build: fn(Sexpr, Sexpr) -> Sexpr, left: Node, right: Node, op: &Token) -> ParseStep {
    let depth = left.depth.max(right.depth) + 1;
    check_tree_depth(depth, op.offset)?;
    Ok(Node {
        expr: build(left.expr, right.expr),
        depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(input: &str) -> SyntaxError {
        parse(input).expect_err("expected a syntax error")
    }

    #[test]
    fn test_single_tag() {
        assert_eq!(parse("climate").unwrap(), Sexpr::tag("climate"));
        assert_eq!(parse(r#""sea level""#).unwrap(), Sexpr::tag("sea level"));
    }

    #[test]
    fn test_field_term() {
        assert_eq!(
            parse(r#"creator:"jane@example.org""#).unwrap(),
            Sexpr::field("creator", "jane@example.org")
        );
        assert_eq!(parse("tag:climate").unwrap(), Sexpr::field("tag", "climate"));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            parse("a AND b OR c").unwrap(),
            Sexpr::or(Sexpr::and(Sexpr::tag("a"), Sexpr::tag("b")), Sexpr::tag("c"))
        );
        assert_eq!(
            parse("a OR b AND c").unwrap(),
            Sexpr::or(Sexpr::tag("a"), Sexpr::and(Sexpr::tag("b"), Sexpr::tag("c")))
        );
    }

    #[test]
    fn test_not_binds_tightest() {
        assert_eq!(
            parse("NOT a AND b").unwrap(),
            Sexpr::and(Sexpr::not(Sexpr::tag("a")), Sexpr::tag("b"))
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            parse("a OR b OR c").unwrap(),
            Sexpr::or(Sexpr::or(Sexpr::tag("a"), Sexpr::tag("b")), Sexpr::tag("c"))
        );
        assert_eq!(
            parse("a and b and c").unwrap(),
            Sexpr::and(Sexpr::and(Sexpr::tag("a"), Sexpr::tag("b")), Sexpr::tag("c"))
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(
            parse("a AND (b OR c)").unwrap(),
            Sexpr::and(Sexpr::tag("a"), Sexpr::or(Sexpr::tag("b"), Sexpr::tag("c")))
        );
        assert_eq!(
            parse("NOT (a OR b)").unwrap(),
            Sexpr::not(Sexpr::or(Sexpr::tag("a"), Sexpr::tag("b")))
        );
    }

    #[test]
    fn test_end_to_end_example() {
        assert_eq!(
            parse(r#"tag:climate AND NOT creator:"jane@example.org""#).unwrap(),
            Sexpr::and(
                Sexpr::field("tag", "climate"),
                Sexpr::not(Sexpr::field("creator", "jane@example.org"))
            )
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = r#"(a OR b:"x y") AND NOT c OR d"#;
        assert_eq!(parse(input), parse(input));
    }

    #[test]
    fn test_display_parses_back() {
        let tree = parse(r#"(a OR body:"x \"y\"") AND NOT c OR "and""#).unwrap();
        assert_eq!(parse(&tree.to_string()).unwrap(), tree);
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(err("").message, "empty expression");
        assert_eq!(err("   ").message, "empty expression");
    }

    #[test]
    fn test_trailing_operator() {
        let e = err("a AND");
        assert_eq!(e.message, "expected term after AND, found end of input");
        assert_eq!(e.offset, 5);
    }

    #[test]
    fn test_leading_operator() {
        let e = err("AND a");
        assert!(e.message.starts_with("expected term at start of expression"));
        assert_eq!(e.offset, 0);
    }

    #[test]
    fn test_unclosed_paren() {
        let e = err("(a");
        assert!(e.message.starts_with("expected ')'"));
        assert_eq!(e.offset, 2);
    }

    #[test]
    fn test_unmatched_close_paren() {
        let e = err("a)");
        assert_eq!(e.message, "unmatched ')'");
        assert_eq!(e.offset, 1);
    }

    #[test]
    fn test_adjacent_terms_require_operator() {
        let e = err("climate rain");
        assert!(e.message.starts_with("expected AND or OR between terms"));
        assert_eq!(e.offset, 8);
    }

    #[test]
    fn test_double_not_requires_parentheses() {
        let e = err("NOT NOT a");
        assert_eq!(e.message, "expected term after NOT, found NOT");
        assert_eq!(e.offset, 4);
        assert!(parse("NOT (NOT a)").is_ok());
    }

    #[test]
    fn test_missing_field_value() {
        let e = err("creator: AND a");
        assert!(e.message.starts_with("expected value after 'creator:'"));
        assert_eq!(e.offset, 9);
    }

    #[test]
    fn test_empty_parentheses() {
        let e = err("()");
        assert_eq!(e.message, "expected term after '(', found ')'");
        assert_eq!(e.offset, 1);
    }

    #[test]
    fn test_lexical_error_surfaces_with_offset() {
        let e = err("a AND ;");
        assert!(e.message.contains("unexpected character"));
        assert_eq!(e.offset, 6);

        let e = err(r#"a OR "open"#);
        assert_eq!(e.message, "unterminated string literal");
        assert_eq!(e.offset, 5);
    }

    #[test]
    fn test_deep_parentheses_rejected() {
        let depth = MAX_DEPTH + 1;
        let input = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        let e = err(&input);
        assert!(e.message.contains("nested too deeply"));
        assert_eq!(e.offset, MAX_DEPTH);
    }

    #[test]
    fn test_long_chain_rejected() {
        let input = vec!["a"; MAX_DEPTH + 1].join(" AND ");
        let e = err(&input);
        assert!(e.message.starts_with("expression too long"), "{}", e.message);
        assert!(!e.message.contains("nested"));
        // Offset of the AND that pushes the chain over the limit.
        assert_eq!(e.offset, (MAX_DEPTH - 1) * 6 + 2);

        let input = vec!["a"; MAX_DEPTH].join(" AND ");
        assert!(parse(&input).is_ok());
    }

    /// `n` distinct terms in OR-joined groups of 100, shallow enough to
    /// stay under the depth limit.
    fn grouped_terms(n: usize) -> String {
        let names: Vec<String> = (0..n).map(|i| format!("t{i:04}")).collect();
        names
            .chunks(100)
            .map(|group| format!("({})", group.join(" OR ")))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    #[test]
    fn test_term_count_limit() {
        assert!(parse(&grouped_terms(MAX_TERMS)).is_ok());

        let input = grouped_terms(MAX_TERMS + 1);
        let e = err(&input);
        assert_eq!(e.message, format!("expression has too many terms (limit {MAX_TERMS})"));
        assert_eq!(Some(e.offset), input.find("t1024"));
    }

    #[test]
    fn test_term_limit_counts_field_terms_and_strings() {
        let mut terms: Vec<String> = (0..MAX_TERMS).map(|i| format!("tag:t{i}")).collect();
        terms.push("\"one more\"".to_string());
        let input = terms
            .chunks(100)
            .map(|group| format!("({})", group.join(" AND ")))
            .collect::<Vec<_>>()
            .join(" AND ");
        let e = err(&input);
        assert!(e.message.contains("too many terms"));
        assert_eq!(Some(e.offset), input.find("\"one more\""));
    }
}
