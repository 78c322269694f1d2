//! Search expression tree.

use std::fmt;

use super::lexer::is_ident_char;

/// A parsed boolean search expression.
///
/// Trees are built fresh by every parse and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexpr {
    /// Bare keyword matched against the annotation tag list: `climate`
    Tag(String),
    /// Attribute equality test: `creator:"jane@example.org"`
    Field { name: String, value: String },
    And(Box<Sexpr>, Box<Sexpr>),
    Or(Box<Sexpr>, Box<Sexpr>),
    Not(Box<Sexpr>),
}

impl Sexpr {
    pub fn tag(term: &str) -> Self {
        Sexpr::Tag(term.to_string())
    }

    pub fn field(name: &str, value: &str) -> Self {
        Sexpr::Field {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn and(left: Sexpr, right: Sexpr) -> Self {
        Sexpr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Sexpr, right: Sexpr) -> Self {
        Sexpr::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Sexpr) -> Self {
        Sexpr::Not(Box::new(inner))
    }
}

/// Write a term, quoting it when it would not lex back as one bare word.
fn write_term(f: &mut fmt::Formatter<'_>, term: &str) -> fmt::Result {
    let bare = !term.is_empty()
        && term.chars().all(is_ident_char)
        && !matches!(term.to_ascii_uppercase().as_str(), "AND" | "OR" | "NOT");
    if bare {
        f.write_str(term)
    } else {
        write!(f, "\"{}\"", term.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Canonical, fully parenthesised rendering; parses back to an equal tree.
impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexpr::Tag(term) => write_term(f, term),
            Sexpr::Field { name, value } => {
                f.write_str(name)?;
                f.write_str(":")?;
                write_term(f, value)
            }
            Sexpr::And(left, right) => write!(f, "({left} AND {right})"),
            Sexpr::Or(left, right) => write!(f, "({left} OR {right})"),
            Sexpr::Not(inner) if matches!(**inner, Sexpr::Not(_)) => write!(f, "NOT ({inner})"),
            Sexpr::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_parenthesised() {
        let tree = Sexpr::or(
            Sexpr::and(Sexpr::tag("a"), Sexpr::not(Sexpr::tag("b"))),
            Sexpr::field("creator", "jane@example.org"),
        );
        assert_eq!(tree.to_string(), "((a AND NOT b) OR creator:jane@example.org)");
    }

    #[test]
    fn test_display_quotes_when_needed() {
        assert_eq!(Sexpr::tag("two words").to_string(), r#""two words""#);
        assert_eq!(Sexpr::tag("or").to_string(), r#""or""#);
        assert_eq!(Sexpr::field("body", r#"say "hi""#).to_string(), r#"body:"say \"hi\"""#);
    }

    #[test]
    fn test_display_double_negation() {
        let tree = Sexpr::not(Sexpr::not(Sexpr::tag("a")));
        assert_eq!(tree.to_string(), "NOT (NOT a)");
    }
}
