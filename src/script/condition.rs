//! Chunk guard conditions (`{!__replaying && !__recording}`).
//!
//! Grammar: `term ("&&" term)*`, where `term = "!"? ident` and identifiers are ASCII letters, digits and `_`, not
//! starting with a digit. A condition is true when every term holds against the set of active flags.

use std::collections::BTreeSet;

/// One possibly negated flag test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub flag: String,
    pub negated: bool,
}

/// Conjunction of flag tests guarding a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub terms: Vec<Term>,
}

impl Condition {
    pub fn evaluate(&self, flags: &BTreeSet<String>) -> bool {
        self.terms.iter().all(|t| flags.contains(&t.flag) != t.negated)
    }
}

/// Condition syntax error: offset (relative to the condition text), length, and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSyntaxError {
    pub offset: usize,
    pub len: usize,
    pub message: String,
}

/// Parse the text between the braces of a chunk header.
pub fn parse_condition(text: &str) -> Result<Condition, ConditionSyntaxError> {
    let mut terms = Vec::new();
    let mut offset = 0;

    for part in text.split("&&") {
        let leading = part.len() - part.trim_start().len();
        let trimmed = part.trim();
        let start = offset + leading;

        let (negated, ident, ident_start) = match trimmed.strip_prefix('!') {
            Some(rest) => {
                let rest_trimmed = rest.trim_start();
                (true, rest_trimmed, start + 1 + (rest.len() - rest_trimmed.len()))
            }
            None => (false, trimmed, start),
        };

        if ident.is_empty() {
            return Err(ConditionSyntaxError {
                offset: start,
                len: trimmed.len().max(1),
                message: "expected a flag name".to_string(),
            });
        }
        if !is_identifier(ident) {
            return Err(ConditionSyntaxError {
                offset: ident_start,
                len: ident.len(),
                message: format!("'{ident}' is not a flag name"),
            });
        }

        terms.push(Term {
            flag: ident.to_string(),
            negated,
        });
        offset += part.len() + 2;
    }

    Ok(Condition { terms })
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn flags(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_negated_conjunction() {
        let condition = parse_condition("!__replaying && !__recording").unwrap();
        assert_eq!(
            condition.terms,
            vec![
                Term {
                    flag: "__replaying".to_string(),
                    negated: true
                },
                Term {
                    flag: "__recording".to_string(),
                    negated: true
                },
            ]
        );
    }

    #[test]
    fn test_evaluate() {
        let condition = parse_condition("!__replaying && !__recording").unwrap();
        assert!(condition.evaluate(&flags(&[])));
        assert!(!condition.evaluate(&flags(&["__replaying"])));
        assert!(!condition.evaluate(&flags(&["__recording"])));

        let positive = parse_condition("__azure").unwrap();
        assert!(positive.evaluate(&flags(&["__azure"])));
        assert!(!positive.evaluate(&flags(&[])));
    }

    #[test]
    fn test_empty_term_is_rejected() {
        let err = parse_condition("a && ").unwrap_err();
        assert_eq!(err.message, "expected a flag name");
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn test_invalid_identifier_offset() {
        let err = parse_condition("a && !9lives").unwrap_err();
        assert_eq!(err.message, "'9lives' is not a flag name");
        assert_eq!(err.offset, 6);
        assert_eq!(err.len, 6);
    }

    #[test]
    fn test_unsupported_operator() {
        let err = parse_condition("a || b").unwrap_err();
        assert_eq!(err.message, "'a || b' is not a flag name");
    }
}
