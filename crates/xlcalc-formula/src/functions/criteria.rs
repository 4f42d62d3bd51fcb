//! Criteria matching for SUMIF and related functions
//!
//! Criteria can be:
//! - A number, boolean or date: equality (e.g., 5)
//! - A text string, optionally led by a comparison operator: ">5", ">=10",
//!   "<100", "<=50", "<>0", "=5", "apple"
//! - Wildcards in `=`/`<>` text criteria: "*" matches any characters, "?"
//!   matches a single character
//!
//! The text after the operator becomes a number, a date or a boolean when it
//! parses as one, and stays text otherwise.

use lazy_regex::regex_captures;

use xlcalc_core::{CompareOp, Value, XlError, XlResult};

use crate::signature::Kind;

/// A parsed criteria expression
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    op: CompareOp,
    operand: Value,
}

/// Parse a criteria value into a predicate
///
/// Arrays and blanks are not supported as criteria and produce `#VALUE!`;
/// error criteria propagate.
pub fn parse_criteria(criteria: &Value) -> XlResult<Criteria> {
    match criteria {
        Value::Number(_) | Value::Boolean(_) | Value::DateTime(_) => Ok(Criteria {
            op: CompareOp::Eq,
            operand: criteria.clone(),
        }),
        Value::Text(text) => Ok(Criteria::parse_text(text.as_str())),
        Value::Error(e) => Err(e.clone()),
        Value::Array(_) => Err(XlError::value("Array criteria are not supported")),
        Value::Blank => Err(XlError::value("Blank criteria are not supported")),
    }
}

impl Criteria {
    fn parse_text(text: &str) -> Self {
        // Alternatives are ordered longest first
        let (op, rest) = match regex_captures!(r"^(<>|<=|>=|<|>|=)?(.*)$"s, text) {
            Some((_, op, rest)) => (CompareOp::from_symbol(op).unwrap_or(CompareOp::Eq), rest),
            None => (CompareOp::Eq, text),
        };
        Criteria {
            op,
            operand: cast_operand(rest),
        }
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// The value probes are compared against
    pub fn operand(&self) -> &Value {
        &self.operand
    }

    /// Test one probe value
    ///
    /// Errors in the probe, and comparisons with no defined outcome, never
    /// match.
    pub fn matches(&self, probe: &Value) -> bool {
        if probe.is_error() {
            return false;
        }
        if let (CompareOp::Eq | CompareOp::Ne, Value::Text(pattern)) = (self.op, &self.operand) {
            if has_wildcards(pattern.as_str()) {
                let matched = match probe.as_text() {
                    Ok(text) => wildcard_match(
                        &pattern.as_str().to_lowercase(),
                        &text.as_str().to_lowercase(),
                    ),
                    Err(_) => false,
                };
                return matched == (self.op == CompareOp::Eq);
            }
        }
        matches!(
            probe.compare_with(self.op, &self.operand),
            Value::Boolean(true)
        )
    }
}

/// Cast criteria text to a number, then a date, then a boolean
///
/// Text that none of these accept stays text.
fn cast_operand(text: &str) -> Value {
    let candidate = Value::text(text);
    [Kind::Number, Kind::DateTime, Kind::Boolean]
        .iter()
        .find_map(|kind| kind.coerce(&candidate, "criteria").ok())
        .unwrap_or(candidate)
}

fn has_wildcards(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Match with wildcards: * = any characters, ? = single character
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut pi = 0; // pattern index
    let mut ti = 0; // text index
    let mut star_pi = None; // position of last * in pattern
    let mut star_ti = 0; // text position when the last * was matched

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star_pi = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(sp) = star_pi {
            pi = sp + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    // Remaining pattern characters must all be *
    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}
