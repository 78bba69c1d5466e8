//! Label selectors
//!
//! The host decides which backend series are relevant through a label
//! selector. `LabelSelector` is the capability the provider consumes;
//! `Selector` implements it for the Kubernetes selector syntax:
//!
//! ```text
//! env=prod,tier!=cache,region in (us-east, us-west),!canary,team
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Label set attached to a backend series
pub type Labels = BTreeMap<String, String>;

/// Predicate over a label set
pub trait LabelSelector {
    /// Whether `labels` satisfies the selector
    fn matches(&self, labels: &Labels) -> bool;
}

impl<F> LabelSelector for F
where
    F: Fn(&Labels) -> bool,
{
    fn matches(&self, labels: &Labels) -> bool {
        self(labels)
    }
}

/// Selector syntax errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectorError {
    /// A requirement has no key
    #[error("missing label key in requirement {0:?}")]
    MissingKey(String),

    /// A set-based requirement is not of the form `key in (a, b)`
    #[error("malformed set requirement {0:?}")]
    MalformedSet(String),

    /// The selector has unbalanced parentheses
    #[error("unbalanced parentheses in selector {0:?}")]
    UnbalancedParens(String),
}

/// One clause of a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// `key=value` or `key==value`
    Equals(String, String),
    /// `key!=value`; also true when the key is absent
    NotEquals(String, String),
    /// `key in (a, b)`
    In(String, Vec<String>),
    /// `key notin (a, b)`; also true when the key is absent
    NotIn(String, Vec<String>),
    /// `key`
    Exists(String),
    /// `!key`
    DoesNotExist(String),
}

impl Requirement {
    fn matches(&self, labels: &Labels) -> bool {
        match self {
            Requirement::Equals(key, value) => labels.get(key) == Some(value),
            Requirement::NotEquals(key, value) => labels.get(key) != Some(value),
            Requirement::In(key, values) => labels.get(key).is_some_and(|v| values.contains(v)),
            Requirement::NotIn(key, values) => !labels.get(key).is_some_and(|v| values.contains(v)),
            Requirement::Exists(key) => labels.contains_key(key),
            Requirement::DoesNotExist(key) => !labels.contains_key(key),
        }
    }

    fn parse(clause: &str) -> Result<Self, SelectorError> {
        let missing_key = || SelectorError::MissingKey(clause.to_string());

        if let Some(key) = clause.strip_prefix('!') {
            let key = key.trim();
            if key.is_empty() {
                return Err(missing_key());
            }
            return Ok(Requirement::DoesNotExist(key.to_string()));
        }

        if let Some(open) = clause.find('(') {
            let head = clause[..open].trim();
            let body = clause[open + 1..]
                .trim_end()
                .strip_suffix(')')
                .ok_or_else(|| SelectorError::MalformedSet(clause.to_string()))?;
            let values: Vec<String> = body
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();

            let (key, negated) = if let Some(key) = head.strip_suffix(" notin") {
                (key.trim(), true)
            } else if let Some(key) = head.strip_suffix(" in") {
                (key.trim(), false)
            } else {
                return Err(SelectorError::MalformedSet(clause.to_string()));
            };
            if key.is_empty() {
                return Err(missing_key());
            }
            return Ok(if negated {
                Requirement::NotIn(key.to_string(), values)
            } else {
                Requirement::In(key.to_string(), values)
            });
        }

        let (key, value, negated) = if let Some((k, v)) = clause.split_once("!=") {
            (k, v, true)
        } else if let Some((k, v)) = clause.split_once("==") {
            (k, v, false)
        } else if let Some((k, v)) = clause.split_once('=') {
            (k, v, false)
        } else {
            return Ok(Requirement::Exists(clause.to_string()));
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(missing_key());
        }
        let value = value.trim().to_string();
        Ok(if negated {
            Requirement::NotEquals(key.to_string(), value)
        } else {
            Requirement::Equals(key.to_string(), value)
        })
    }
}

/// Conjunction of requirements; the empty selector matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    /// Selector that matches every label set
    pub fn everything() -> Self {
        Self::default()
    }

    /// Selector requiring each `key=value` pair
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            requirements: pairs
                .into_iter()
                .map(|(k, v)| Requirement::Equals(k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a comma separated selector expression
    pub fn parse(expression: &str) -> Result<Self, SelectorError> {
        let mut requirements = Vec::new();
        for clause in split_clauses(expression)? {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            requirements.push(Requirement::parse(clause)?);
        }
        Ok(Self { requirements })
    }

    /// Requirements making up the selector
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Whether the selector has no requirements
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl LabelSelector for Selector {
    fn matches(&self, labels: &Labels) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Equals(k, v) => write!(f, "{}={}", k, v),
            Requirement::NotEquals(k, v) => write!(f, "{}!={}", k, v),
            Requirement::In(k, vs) => write!(f, "{} in ({})", k, vs.join(",")),
            Requirement::NotIn(k, vs) => write!(f, "{} notin ({})", k, vs.join(",")),
            Requirement::Exists(k) => write!(f, "{}", k),
            Requirement::DoesNotExist(k) => write!(f, "!{}", k),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

/// Split on commas that are not inside a value set
fn split_clauses(expression: &str) -> Result<Vec<&str>, SelectorError> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in expression.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SelectorError::UnbalancedParens(expression.to_string()))?;
            }
            ',' if depth == 0 => {
                clauses.push(&expression[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(SelectorError::UnbalancedParens(expression.to_string()));
    }
    clauses.push(&expression[start..]);
    Ok(clauses)
}
