//! The operator vocabulary for query construction.

use crate::error::{EsQueryError, Result};
use std::collections::HashMap;

/// Comparison/match operators supported by the condition compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStringOperator {
    Equal,
    NotEqual,
    Include,
    NotInclude,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    Exists,
    NotExists,
    /// Regex match
    Reg,
    /// Regex non-match
    Nreg,
}

impl QueryStringOperator {
    /// Resolve an operator from its textual token, as used by the
    /// `field__operator` convention and deferred string operators.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "equal" => Some(Self::Equal),
            "not_equal" => Some(Self::NotEqual),
            "include" => Some(Self::Include),
            "not_include" => Some(Self::NotInclude),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "between" => Some(Self::Between),
            "exists" => Some(Self::Exists),
            "not_exists" => Some(Self::NotExists),
            "regex" | "reg" => Some(Self::Reg),
            "not_regex" | "nreg" => Some(Self::Nreg),
            _ => None,
        }
    }

    /// The textual token for this operator.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::Include => "include",
            Self::NotInclude => "not_include",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
            Self::Reg => "regex",
            Self::Nreg => "not_regex",
        }
    }
}

/// Logic operator joining distinct top-level terms of a filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicOperator {
    #[default]
    And,
    Or,
}

impl LogicOperator {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Relation joining multiple values of a single field within one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupRelation {
    And,
    #[default]
    Or,
}

impl GroupRelation {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Caller-supplied alias table mapping external operator tokens to the
/// vocabulary above.
pub type OperatorMapping = HashMap<String, QueryStringOperator>;

/// An operator as given by the caller: either a vocabulary member, or a
/// textual token resolved later at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorSpec {
    Operator(QueryStringOperator),
    Token(String),
}

impl OperatorSpec {
    /// Resolve against an optional alias table.
    ///
    /// With an alias table configured, unresolved tokens fall back to
    /// `Equal` (partial vocabularies are allowed). Without one, tokens are
    /// matched against the operator vocabulary itself and unknown tokens
    /// fail with an unsupported-operator error.
    pub fn resolve(&self, mapping: Option<&OperatorMapping>, field: &str) -> Result<QueryStringOperator> {
        match self {
            Self::Operator(op) => Ok(*op),
            Self::Token(token) => match mapping {
                Some(mapping) => Ok(mapping
                    .get(token)
                    .copied()
                    .unwrap_or(QueryStringOperator::Equal)),
                None => QueryStringOperator::from_token(token)
                    .ok_or_else(|| EsQueryError::unsupported_operator(field, token)),
            },
        }
    }
}

impl From<QueryStringOperator> for OperatorSpec {
    fn from(op: QueryStringOperator) -> Self {
        Self::Operator(op)
    }
}

impl From<&str> for OperatorSpec {
    fn from(token: &str) -> Self {
        Self::Token(token.to_string())
    }
}

impl From<String> for OperatorSpec {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}
