//! Elasticsearch DSL (JSON query body) builder.
//!
//! Compiles the same condition vocabulary as `QueryStringBuilder` into a
//! structured bool-query document instead of a query string.

use crate::condition::{ConditionItem, QueryValue};
use crate::error::{EsQueryError, Result};
use crate::operators::{
    GroupRelation, LogicOperator, OperatorMapping, OperatorSpec, QueryStringOperator,
};
use crate::query::Q;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone)]
enum Entry {
    Filter(ConditionItem),
    Raw(String),
    Query(Q),
}

/// Builder for Elasticsearch bool queries.
///
/// ```
/// use elasticflow::{DslQueryBuilder, QueryStringOperator};
/// use serde_json::json;
///
/// let mut builder = DslQueryBuilder::new();
/// builder.add_filter("status", QueryStringOperator::Equal, ["error"]);
/// assert_eq!(
///     builder.build().unwrap(),
///     json!({"bool": {"must": [{"term": {"status": "error"}}]}})
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DslQueryBuilder {
    logic_operator: LogicOperator,
    operator_mapping: Option<OperatorMapping>,
    entries: Vec<Entry>,
}

impl DslQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logic_operator(logic_operator: LogicOperator) -> Self {
        Self {
            logic_operator,
            ..Self::default()
        }
    }

    pub fn with_operator_mapping(operator_mapping: OperatorMapping) -> Self {
        Self {
            operator_mapping: Some(operator_mapping),
            ..Self::default()
        }
    }

    pub fn add_filter<O, I, V>(&mut self, field: &str, operator: O, values: I) -> &mut Self
    where
        O: Into<OperatorSpec>,
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.add_filter_with_relation(field, operator, values, GroupRelation::Or)
    }

    pub fn add_filter_with_relation<O, I, V>(
        &mut self,
        field: &str,
        operator: O,
        values: I,
        group_relation: GroupRelation,
    ) -> &mut Self
    where
        O: Into<OperatorSpec>,
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        let values: Vec<QueryValue> = values.into_iter().map(Into::into).collect();
        self.entries.push(Entry::Filter(ConditionItem::with_relation(
            field,
            operator,
            values,
            group_relation,
        )));
        self
    }

    pub fn add_condition(&mut self, condition: ConditionItem) -> &mut Self {
        self.entries.push(Entry::Filter(condition));
        self
    }

    /// Add a raw query-string fragment, emitted as a `query_string` clause.
    pub fn add_raw(&mut self, raw: &str) -> &mut Self {
        if !raw.trim().is_empty() {
            self.entries.push(Entry::Raw(raw.to_string()));
        }
        self
    }

    /// Add a `Q` expression, compiled to a `query_string` clause at build.
    pub fn add_q(&mut self, q: &Q) -> &mut Self {
        if !q.is_empty() {
            self.entries.push(Entry::Query(q.clone()));
        }
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Compile the filter set into a bool-query document.
    pub fn build(&self) -> Result<Value> {
        let mut positive: Vec<Value> = Vec::new();
        let mut negative: Vec<Value> = Vec::new();

        for entry in &self.entries {
            match entry {
                Entry::Filter(condition) => {
                    let Some((clause, negated)) =
                        dsl_clause(condition, self.operator_mapping.as_ref())?
                    else {
                        continue;
                    };
                    if negated {
                        negative.push(clause);
                    } else {
                        positive.push(clause);
                    }
                }
                Entry::Raw(raw) => {
                    positive.push(json!({"query_string": {"query": raw}}));
                }
                Entry::Query(q) => {
                    let fragment = q.build()?;
                    if !fragment.is_empty() {
                        positive.push(json!({"query_string": {"query": fragment}}));
                    }
                }
            }
        }

        Ok(match self.logic_operator {
            LogicOperator::And => {
                let mut body = Map::new();
                if !positive.is_empty() {
                    body.insert("must".to_string(), Value::Array(positive));
                }
                if !negative.is_empty() {
                    body.insert("must_not".to_string(), Value::Array(negative));
                }
                json!({"bool": Value::Object(body)})
            }
            LogicOperator::Or => {
                let mut should = positive;
                // Negated clauses stay negated inside their own should term
                for clause in negative {
                    should.push(json!({"bool": {"must_not": [clause]}}));
                }
                json!({"bool": {"should": should, "minimum_should_match": 1}})
            }
        })
    }

    /// Wrap the bool query as a full request body.
    pub fn build_body(&self) -> Result<Value> {
        Ok(json!({"query": self.build()?}))
    }
}

/// Render one condition as a DSL clause. Returns the clause and whether it
/// belongs under `must_not`; `None` when the condition elides.
fn dsl_clause(
    condition: &ConditionItem,
    mapping: Option<&OperatorMapping>,
) -> Result<Option<(Value, bool)>> {
    let operator = condition.operator.resolve(mapping, &condition.field)?;
    let field = condition.field.as_str();
    let values = &condition.values;
    let relation = condition.group_relation;

    let clause = match operator {
        QueryStringOperator::Equal | QueryStringOperator::NotEqual => {
            term_clause(field, values, relation)
        }
        QueryStringOperator::Include | QueryStringOperator::NotInclude => {
            let clauses: Vec<Value> = values
                .iter()
                .filter_map(wildcard_value)
                .map(|v| json!({"wildcard": {field: {"value": format!("*{}*", v)}}}))
                .collect();
            group_clauses(clauses, relation)
        }
        QueryStringOperator::Gt => range_clause(field, values, relation, "gt"),
        QueryStringOperator::Gte => range_clause(field, values, relation, "gte"),
        QueryStringOperator::Lt => range_clause(field, values, relation, "lt"),
        QueryStringOperator::Lte => range_clause(field, values, relation, "lte"),
        QueryStringOperator::Between => {
            if values.len() != 2 {
                return Err(EsQueryError::InvalidValueCount {
                    operator: "BETWEEN",
                    required: 2,
                    actual: values.len(),
                });
            }
            Some(json!({
                "range": {field: {"gte": value_to_json(&values[0]), "lte": value_to_json(&values[1])}}
            }))
        }
        QueryStringOperator::Exists | QueryStringOperator::NotExists => {
            Some(json!({"exists": {"field": field}}))
        }
        QueryStringOperator::Reg | QueryStringOperator::Nreg => {
            let clauses: Vec<Value> = values
                .iter()
                .map(|v| json!({"regexp": {field: {"value": v.to_string()}}}))
                .collect();
            group_clauses(clauses, relation)
        }
    };

    let negated = matches!(
        operator,
        QueryStringOperator::NotEqual
            | QueryStringOperator::NotInclude
            | QueryStringOperator::NotExists
            | QueryStringOperator::Nreg
    );
    Ok(clause.map(|c| (c, negated)))
}

fn term_clause(field: &str, values: &[QueryValue], relation: GroupRelation) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => Some(json!({"term": {field: value_to_json(&values[0])}})),
        _ => match relation {
            GroupRelation::Or => {
                let list: Vec<Value> = values.iter().map(value_to_json).collect();
                Some(json!({"terms": {field: list}}))
            }
            GroupRelation::And => {
                let terms: Vec<Value> = values
                    .iter()
                    .map(|v| json!({"term": {field: value_to_json(v)}}))
                    .collect();
                Some(json!({"bool": {"must": terms}}))
            }
        },
    }
}

fn range_clause(
    field: &str,
    values: &[QueryValue],
    relation: GroupRelation,
    bound: &str,
) -> Option<Value> {
    let clauses: Vec<Value> = values
        .iter()
        .map(|v| json!({"range": {field: {bound: value_to_json(v)}}}))
        .collect();
    group_clauses(clauses, relation)
}

fn group_clauses(clauses: Vec<Value>, relation: GroupRelation) -> Option<Value> {
    match clauses.len() {
        0 => None,
        1 => clauses.into_iter().next(),
        _ => Some(match relation {
            GroupRelation::Or => json!({"bool": {"should": clauses, "minimum_should_match": 1}}),
            GroupRelation::And => json!({"bool": {"must": clauses}}),
        }),
    }
}

/// The wildcard body for one INCLUDE value, `None` when it strips to empty.
fn wildcard_value(value: &QueryValue) -> Option<String> {
    match value {
        QueryValue::String(s) => {
            let stripped = s.trim_matches('*');
            if stripped.is_empty() {
                None
            } else {
                Some(stripped.to_string())
            }
        }
        other => Some(other.to_string()),
    }
}

fn value_to_json(value: &QueryValue) -> Value {
    match value {
        QueryValue::String(s) => json!(s),
        QueryValue::Int(n) => json!(n),
        QueryValue::Float(x) => json!(x),
        QueryValue::Bool(b) => json!(b),
    }
}
