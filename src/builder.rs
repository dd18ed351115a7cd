//! Query String builder.
//!
//! Accumulates conditions, raw fragments, and `Q` expressions in insertion
//! order, then compiles them into a single query string under one logic
//! operator.

use crate::condition::{ConditionItem, QueryValue};
use crate::error::Result;
use crate::operators::{GroupRelation, LogicOperator, OperatorMapping, OperatorSpec};
use crate::query::Q;

/// One stored entry of the filter set.
#[derive(Debug, Clone)]
enum Entry {
    Filter(ConditionItem),
    Raw(String),
    Query(Q),
}

/// Builder for Elasticsearch query-string expressions.
///
/// ```
/// use elasticflow::{QueryStringBuilder, QueryStringOperator};
///
/// let mut builder = QueryStringBuilder::new();
/// builder
///     .add_filter("status", QueryStringOperator::Equal, ["error"])
///     .add_filter("level", QueryStringOperator::Gte, [3]);
/// assert_eq!(builder.build().unwrap(), "status: \"error\" AND level: >=3");
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryStringBuilder {
    logic_operator: LogicOperator,
    operator_mapping: Option<OperatorMapping>,
    entries: Vec<Entry>,
}

impl QueryStringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder joining top-level terms with the given logic operator.
    pub fn with_logic_operator(logic_operator: LogicOperator) -> Self {
        Self {
            logic_operator,
            ..Self::default()
        }
    }

    /// Builder resolving string operator tokens through an alias table.
    pub fn with_operator_mapping(operator_mapping: OperatorMapping) -> Self {
        Self {
            operator_mapping: Some(operator_mapping),
            ..Self::default()
        }
    }

    pub fn with_config(
        logic_operator: LogicOperator,
        operator_mapping: Option<OperatorMapping>,
    ) -> Self {
        Self {
            logic_operator,
            operator_mapping,
            entries: Vec::new(),
        }
    }

    /// Add one condition; `values` accepts any iterator of convertible
    /// values. Multiple values are joined with `GroupRelation::Or`.
    pub fn add_filter<O, I, V>(&mut self, field: &str, operator: O, values: I) -> &mut Self
    where
        O: Into<OperatorSpec>,
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.add_filter_with_relation(field, operator, values, GroupRelation::Or)
    }

    /// Add one condition with an explicit multi-value relation.
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

    /// Add one condition from a single scalar value.
    pub fn add_filter_value<O, V>(&mut self, field: &str, operator: O, value: V) -> &mut Self
    where
        O: Into<OperatorSpec>,
        V: Into<QueryValue>,
    {
        self.add_filter(field, operator, [value])
    }

    /// Add a pre-built condition, e.g. one made by a `QueryField`.
    pub fn add_condition(&mut self, condition: ConditionItem) -> &mut Self {
        self.entries.push(Entry::Filter(condition));
        self
    }

    /// Add a raw, pre-formatted query-string fragment. Blank fragments are
    /// ignored; stored fragments are parenthesized in the final output.
    pub fn add_raw(&mut self, raw: &str) -> &mut Self {
        if !raw.trim().is_empty() {
            self.entries.push(Entry::Raw(raw.to_string()));
        }
        self
    }

    /// Add a `Q` expression. Empty expressions are ignored; compilation is
    /// deferred to [`QueryStringBuilder::build`] so every compile-time
    /// error surfaces from the same call.
    pub fn add_q(&mut self, q: &Q) -> &mut Self {
        if !q.is_empty() {
            self.entries.push(Entry::Query(q.clone()));
        }
        self
    }

    /// Discard every stored entry.
    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Compile the filter set into a query string.
    ///
    /// Pure read: calling it repeatedly without further mutation yields the
    /// same string. Errors are raised before any partial output is
    /// returned.
    pub fn build(&self) -> Result<String> {
        let mut terms = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::Filter(condition) => {
                    let fragment = condition.compile(self.operator_mapping.as_ref())?;
                    if !fragment.is_empty() {
                        terms.push(fragment);
                    }
                }
                Entry::Raw(raw) => terms.push(format!("({})", raw)),
                Entry::Query(q) => {
                    let fragment = q.build()?;
                    if !fragment.is_empty() {
                        terms.push(format!("({})", fragment));
                    }
                }
            }
        }
        let sep = format!(" {} ", self.logic_operator.keyword());
        Ok(terms.join(&sep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EsQueryError;
    use crate::operators::QueryStringOperator as Op;

    #[test]
    fn test_single_equal_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("status", Op::Equal, ["error"]);
        assert_eq!(builder.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_multiple_equal_values() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("status", Op::Equal, ["error", "warning"]);
        assert_eq!(builder.build().unwrap(), "status: (\"error\" OR \"warning\")");
    }

    #[test]
    fn test_include_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("message", Op::Include, ["timeout"]);
        assert_eq!(builder.build().unwrap(), "message: *timeout*");
    }

    #[test]
    fn test_gte_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("level", Op::Gte, [3]);
        assert_eq!(builder.build().unwrap(), "level: >=3");
    }

    #[test]
    fn test_between_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("age", Op::Between, [18, 60]);
        assert_eq!(builder.build().unwrap(), "age: [18 TO 60]");
    }

    #[test]
    fn test_exists_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("field1", Op::Exists, Vec::<QueryValue>::new());
        assert_eq!(builder.build().unwrap(), "field1: *");
    }

    #[test]
    fn test_not_exists_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("field1", Op::NotExists, Vec::<QueryValue>::new());
        assert_eq!(builder.build().unwrap(), "NOT field1: *");
    }

    #[test]
    fn test_multiple_filters_and() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("status", Op::Equal, ["error"]);
        builder.add_filter("level", Op::Gte, [3]);
        assert_eq!(builder.build().unwrap(), "status: \"error\" AND level: >=3");
    }

    #[test]
    fn test_multiple_filters_or() {
        let mut builder = QueryStringBuilder::with_logic_operator(LogicOperator::Or);
        builder.add_filter("status", Op::Equal, ["error"]);
        builder.add_filter("level", Op::Gte, [3]);
        assert_eq!(builder.build().unwrap(), "status: \"error\" OR level: >=3");
    }

    #[test]
    fn test_group_relation_and() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter_with_relation(
            "tag",
            Op::Equal,
            ["tag1", "tag2"],
            GroupRelation::And,
        );
        assert_eq!(builder.build().unwrap(), "tag: (\"tag1\" AND \"tag2\")");
    }

    #[test]
    fn test_escape_special_characters() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("message", Op::Include, ["error: test"]);
        assert!(builder.build().unwrap().contains("error\\:\\ test"));
    }

    #[test]
    fn test_add_raw_query() {
        let mut builder = QueryStringBuilder::new();
        builder.add_raw("status: error AND level: >=3");
        assert_eq!(builder.build().unwrap(), "(status: error AND level: >=3)");
    }

    #[test]
    fn test_add_raw_with_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("app", Op::Equal, ["myapp"]);
        builder.add_raw("status: error OR level: >=3");
        assert_eq!(
            builder.build().unwrap(),
            "app: \"myapp\" AND (status: error OR level: >=3)"
        );
    }

    #[test]
    fn test_add_raw_blank_ignored() {
        let mut builder = QueryStringBuilder::new();
        builder.add_raw("");
        builder.add_raw("   ");
        assert_eq!(builder.build().unwrap(), "");
    }

    #[test]
    fn test_operator_mapping() {
        let mut mapping = OperatorMapping::new();
        mapping.insert("eq".to_string(), Op::Equal);
        mapping.insert("contains".to_string(), Op::Include);
        let mut builder = QueryStringBuilder::with_operator_mapping(mapping);
        builder.add_filter("status", "eq", ["error"]);
        assert_eq!(builder.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_operator_mapping_fallback_to_equal() {
        let mut mapping = OperatorMapping::new();
        mapping.insert("eq".to_string(), Op::Equal);
        let mut builder = QueryStringBuilder::with_operator_mapping(mapping);
        builder.add_filter("status", "unknown_op", ["error"]);
        assert_eq!(builder.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_unsupported_operator() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("test", "invalid_op", ["value"]);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            EsQueryError::UnsupportedOperator {
                field: "test".to_string(),
                operator: "invalid_op".to_string(),
            }
        );
    }

    #[test]
    fn test_chain_calls() {
        let mut builder = QueryStringBuilder::new();
        let result = builder
            .add_filter("status", Op::Equal, ["error"])
            .add_filter("level", Op::Gte, [3])
            .build()
            .unwrap();
        assert!(result.contains("status: \"error\""));
        assert!(result.contains("level: >=3"));
    }

    #[test]
    fn test_clear_filters() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("status", Op::Equal, ["error"]);
        builder.clear();
        assert_eq!(builder.build().unwrap(), "");
    }

    #[test]
    fn test_between_insufficient_values() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("age", Op::Between, [18]);
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("BETWEEN operator requires 2 values"));
    }

    #[test]
    fn test_regex_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("email", Op::Reg, [".*@example\\.com"]);
        assert_eq!(builder.build().unwrap(), "email: /.*@example\\.com/");
    }

    #[test]
    fn test_not_regex_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("email", Op::Nreg, [".*@test\\.com"]);
        assert_eq!(builder.build().unwrap(), "NOT email: /.*@test\\.com/");
    }

    #[test]
    fn test_not_equal_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("status", Op::NotEqual, ["error"]);
        assert_eq!(builder.build().unwrap(), "NOT status: \"error\"");
    }

    #[test]
    fn test_not_include_filter() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("message", Op::NotInclude, ["timeout"]);
        assert_eq!(builder.build().unwrap(), "NOT message: *timeout*");
    }

    #[test]
    fn test_gt_lt_lte_filters() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("level", Op::Gt, [5]);
        assert_eq!(builder.build().unwrap(), "level: >5");

        builder.clear().add_filter("level", Op::Lt, [10]);
        assert_eq!(builder.build().unwrap(), "level: <10");

        builder.clear().add_filter("level", Op::Lte, [3]);
        assert_eq!(builder.build().unwrap(), "level: <=3");
    }

    #[test]
    fn test_add_filter_single_value() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter_value("status", Op::Equal, "error");
        assert_eq!(builder.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_include_empty_after_strip() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("message", Op::Include, ["***"]);
        assert_eq!(builder.build().unwrap(), "");
    }

    #[test]
    fn test_include_multiple_values() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("message", Op::Include, ["error", "warning"]);
        assert_eq!(builder.build().unwrap(), "message: (*error* OR *warning*)");
    }

    #[test]
    fn test_empty_values_list() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("status", Op::Equal, Vec::<QueryValue>::new());
        assert_eq!(builder.build().unwrap(), "");
    }

    #[test]
    fn test_build_empty() {
        let builder = QueryStringBuilder::new();
        assert_eq!(builder.build().unwrap(), "");
    }

    #[test]
    fn test_equal_with_quotes() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("message", Op::Equal, ["say \"hello\""]);
        assert_eq!(builder.build().unwrap(), "message: \"say \\\"hello\\\"\"");
    }

    #[test]
    fn test_multiple_raw_queries() {
        let mut builder = QueryStringBuilder::new();
        builder.add_raw("status: error");
        builder.add_raw("level: >=3");
        assert_eq!(builder.build().unwrap(), "(status: error) AND (level: >=3)");
    }

    #[test]
    fn test_multiple_raw_queries_or() {
        let mut builder = QueryStringBuilder::with_logic_operator(LogicOperator::Or);
        builder.add_raw("status: error");
        builder.add_raw("level: >=3");
        assert_eq!(builder.build().unwrap(), "(status: error) OR (level: >=3)");
    }

    #[test]
    fn test_ordering_preserved_across_entry_kinds() {
        let mut builder = QueryStringBuilder::new();
        builder.add_raw("raw: 1");
        builder.add_filter("status", Op::Equal, ["error"]);
        builder.add_q(&crate::Q::expr("level__gte", 3));
        builder.add_filter("app", Op::Equal, ["myapp"]);
        assert_eq!(
            builder.build().unwrap(),
            "(raw: 1) AND status: \"error\" AND (level: >=3) AND app: \"myapp\""
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut builder = QueryStringBuilder::new();
        builder.add_filter("status", Op::Equal, ["error"]);
        builder.add_raw("level: >=3");
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_add_condition() {
        let mut builder = QueryStringBuilder::new();
        builder.add_condition(ConditionItem::new("status", Op::Equal, vec!["error".into()]));
        assert_eq!(builder.build().unwrap(), "status: \"error\"");
    }

    mod with_q {
        use super::*;
        use crate::Q;

        #[test]
        fn test_add_q_simple() {
            let mut builder = QueryStringBuilder::new();
            builder.add_q(&Q::expr("status__equal", "error"));
            assert_eq!(builder.build().unwrap(), "(status: \"error\")");
        }

        #[test]
        fn test_add_q_with_filter() {
            let mut builder = QueryStringBuilder::new();
            builder.add_filter("app", Op::Equal, ["myapp"]);
            builder.add_q(&Q::expr("status__equal", "error"));
            assert_eq!(
                builder.build().unwrap(),
                "app: \"myapp\" AND (status: \"error\")"
            );
        }

        #[test]
        fn test_add_q_complex() {
            let mut builder = QueryStringBuilder::new();
            builder.add_q(&(Q::expr("status__equal", "error") | Q::expr("level__gte", 3)));
            assert_eq!(
                builder.build().unwrap(),
                "(status: \"error\" OR level: >=3)"
            );
        }

        #[test]
        fn test_add_q_empty_ignored() {
            let mut builder = QueryStringBuilder::new();
            builder.add_q(&Q::new());
            assert_eq!(builder.build().unwrap(), "");
        }

        #[test]
        fn test_add_multiple_q() {
            let mut builder = QueryStringBuilder::new();
            builder.add_q(&Q::expr("status__equal", "error"));
            builder.add_q(&Q::expr("level__gte", 3));
            assert_eq!(
                builder.build().unwrap(),
                "(status: \"error\") AND (level: >=3)"
            );
        }

        #[test]
        fn test_add_q_error_surfaces_at_build() {
            let mut builder = QueryStringBuilder::new();
            builder.add_q(&Q::filter("test", "bogus", "value"));
            assert!(matches!(
                builder.build(),
                Err(EsQueryError::UnsupportedOperator { .. })
            ));
        }
    }
}
