//! Q 表达式树
//!
//! 可组合的布尔查询表达式。叶子节点持有单值条件，AND/OR/NOT 组合总是
//! 构造新节点，空节点在组合时被吸收（`a & Q::new() == a`）。
//!
//! ```
//! use elasticflow::Q;
//!
//! let q = (Q::expr("status__equal", "error") | Q::expr("status__equal", "warning"))
//!     & Q::expr("level__gte", 3);
//! let query_string = q.build().unwrap();
//! assert!(query_string.contains("OR"));
//! assert!(query_string.contains("AND"));
//! ```

use crate::condition::{ConditionItem, QueryValue};
use crate::error::Result;
use crate::operators::{LogicOperator, OperatorSpec, QueryStringOperator};
use std::ops::{BitAnd, BitOr, Not};

/// 布尔表达式节点
#[derive(Debug, Clone, PartialEq)]
pub struct Q {
    node: QNode,
}

#[derive(Debug, Clone, PartialEq)]
enum QNode {
    Empty,
    /// 叶子节点：一个或多个单值条件，彼此隐式 AND
    Leaf(Vec<ConditionItem>),
    /// AND/OR 组合节点
    Group {
        connector: LogicOperator,
        children: Vec<Q>,
    },
    /// NOT 包装节点，编译为 `NOT (<inner>)`
    Not(Box<Q>),
}

/// 渲染结果的形状，父节点据此决定是否加括号
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    /// 单个条件或已自带括号的片段
    Atom,
    /// 用某个连接词连接的多个项
    Joined(LogicOperator),
    /// 含多个兄弟条件的叶子，作为子节点时总是加括号
    Siblings,
}

impl Q {
    /// 空表达式，编译为空串，组合时被吸收
    pub fn new() -> Self {
        Q { node: QNode::Empty }
    }

    /// 显式构造：字段、操作符、单个值
    ///
    /// 操作符可以是枚举成员，也可以是延迟到编译期解析的字符串 token。
    pub fn filter(
        field: impl Into<String>,
        operator: impl Into<OperatorSpec>,
        value: impl Into<QueryValue>,
    ) -> Self {
        Q {
            node: QNode::Leaf(vec![ConditionItem::new(field, operator, vec![value.into()])]),
        }
    }

    /// `field__operator` 约定构造
    ///
    /// 末段匹配到操作符名时被消费，剩余段用 `.` 连接为字段路径；
    /// 没有匹配时整个 key 作为字段名，操作符默认 EQUAL。
    /// `Q::expr("log__level__gte", 3)` 等价于字段 `log.level` 的 GTE 条件。
    pub fn expr(key: &str, value: impl Into<QueryValue>) -> Self {
        let (field, operator) = parse_expr_key(key);
        Q {
            node: QNode::Leaf(vec![ConditionItem::new(field, operator, vec![value.into()])]),
        }
    }

    /// 向叶子追加一个兄弟条件（隐式 AND），对应一次构造多个条件的用法
    pub fn and_expr(self, key: &str, value: impl Into<QueryValue>) -> Self {
        let (field, operator) = parse_expr_key(key);
        self.push_condition(ConditionItem::new(field, operator, vec![value.into()]))
    }

    /// 显式参数版本的 [`Q::and_expr`]
    pub fn and_filter(
        self,
        field: impl Into<String>,
        operator: impl Into<OperatorSpec>,
        value: impl Into<QueryValue>,
    ) -> Self {
        self.push_condition(ConditionItem::new(field, operator, vec![value.into()]))
    }

    fn push_condition(self, item: ConditionItem) -> Self {
        match self.node {
            QNode::Empty => Q {
                node: QNode::Leaf(vec![item]),
            },
            QNode::Leaf(mut conditions) => {
                conditions.push(item);
                Q {
                    node: QNode::Leaf(conditions),
                }
            }
            // 非叶子节点退化为 AND 组合
            node => Q { node }.and_with(Q {
                node: QNode::Leaf(vec![item]),
            }),
        }
    }

    /// AND 组合，任一侧为空时返回另一侧
    pub fn and_with(self, other: Q) -> Q {
        combine(self, other, LogicOperator::And)
    }

    /// OR 组合，任一侧为空时返回另一侧
    pub fn or_with(self, other: Q) -> Q {
        combine(self, other, LogicOperator::Or)
    }

    /// NOT 包装，空表达式的取反仍为空
    pub fn negate(self) -> Q {
        if self.is_empty() {
            Q::new()
        } else {
            Q {
                node: QNode::Not(Box::new(self)),
            }
        }
    }

    /// 递归判空：没有条件也没有非空子节点
    pub fn is_empty(&self) -> bool {
        match &self.node {
            QNode::Empty => true,
            QNode::Leaf(conditions) => conditions.is_empty(),
            QNode::Group { children, .. } => children.iter().all(Q::is_empty),
            QNode::Not(inner) => inner.is_empty(),
        }
    }

    /// 编译为 Query String，空表达式编译为空串
    ///
    /// 操作符校验延迟到这里，与条件编译器保持一致。
    pub fn build(&self) -> Result<String> {
        Ok(self.render()?.map(|(s, _)| s).unwrap_or_default())
    }

    fn render(&self) -> Result<Option<(String, Shape)>> {
        match &self.node {
            QNode::Empty => Ok(None),
            QNode::Leaf(conditions) => {
                let mut parts = Vec::new();
                for condition in conditions {
                    let fragment = condition.compile(None)?;
                    if !fragment.is_empty() {
                        parts.push(fragment);
                    }
                }
                match parts.len() {
                    0 => Ok(None),
                    1 => Ok(Some((parts.pop().expect("len checked"), Shape::Atom))),
                    _ => Ok(Some((parts.join(" AND "), Shape::Siblings))),
                }
            }
            QNode::Group {
                connector,
                children,
            } => {
                let mut parts: Vec<(String, Shape)> = Vec::new();
                for child in children {
                    let Some((fragment, shape)) = child.render()? else {
                        continue;
                    };
                    // 不同连接词的子组合与多条件叶子需要括号消歧
                    let wrap = match shape {
                        Shape::Siblings => true,
                        Shape::Joined(child_connector) => child_connector != *connector,
                        Shape::Atom => false,
                    };
                    if wrap {
                        parts.push((format!("({})", fragment), Shape::Atom));
                    } else {
                        parts.push((fragment, shape));
                    }
                }
                match parts.len() {
                    0 => Ok(None),
                    1 => Ok(parts.pop()),
                    _ => {
                        let sep = format!(" {} ", connector.keyword());
                        let joined = parts
                            .iter()
                            .map(|(s, _)| s.as_str())
                            .collect::<Vec<_>>()
                            .join(&sep);
                        Ok(Some((joined, Shape::Joined(*connector))))
                    }
                }
            }
            QNode::Not(inner) => match inner.render()? {
                None => Ok(None),
                Some((fragment, _)) => Ok(Some((format!("NOT ({})", fragment), Shape::Atom))),
            },
        }
    }
}

impl Default for Q {
    fn default() -> Self {
        Q::new()
    }
}

/// 组合两个表达式，空操作数被吸收，同连接词的子组被展平
fn combine(a: Q, b: Q, connector: LogicOperator) -> Q {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let mut children = Vec::new();
    for q in [a, b] {
        match q.node {
            QNode::Group {
                connector: child_connector,
                children: child_nodes,
            } if child_connector == connector => children.extend(child_nodes),
            node => children.push(Q { node }),
        }
    }
    Q {
        node: QNode::Group {
            connector,
            children,
        },
    }
}

/// 解析 `field__operator` 形式的 key
fn parse_expr_key(key: &str) -> (String, QueryStringOperator) {
    let segments: Vec<&str> = key.split("__").collect();
    if segments.len() > 1 {
        if let Some(operator) = QueryStringOperator::from_token(segments[segments.len() - 1]) {
            return (segments[..segments.len() - 1].join("."), operator);
        }
    }
    (segments.join("."), QueryStringOperator::Equal)
}

impl BitAnd for Q {
    type Output = Q;

    fn bitand(self, rhs: Q) -> Q {
        self.and_with(rhs)
    }
}

impl BitOr for Q {
    type Output = Q;

    fn bitor(self, rhs: Q) -> Q {
        self.or_with(rhs)
    }
}

impl Not for Q {
    type Output = Q;

    fn not(self) -> Q {
        self.negate()
    }
}

// 引用版本，方便把同一个子表达式组合进多个父表达式
impl BitAnd for &Q {
    type Output = Q;

    fn bitand(self, rhs: &Q) -> Q {
        self.clone().and_with(rhs.clone())
    }
}

impl BitOr for &Q {
    type Output = Q;

    fn bitor(self, rhs: &Q) -> Q {
        self.clone().or_with(rhs.clone())
    }
}

impl Not for &Q {
    type Output = Q;

    fn not(self) -> Q {
        self.clone().negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EsQueryError;

    #[test]
    fn test_explicit_params() {
        let q = Q::filter("status", QueryStringOperator::Equal, "error");
        assert_eq!(q.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_expr_equal() {
        let q = Q::expr("status__equal", "error");
        assert_eq!(q.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_expr_default_equal() {
        let q = Q::expr("status", "error");
        assert_eq!(q.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_expr_gte() {
        let q = Q::expr("level__gte", 3);
        assert_eq!(q.build().unwrap(), "level: >=3");
    }

    #[test]
    fn test_expr_include() {
        let q = Q::expr("message__include", "timeout");
        assert_eq!(q.build().unwrap(), "message: *timeout*");
    }

    #[test]
    fn test_expr_nested_field() {
        let q = Q::expr("log__level__gte", 3);
        assert_eq!(q.build().unwrap(), "log.level: >=3");
    }

    #[test]
    fn test_expr_nested_field_without_operator() {
        let q = Q::expr("log__level", "info");
        assert_eq!(q.build().unwrap(), "log.level: \"info\"");
    }

    #[test]
    fn test_and_operator() {
        let q = Q::expr("status__equal", "error") & Q::expr("level__gte", 3);
        assert_eq!(q.build().unwrap(), "status: \"error\" AND level: >=3");
    }

    #[test]
    fn test_or_operator() {
        let q = Q::expr("status__equal", "error") | Q::expr("status__equal", "warning");
        let result = q.build().unwrap();
        assert_eq!(result, "status: \"error\" OR status: \"warning\"");
    }

    #[test]
    fn test_not_operator() {
        let q = !Q::expr("status__equal", "error");
        assert_eq!(q.build().unwrap(), "NOT (status: \"error\")");
    }

    #[test]
    fn test_complex_combination() {
        let q = (Q::expr("status__equal", "error") | Q::expr("status__equal", "warning"))
            & Q::expr("level__gte", 3);
        assert_eq!(
            q.build().unwrap(),
            "(status: \"error\" OR status: \"warning\") AND level: >=3"
        );
    }

    #[test]
    fn test_and_chain_not_over_parenthesized() {
        let q = Q::expr("a", 1) & Q::expr("b", 2) & Q::expr("c", 3);
        assert_eq!(q.build().unwrap(), "a: \"1\" AND b: \"2\" AND c: \"3\"");
    }

    #[test]
    fn test_empty_q() {
        let q = Q::new();
        assert_eq!(q.build().unwrap(), "");
        assert!(q.is_empty());
    }

    #[test]
    fn test_non_empty_q() {
        assert!(!Q::expr("status", "error").is_empty());
    }

    #[test]
    fn test_exists_operator() {
        let q = Q::expr("field__exists", true);
        assert_eq!(q.build().unwrap(), "field: *");
    }

    #[test]
    fn test_not_exists_operator() {
        let q = Q::expr("field__not_exists", true);
        assert_eq!(q.build().unwrap(), "NOT field: *");
    }

    #[test]
    fn test_regex_operator() {
        let q = Q::expr("email__regex", ".*@example\\.com");
        assert_eq!(q.build().unwrap(), "email: /.*@example\\.com/");
    }

    #[test]
    fn test_unsupported_operator_fails_at_build() {
        let q = Q::filter("test", "invalid", "value");
        assert!(matches!(
            q.build(),
            Err(EsQueryError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_and_with_empty_q() {
        let q = Q::expr("status", "error") & Q::new();
        assert_eq!(q.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_or_with_empty_q() {
        let q = Q::new() | Q::expr("status", "error");
        assert_eq!(q.build().unwrap(), "status: \"error\"");
    }

    #[test]
    fn test_negate_empty_is_empty() {
        let q = !Q::new();
        assert!(q.is_empty());
        assert_eq!(q.build().unwrap(), "");
    }

    #[test]
    fn test_composition_does_not_mutate_operands() {
        let base = Q::expr("status", "error");
        let with_level = &base & &Q::expr("level__gte", 3);
        let with_app = &base & &Q::expr("app", "myapp");
        assert_eq!(base.build().unwrap(), "status: \"error\"");
        assert_eq!(
            with_level.build().unwrap(),
            "status: \"error\" AND level: >=3"
        );
        assert_eq!(
            with_app.build().unwrap(),
            "status: \"error\" AND app: \"myapp\""
        );
    }

    #[test]
    fn test_sibling_conditions_implicit_and() {
        let q = Q::expr("status", "error").and_expr("level__gte", 3);
        assert_eq!(q.build().unwrap(), "status: \"error\" AND level: >=3");
    }

    #[test]
    fn test_sibling_conditions_parenthesized_inside_group() {
        let pair = Q::expr("status", "error").and_expr("region", "us");
        let q = pair | Q::expr("level__gte", 5);
        assert_eq!(
            q.build().unwrap(),
            "(status: \"error\" AND region: \"us\") OR level: >=5"
        );
    }

    #[test]
    fn test_elided_sibling_leaves_single_condition_unwrapped() {
        // INCLUDE 条件剥掉通配符后为空，被整体省略
        let pair = Q::expr("message__include", "***").and_expr("level__gte", 3);
        let q = pair | Q::expr("status", "error");
        assert_eq!(q.build().unwrap(), "level: >=3 OR status: \"error\"");
    }

    #[test]
    fn test_escape_in_include() {
        let q = Q::expr("message__include", "error: test");
        assert_eq!(q.build().unwrap(), "message: *error\\:\\ test*");
    }

    #[test]
    fn test_escape_in_equal() {
        let q = Q::expr("message", "say \"hello\"");
        assert_eq!(q.build().unwrap(), "message: \"say \\\"hello\\\"\"");
    }

    #[test]
    fn test_absorptive_laws_compiled_equality() {
        let a = Q::expr("status", "error") | Q::expr("level__gte", 3);
        assert_eq!(
            (a.clone() & Q::new()).build().unwrap(),
            a.build().unwrap()
        );
        assert_eq!((Q::new() | a.clone()).build().unwrap(), a.build().unwrap());
    }

    #[test]
    fn test_nested_mixed_connectors() {
        let q = Q::expr("a", 1) & (Q::expr("b", 2) | (Q::expr("c", 3) & Q::expr("d", 4)));
        assert_eq!(
            q.build().unwrap(),
            "a: \"1\" AND (b: \"2\" OR (c: \"3\" AND d: \"4\"))"
        );
    }

    #[test]
    fn test_not_inside_and() {
        let q = Q::expr("app", "myapp") & !Q::expr("status", "ok");
        assert_eq!(
            q.build().unwrap(),
            "app: \"myapp\" AND NOT (status: \"ok\")"
        );
    }
}
