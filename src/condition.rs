//! 条件模型与条件编译器
//!
//! `ConditionItem` 是查询编译的原子单元。Q 表达式树和 `QueryStringBuilder`
//! 都通过这里的渲染逻辑把 (字段, 操作符, 值列表) 编译为 Query String 片段。

use crate::error::{EsQueryError, Result};
use crate::escape::escape_query_string;
use crate::operators::{GroupRelation, OperatorMapping, OperatorSpec, QueryStringOperator};
use std::fmt;

/// 字面量值
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(s) => write!(f, "{}", s),
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::Float(x) => write!(f, "{}", x),
            QueryValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::String(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::String(s)
    }
}

impl From<i64> for QueryValue {
    fn from(n: i64) -> Self {
        QueryValue::Int(n)
    }
}

impl From<i32> for QueryValue {
    fn from(n: i32) -> Self {
        QueryValue::Int(n as i64)
    }
}

impl From<u32> for QueryValue {
    fn from(n: u32) -> Self {
        QueryValue::Int(n as i64)
    }
}

impl From<f64> for QueryValue {
    fn from(x: f64) -> Self {
        QueryValue::Float(x)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Bool(b)
    }
}

/// 代表对单个字段的一个过滤条件
///
/// 值列表为空时条件编译为空串并被上层省略（EXISTS/NOT_EXISTS 除外，
/// 它们不使用值）。BETWEEN 必须正好两个值，否则编译报错。
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionItem {
    pub field: String,
    pub operator: OperatorSpec,
    pub values: Vec<QueryValue>,
    /// 多个值之间的组合关系，只在值多于一个时有意义
    pub group_relation: GroupRelation,
}

impl ConditionItem {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<OperatorSpec>,
        values: Vec<QueryValue>,
    ) -> Self {
        Self::with_relation(field, operator, values, GroupRelation::default())
    }

    pub fn with_relation(
        field: impl Into<String>,
        operator: impl Into<OperatorSpec>,
        values: Vec<QueryValue>,
        group_relation: GroupRelation,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values,
            group_relation,
        }
    }

    /// 把条件编译为 Query String 片段
    ///
    /// 操作符在这里才做解析，未知操作符在此报错而不是在构造时。
    pub fn compile(&self, mapping: Option<&OperatorMapping>) -> Result<String> {
        let operator = self.operator.resolve(mapping, &self.field)?;
        match operator {
            QueryStringOperator::Equal => Ok(self.render_equal()),
            QueryStringOperator::NotEqual => Ok(negate(self.render_equal())),
            QueryStringOperator::Include => Ok(self.render_include()),
            QueryStringOperator::NotInclude => Ok(negate(self.render_include())),
            QueryStringOperator::Gt => Ok(self.render_range(">")),
            QueryStringOperator::Gte => Ok(self.render_range(">=")),
            QueryStringOperator::Lt => Ok(self.render_range("<")),
            QueryStringOperator::Lte => Ok(self.render_range("<=")),
            QueryStringOperator::Between => self.render_between(),
            QueryStringOperator::Exists => Ok(format!("{}: *", self.field)),
            QueryStringOperator::NotExists => Ok(format!("NOT {}: *", self.field)),
            QueryStringOperator::Reg => Ok(self.render_regex()),
            QueryStringOperator::Nreg => Ok(negate(self.render_regex())),
        }
    }

    /// 单值直接拼接，多值用组关系括号连接
    fn join_terms(&self, terms: &[String]) -> String {
        if terms.len() == 1 {
            format!("{}: {}", self.field, terms[0])
        } else {
            let sep = format!(" {} ", self.group_relation.keyword());
            format!("{}: ({})", self.field, terms.join(&sep))
        }
    }

    fn render_equal(&self) -> String {
        let terms: Vec<String> = self.values.iter().map(quote_phrase).collect();
        if terms.is_empty() {
            return String::new();
        }
        self.join_terms(&terms)
    }

    fn render_include(&self) -> String {
        let terms: Vec<String> = self
            .values
            .iter()
            .filter_map(wildcard_term)
            .map(|t| format!("*{}*", t))
            .collect();
        if terms.is_empty() {
            return String::new();
        }
        self.join_terms(&terms)
    }

    fn render_range(&self, glyph: &str) -> String {
        let terms: Vec<String> = self
            .values
            .iter()
            .map(|v| format!("{}{}", glyph, v))
            .collect();
        if terms.is_empty() {
            return String::new();
        }
        self.join_terms(&terms)
    }

    fn render_between(&self) -> Result<String> {
        if self.values.len() != 2 {
            return Err(EsQueryError::InvalidValueCount {
                operator: "BETWEEN",
                required: 2,
                actual: self.values.len(),
            });
        }
        Ok(format!(
            "{}: [{} TO {}]",
            self.field, self.values[0], self.values[1]
        ))
    }

    fn render_regex(&self) -> String {
        let terms: Vec<String> = self.values.iter().map(|v| format!("/{}/", v)).collect();
        if terms.is_empty() {
            return String::new();
        }
        self.join_terms(&terms)
    }
}

/// 非空片段加 NOT 前缀，空片段保持省略
fn negate(inner: String) -> String {
    if inner.is_empty() {
        inner
    } else {
        format!("NOT {}", inner)
    }
}

/// EQUAL 用短语引号包裹，值里的双引号转义
///
/// 短语内部不经过通用转义器，引号已经保证了语法安全。
fn quote_phrase(value: &QueryValue) -> String {
    format!("\"{}\"", value.to_string().replace('"', "\\\""))
}

/// INCLUDE 的单个值：去掉首尾通配符后转义，结果为空则整个值被丢弃
fn wildcard_term(value: &QueryValue) -> Option<String> {
    match value {
        QueryValue::String(s) => {
            let stripped = s.trim_matches('*');
            if stripped.is_empty() {
                None
            } else {
                Some(escape_query_string(stripped))
            }
        }
        other => Some(other.to_string()),
    }
}
