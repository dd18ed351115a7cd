//! Query String 转换器
//!
//! 把外部条件表达式经 解析 → 字段映射 → 编译 三步转换为 Query String，
//! 对应一次完整的查询构建流水线。

use crate::builder::QueryStringBuilder;
use crate::dsl::DslQueryBuilder;
use crate::error::Result;
use crate::fields::FieldMapper;
use crate::operators::LogicOperator;
use crate::parser::{ConditionParser, DefaultConditionParser};
use serde_json::Value;

/// 条件表达式到 Query String 的转换器
///
/// ```
/// use elasticflow::QueryStringTransformer;
///
/// let transformer = QueryStringTransformer::new();
/// let query = transformer.transform(r#"status = "error"; level >= 3"#).unwrap();
/// assert_eq!(query, "status: \"error\" AND level: >=3");
/// ```
pub struct QueryStringTransformer {
    parser: Box<dyn ConditionParser>,
    field_mapper: Option<FieldMapper>,
    logic_operator: LogicOperator,
}

impl QueryStringTransformer {
    /// 使用默认语法的转换器
    pub fn new() -> Self {
        Self::with_parser(Box::new(DefaultConditionParser::new()))
    }

    /// 使用自定义条件语法的转换器
    pub fn with_parser(parser: Box<dyn ConditionParser>) -> Self {
        Self {
            parser,
            field_mapper: None,
            logic_operator: LogicOperator::default(),
        }
    }

    pub fn with_field_mapper(mut self, field_mapper: FieldMapper) -> Self {
        self.field_mapper = Some(field_mapper);
        self
    }

    pub fn with_logic_operator(mut self, logic_operator: LogicOperator) -> Self {
        self.logic_operator = logic_operator;
        self
    }

    /// 把条件表达式转换为 Query String
    pub fn transform(&self, expression: &str) -> Result<String> {
        let mut builder = QueryStringBuilder::with_config(self.logic_operator, None);
        for item in self.parse_mapped(expression)? {
            builder.add_condition(item);
        }
        builder.build()
    }

    /// 把条件表达式转换为 DSL bool 查询
    pub fn transform_to_dsl(&self, expression: &str) -> Result<Value> {
        let mut builder = DslQueryBuilder::with_logic_operator(self.logic_operator);
        for item in self.parse_mapped(expression)? {
            builder.add_condition(item);
        }
        builder.build()
    }

    /// 合并已经编译好的 Query String 片段，空白片段被忽略
    pub fn merge(&self, parts: &[&str]) -> String {
        let terms: Vec<String> = parts
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("({})", p))
            .collect();
        if terms.len() == 1 {
            // 单个片段不需要括号消歧
            return parts
                .iter()
                .find(|p| !p.trim().is_empty())
                .map(|p| p.to_string())
                .unwrap_or_default();
        }
        terms.join(&format!(" {} ", self.logic_operator.keyword()))
    }

    fn parse_mapped(&self, expression: &str) -> Result<Vec<crate::condition::ConditionItem>> {
        let items = self.parser.parse(expression)?;
        Ok(match &self.field_mapper {
            Some(mapper) => items.iter().map(|item| mapper.apply(item)).collect(),
            None => items,
        })
    }
}

impl Default for QueryStringTransformer {
    fn default() -> Self {
        Self::new()
    }
}
