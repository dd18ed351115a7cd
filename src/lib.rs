//! elasticflow - Elasticsearch 查询构建工具库
//!
//! 用于以编程方式组装 Elasticsearch Query String 与结构化 bool 查询，
//! 代替手工拼接字符串。
//!
//! 主要功能:
//!     - `QueryStringBuilder`: 构建 Query String 查询
//!     - `DslQueryBuilder`: 构建 ES DSL bool 查询
//!     - `Q`: 可组合的布尔表达式树
//!     - `QueryStringTransformer`: 把条件表达式转换为查询
//!
//! 使用示例:
//!
//! ```
//! use elasticflow::{QueryStringBuilder, QueryStringOperator};
//!
//! let mut builder = QueryStringBuilder::new();
//! builder.add_filter("status", QueryStringOperator::Equal, ["error"]);
//! assert_eq!(builder.build().unwrap(), "status: \"error\"");
//! ```

pub mod builder;
pub mod condition;
pub mod dsl;
pub mod error;
pub mod escape;
pub mod fields;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod query;
pub mod token;
pub mod transformer;

pub use builder::QueryStringBuilder;
pub use condition::{ConditionItem, QueryValue};
pub use dsl::DslQueryBuilder;
pub use error::{EsQueryError, Result};
pub use escape::{escape_query_string, escape_query_strings};
pub use fields::{FieldMapper, QueryField};
pub use operators::{
    GroupRelation, LogicOperator, OperatorMapping, OperatorSpec, QueryStringOperator,
};
pub use parser::{ConditionParser, DefaultConditionParser};
pub use query::Q;
pub use transformer::QueryStringTransformer;
