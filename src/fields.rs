//! 查询字段与字段名映射
//!
//! `QueryField` 为单个字段提供各操作符的条件工厂方法；`FieldMapper`
//! 负责把调用方的外部字段名映射为索引里的实际字段名。

use crate::condition::{ConditionItem, QueryValue};
use crate::error::{EsQueryError, Result};
use crate::operators::{GroupRelation, QueryStringOperator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 查询字段句柄
///
/// 生成的条件可以直接交给 `QueryStringBuilder` 或 `DslQueryBuilder`：
///
/// ```
/// use elasticflow::{QueryField, QueryStringBuilder};
///
/// let level = QueryField::new("level");
/// let mut builder = QueryStringBuilder::new();
/// builder.add_condition(level.gte(3));
/// assert_eq!(builder.build().unwrap(), "level: >=3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    name: String,
}

impl QueryField {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn condition(&self, operator: QueryStringOperator, values: Vec<QueryValue>) -> ConditionItem {
        ConditionItem::new(self.name.clone(), operator, values)
    }

    pub fn equal(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Equal, vec![value.into()])
    }

    /// 多值相等条件，值之间的组合关系由调用方给定
    pub fn equal_any<I, V>(&self, values: I, group_relation: GroupRelation) -> ConditionItem
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        ConditionItem::with_relation(
            self.name.clone(),
            QueryStringOperator::Equal,
            values.into_iter().map(Into::into).collect(),
            group_relation,
        )
    }

    pub fn not_equal(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::NotEqual, vec![value.into()])
    }

    pub fn include(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Include, vec![value.into()])
    }

    pub fn not_include(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::NotInclude, vec![value.into()])
    }

    pub fn gt(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Gt, vec![value.into()])
    }

    pub fn gte(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Gte, vec![value.into()])
    }

    pub fn lt(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Lt, vec![value.into()])
    }

    pub fn lte(&self, value: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Lte, vec![value.into()])
    }

    pub fn between(&self, low: impl Into<QueryValue>, high: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Between, vec![low.into(), high.into()])
    }

    pub fn exists(&self) -> ConditionItem {
        self.condition(QueryStringOperator::Exists, Vec::new())
    }

    pub fn not_exists(&self) -> ConditionItem {
        self.condition(QueryStringOperator::NotExists, Vec::new())
    }

    pub fn regex(&self, pattern: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Reg, vec![pattern.into()])
    }

    pub fn not_regex(&self, pattern: impl Into<QueryValue>) -> ConditionItem {
        self.condition(QueryStringOperator::Nreg, vec![pattern.into()])
    }
}

/// 字段名映射表
///
/// 外部字段名到索引字段名的映射，未映射的字段名原样透传，
/// 不做任何 schema 校验。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldMapper {
    /// 外部字段名到索引字段名的映射
    #[serde(flatten)]
    mappings: HashMap<String, String>,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mappings(mappings: HashMap<String, String>) -> Self {
        Self { mappings }
    }

    /// 从JSON文件加载字段映射，文件内容是一个扁平的字符串对象
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(EsQueryError::Config(format!(
                "配置文件不存在: {}",
                path_ref.display()
            )));
        }

        let content = fs::read_to_string(path_ref).map_err(|e| {
            EsQueryError::Config(format!("无法读取配置文件 {}: {}", path_ref.display(), e))
        })?;

        let mappings: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            EsQueryError::Config(format!(
                "无法解析JSON配置文件 {}: {}",
                path_ref.display(),
                e
            ))
        })?;

        Ok(Self { mappings })
    }

    pub fn insert(&mut self, external: impl Into<String>, indexed: impl Into<String>) {
        self.mappings.insert(external.into(), indexed.into());
    }

    /// 获取字段对应的索引字段名，未映射时原样返回
    pub fn map_field(&self, field: &str) -> String {
        self.mappings
            .get(field)
            .cloned()
            .unwrap_or_else(|| field.to_string())
    }

    /// 重写一个条件的字段名，返回新条件，不改动原条件
    pub fn apply(&self, item: &ConditionItem) -> ConditionItem {
        let mut mapped = item.clone();
        mapped.field = self.map_field(&item.field);
        mapped
    }

    /// 获取所有映射
    pub fn mappings(&self) -> &HashMap<String, String> {
        &self.mappings
    }
}
