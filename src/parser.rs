//! 条件表达式的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ parse_clause()  (子句之间用 ';' 或 AND 分隔，循环解析)
//!        ├─ 解析字段名 (Identifier，允许点路径)
//!        ├─ EXISTS / MISSING → 存在性条件（无值）
//!        └─ 比较运算符 → parse_values()
//!             ├─ '(' → 逗号分隔的值列表（多值条件，组关系 OR）
//!             └─ 其他 → 单个字面值
//! ```
//!
//! ## 支持的语法结构
//!
//! ```text
//! expression := clause ((';' | AND) clause)*
//! clause     := field op value
//!             | field op '(' value (',' value)* ')'
//!             | field EXISTS
//!             | field MISSING
//! op         := '=' | '!=' | '~' | '!~' | '>' | '>=' | '<' | '<='
//! value      := "带引号字符串" | 数字 | 裸词
//! ```
//!
//! ### 运算符与条件操作符的对应
//!
//! - `=` / `!=` → EQUAL / NOT_EQUAL
//! - `~` / `!~` → INCLUDE / NOT_INCLUDE
//! - `>` `>=` `<` `<=` → GT / GTE / LT / LTE
//! - `EXISTS` / `MISSING` → EXISTS / NOT_EXISTS
//!
//! ## 解析示例
//!
//! ```text
//! // 简单条件
//! status = "error"
//!
//! // 多个条件与多值
//! status = ("error", "warning"); level >= 3
//!
//! // 嵌套字段与存在性检查
//! log.level >= 3 AND trace_id exists
//! ```

use crate::condition::{ConditionItem, QueryValue};
use crate::error::{EsQueryError, Result};
use crate::lexer::Lexer;
use crate::operators::QueryStringOperator;
use crate::token::{Token, TokenKind};

/// 把条件表达式解析为条件列表的接口
///
/// 默认实现是 [`DefaultConditionParser`]，调用方可以实现该 trait
/// 接入自己的条件语法。
pub trait ConditionParser {
    fn parse(&self, expression: &str) -> Result<Vec<ConditionItem>>;
}

/// 默认条件表达式语法的解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConditionParser;

impl DefaultConditionParser {
    pub fn new() -> Self {
        Self
    }
}

impl ConditionParser for DefaultConditionParser {
    fn parse(&self, expression: &str) -> Result<Vec<ConditionItem>> {
        let tokens: Vec<Token> = Lexer::new(expression).collect();
        Parser::new(&tokens).parse()
    }
}

struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&Token<'a>> {
        if self.position < self.tokens.len() {
            let token = &self.tokens[self.position];
            self.position += 1;
            Some(token)
        } else {
            None
        }
    }

    fn parse(&mut self) -> Result<Vec<ConditionItem>> {
        let mut items = Vec::new();
        if self.peek().is_none() {
            return Ok(items); // 空表达式解析为空条件列表
        }

        loop {
            items.push(self.parse_clause()?);

            match self.peek() {
                None => break,
                Some(token) => match token.kind {
                    TokenKind::Semicolon | TokenKind::And => {
                        self.advance(); // 消费分隔符
                        if self.peek().is_none() {
                            break; // 允许尾随分隔符
                        }
                    }
                    _ => {
                        return Err(EsQueryError::parse(
                            format!("Expected ';' or AND between clauses, found {:?}", token.kind),
                            Some(token.span),
                        ));
                    }
                },
            }
        }

        Ok(items)
    }

    /// 解析一个子句：字段名 + 运算符 + 值
    fn parse_clause(&mut self) -> Result<ConditionItem> {
        let Some(field_token) = self.advance() else {
            return Err(EsQueryError::parse(
                "Expected field identifier, but reached end of input".to_string(),
                None,
            ));
        };
        let field = match field_token.kind {
            TokenKind::Identifier(name) => name.to_string(),
            _ => {
                return Err(EsQueryError::parse(
                    format!("Expected field identifier, found {:?}", field_token.kind),
                    Some(field_token.span),
                ));
            }
        };

        let Some(op_token) = self.advance() else {
            return Err(EsQueryError::parse(
                format!("Expected operator after field '{}'", field),
                None,
            ));
        };
        let operator = match op_token.kind {
            // 存在性检查没有值部分
            TokenKind::Exists => {
                return Ok(ConditionItem::new(
                    field,
                    QueryStringOperator::Exists,
                    Vec::new(),
                ));
            }
            TokenKind::Missing => {
                return Ok(ConditionItem::new(
                    field,
                    QueryStringOperator::NotExists,
                    Vec::new(),
                ));
            }
            TokenKind::Eq => QueryStringOperator::Equal,
            TokenKind::NotEq => QueryStringOperator::NotEqual,
            TokenKind::Tilde => QueryStringOperator::Include,
            TokenKind::NotTilde => QueryStringOperator::NotInclude,
            TokenKind::Gt => QueryStringOperator::Gt,
            TokenKind::Gte => QueryStringOperator::Gte,
            TokenKind::Lt => QueryStringOperator::Lt,
            TokenKind::Lte => QueryStringOperator::Lte,
            _ => {
                return Err(EsQueryError::parse(
                    format!("Expected comparison operator, found {:?}", op_token.kind),
                    Some(op_token.span),
                ));
            }
        };

        let values = self.parse_values()?;
        Ok(ConditionItem::new(field, operator, values))
    }

    /// 解析值部分：单个字面值，或括号包围的逗号分隔列表
    fn parse_values(&mut self) -> Result<Vec<QueryValue>> {
        if !matches!(self.peek().map(|t| &t.kind), Some(TokenKind::LParen)) {
            return Ok(vec![self.parse_literal()?]);
        }

        self.advance(); // 消费 '('
        let mut values = Vec::new();

        if !matches!(self.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
            loop {
                values.push(self.parse_literal()?);
                match self.peek() {
                    Some(token) if token.kind == TokenKind::RParen => break,
                    Some(token) if token.kind == TokenKind::Comma => {
                        self.advance(); // 消费 ','
                    }
                    Some(token) => {
                        return Err(EsQueryError::parse(
                            format!("Expected ',' or ')', found {:?}", token.kind),
                            Some(token.span),
                        ));
                    }
                    None => {
                        return Err(EsQueryError::parse(
                            "Expected ')', but reached end of input".to_string(),
                            None,
                        ));
                    }
                }
            }
        }

        self.advance(); // 消费 ')'
        Ok(values)
    }

    fn parse_literal(&mut self) -> Result<QueryValue> {
        let Some(token) = self.advance() else {
            return Err(EsQueryError::parse(
                "Expected literal value, but reached end of input".to_string(),
                None,
            ));
        };
        match token.kind {
            TokenKind::String(s) => Ok(QueryValue::from(s)),
            TokenKind::Int(n) => Ok(QueryValue::Int(n)),
            TokenKind::Float(x) => Ok(QueryValue::Float(x)),
            // 不带引号的裸词
            TokenKind::Identifier(s) => Ok(QueryValue::from(s)),
            _ => Err(EsQueryError::parse(
                format!("Expected literal value, found {:?}", token.kind),
                Some(token.span),
            )),
        }
    }
}
