//! 条件表达式的词法分析器

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 读取数字字面量（整数或小数）
    /// 注意：首字符（数字或负号）已经被调用者消费
    fn read_number(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                self.bump();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.position];
        let kind = if text.contains('.') {
            match text.parse::<f64>() {
                Ok(value) => TokenKind::Float(value),
                Err(_) => TokenKind::Illegal,
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                Err(_) => TokenKind::Illegal,
            }
        };
        Token {
            kind,
            span: Span::new(start, self.position),
        }
    }

    /// 读取双引号包围的字符串字面量
    /// 注意：开始的引号已经被调用者消费
    fn read_string(&mut self, start: usize) -> Token<'a> {
        let content_start = self.position;
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            self.bump();
        }
        let content_end = self.position;
        self.bump(); // 消费结束引号

        let content = &self.input[content_start..content_end];
        Token {
            kind: TokenKind::String(content),
            span: Span::new(start, self.position),
        }
    }

    /// 读取标识符或关键字
    /// 标识符可以包含字母、数字、点、连字符和下划线，点用于嵌套字段路径
    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let literal = &self.input[start..self.position];
        let kind = match_keyword(literal);
        Token {
            kind,
            span: Span::new(start, self.position),
        }
    }
}

fn match_keyword(s: &str) -> TokenKind {
    match s.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "exists" => TokenKind::Exists,
        "missing" => TokenKind::Missing,
        _ => TokenKind::Identifier(s),
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let c = self.bump()?;

        let token = match c {
            '=' => Token { kind: TokenKind::Eq, span: Span::new(start, self.position) },
            '(' => Token { kind: TokenKind::LParen, span: Span::new(start, self.position) },
            ')' => Token { kind: TokenKind::RParen, span: Span::new(start, self.position) },
            ',' => Token { kind: TokenKind::Comma, span: Span::new(start, self.position) },
            ';' => Token { kind: TokenKind::Semicolon, span: Span::new(start, self.position) },
            '~' => Token { kind: TokenKind::Tilde, span: Span::new(start, self.position) },
            '<' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token { kind: TokenKind::Lte, span: Span::new(start, self.position) }
                } else {
                    Token { kind: TokenKind::Lt, span: Span::new(start, self.position) }
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token { kind: TokenKind::Gte, span: Span::new(start, self.position) }
                } else {
                    Token { kind: TokenKind::Gt, span: Span::new(start, self.position) }
                }
            }
            '!' => match self.peek() {
                Some('=') => {
                    self.bump();
                    Token { kind: TokenKind::NotEq, span: Span::new(start, self.position) }
                }
                Some('~') => {
                    self.bump();
                    Token { kind: TokenKind::NotTilde, span: Span::new(start, self.position) }
                }
                _ => Token { kind: TokenKind::Illegal, span: Span::new(start, self.position) },
            },
            '"' => self.read_string(start),
            '-' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number(start),
            c if c.is_ascii_digit() => self.read_number(start),
            c if c.is_alphabetic() => self.read_identifier(start),
            _ => Token { kind: TokenKind::Illegal, span: Span::new(start, self.position) },
        };
        Some(token)
    }
}
