//! Query String 特殊字符转义工具

/// Query String 语法中的保留字符，出现在值里必须转义
const RESERVED_CHARS: &[char] = &[
    '+', '-', '=', '&', '|', '>', '<', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*',
    '?', ':', '\\', '/', ' ',
];

fn is_reserved(c: char) -> bool {
    RESERVED_CHARS.contains(&c)
}

/// 转义字符串中的所有保留字符
///
/// 从左到右扫描，已经是 `\x` 形式的转义序列原样保留，
/// 因此对已转义的字符串再次调用是无操作（幂等）。
pub fn escape_query_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if is_reserved(next) {
                    // 已转义的序列，跳过不再处理
                    out.push(c);
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        if is_reserved(c) {
            out.push('\\');
        }
        out.push(c);
    }

    out
}

/// 批量转义，保持输入顺序
pub fn escape_query_strings<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(escape_query_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_space() {
        assert_eq!(escape_query_string("hello world"), "hello\\ world");
    }

    #[test]
    fn test_escape_plus() {
        assert_eq!(escape_query_string("hello+world"), "hello\\+world");
    }

    #[test]
    fn test_escape_minus() {
        assert_eq!(escape_query_string("hello-world"), "hello\\-world");
    }

    #[test]
    fn test_escape_colon() {
        assert_eq!(escape_query_string("key:value"), "key\\:value");
    }

    #[test]
    fn test_escape_asterisk() {
        assert_eq!(escape_query_string("test*"), "test\\*");
    }

    #[test]
    fn test_escape_question_mark() {
        assert_eq!(escape_query_string("test?"), "test\\?");
    }

    #[test]
    fn test_escape_parentheses() {
        assert_eq!(escape_query_string("(test)"), "\\(test\\)");
    }

    #[test]
    fn test_escape_brackets() {
        assert_eq!(escape_query_string("[test]"), "\\[test\\]");
    }

    #[test]
    fn test_escape_braces() {
        assert_eq!(escape_query_string("{test}"), "\\{test\\}");
    }

    #[test]
    fn test_escape_double_quote() {
        assert_eq!(escape_query_string("\"test\""), "\\\"test\\\"");
    }

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape_query_string("test\\path"), "test\\\\path");
    }

    #[test]
    fn test_escape_multiple_chars() {
        assert_eq!(
            escape_query_string("key: value + test"),
            "key\\:\\ value\\ \\+\\ test"
        );
    }

    #[test]
    fn test_no_double_escape() {
        assert_eq!(escape_query_string("test\\:value"), "test\\:value");
    }

    #[test]
    fn test_escape_is_idempotent() {
        let inputs = [
            "hello world",
            "key: value + test",
            "test\\path",
            "a+b-c:d*e?f",
            "\"quoted\"",
            "trailing\\",
        ];
        for input in inputs {
            let once = escape_query_string(input);
            let twice = escape_query_string(&once);
            assert_eq!(once, twice, "escaping not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_every_reserved_char_escaped_once() {
        for &c in RESERVED_CHARS {
            let input = format!("a{}b", c);
            let escaped = escape_query_string(&input);
            assert_eq!(escaped, format!("a\\{}b", c));
        }
    }

    #[test]
    fn test_escape_many() {
        assert_eq!(
            escape_query_strings(["a+b", "c:d"]),
            vec!["a\\+b".to_string(), "c\\:d".to_string()]
        );
    }

    #[test]
    fn test_escape_many_preserves_order() {
        assert_eq!(
            escape_query_strings(["z z", "a a"]),
            vec!["z\\ z".to_string(), "a\\ a".to_string()]
        );
    }
}
