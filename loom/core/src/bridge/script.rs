//! JavaScript call rendering
//!
//! Every outbound statement that calls a client helper is rendered here:
//! `name(arg1, arg2);` with each argument written as a JavaScript literal.

use std::fmt::Write;

use crate::values::{format_float, Color};

/// One argument of a client helper call
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptArg {
    /// String literal, single quoted and escaped
    Text(String),
    /// Integer literal
    Int(i64),
    /// Number literal
    Float(f64),
    /// `true` / `false`
    Bool(bool),
    /// Array of numbers, `[1,2.5]`
    Floats(Vec<f64>),
    /// Bare identifier of a script variable (canvas gradients, paths)
    Var(String),
}

impl ScriptArg {
    /// JavaScript literal of the argument
    #[must_use]
    pub fn to_js(&self) -> String {
        match self {
            Self::Text(text) => quote(text),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Bool(b) => b.to_string(),
            Self::Floats(values) => {
                let items: Vec<String> = values.iter().map(|v| format_float(*v)).collect();
                format!("[{}]", items.join(","))
            }
            Self::Var(name) => name.clone(),
        }
    }
}

/// Single-quoted JavaScript string literal of `text`
#[must_use]
pub fn quote(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            '\u{b}' => result.push_str("\\v"),
            _ => result.push(ch),
        }
    }
    result.push('\'');
    result
}

/// `name(args...);`
#[must_use]
pub fn call_func_script(name: &str, args: &[ScriptArg]) -> String {
    let mut script = String::with_capacity(name.len() + 16);
    script.push_str(name);
    script.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            script.push_str(", ");
        }
        let _ = write!(script, "{}", arg.to_js());
    }
    script.push_str(");");
    script
}

impl From<&str> for ScriptArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScriptArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ScriptArg {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ScriptArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ScriptArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ScriptArg {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for ScriptArg {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ScriptArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ScriptArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<f64>> for ScriptArg {
    fn from(value: Vec<f64>) -> Self {
        Self::Floats(value)
    }
}

impl From<Color> for ScriptArg {
    fn from(value: Color) -> Self {
        Self::Text(value.css_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote("a\\b"), r"'a\\b'");
        assert_eq!(quote("line\nnext\ttab"), r"'line\nnext\ttab'");
        assert_eq!(quote("\u{8}\u{c}\u{b}\r"), r"'\b\f\v\r'");
    }

    #[test]
    fn test_call_func_script() {
        assert_eq!(
            call_func_script(
                "updateCSSProperty",
                &["id000003".into(), "width".into(), "10px".into()]
            ),
            "updateCSSProperty('id000003', 'width', '10px');"
        );
        assert_eq!(call_func_script("scanElementsSize", &[]), "scanElementsSize();");
    }

    #[test]
    fn test_argument_literals() {
        assert_eq!(ScriptArg::from(2.5).to_js(), "2.5");
        assert_eq!(ScriptArg::from(3.0).to_js(), "3");
        assert_eq!(ScriptArg::from(-7_i64).to_js(), "-7");
        assert_eq!(ScriptArg::from(false).to_js(), "false");
        assert_eq!(ScriptArg::from(vec![1.0, 0.5]).to_js(), "[1,0.5]");
        assert_eq!(ScriptArg::Var("v1".into()).to_js(), "v1");
        assert_eq!(ScriptArg::from(Color::RED).to_js(), "'rgb(255,0,0)'");
    }
}
