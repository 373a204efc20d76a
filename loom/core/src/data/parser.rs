//! `.rui` text parser

use crate::error::{LoomError, LoomResult};

use super::{DataNode, DataObject, DataValue};

/// Parse `.rui` text into a [`DataObject`]
pub fn parse_data_text(text: &str) -> LoomResult<DataObject> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut parser = Parser::new(&text);
    parser.skip_spaces(true);
    let tag = parser.parse_token()?;
    parser.skip_spaces(true);
    let object = parser.parse_object(tag)?;
    parser.skip_spaces(true);
    if parser.peek().is_some() {
        return Err(parser.error("unexpected text after the root object"));
    }
    Ok(object)
}

struct Parser {
    data: Vec<char>,
    pos: usize,
    line: usize,
    line_start: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            data: text.chars().collect(),
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.data.get(self.pos + offset).copied()
    }

    fn error(&self, message: &str) -> LoomError {
        LoomError::invalid(
            ".rui text",
            format!(
                "{message} (line: {}, position: {})",
                self.line,
                self.pos.saturating_sub(self.line_start)
            ),
        )
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos + 1;
    }

    fn starts_comment(&self) -> bool {
        self.peek() == Some('/') && matches!(self.peek_at(1), Some('/' | '*'))
    }

    /// Skip blanks and comments; newlines only when `skip_new_line`
    fn skip_spaces(&mut self, skip_new_line: bool) {
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => {
                    if !skip_new_line {
                        return;
                    }
                    self.new_line();
                    self.pos += 1;
                }
                '/' if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                '/' if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => return,
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.pos += 2;
                                break;
                            }
                            Some('\n') => {
                                self.new_line();
                                self.pos += 1;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                c if c.is_whitespace() => self.pos += 1,
                _ => return,
            }
        }
    }

    fn is_stop_symbol(&self, ch: char) -> bool {
        ch.is_whitespace()
            || matches!(ch, '=' | '{' | '}' | '[' | ']' | ',' | '\'' | '"' | '`')
            || (ch == '/' && self.starts_comment())
    }

    /// Bare, quoted or backtick-raw token; an empty result is allowed
    fn parse_token(&mut self) -> LoomResult<String> {
        match self.peek() {
            None => Err(self.error("unexpected end of text")),
            Some('`') => {
                self.pos += 1;
                let start = self.pos;
                while self.peek() != Some('`') {
                    match self.peek() {
                        None => return Err(self.error("unexpected end of text")),
                        Some('\n') => {
                            self.new_line();
                            self.pos += 1;
                        }
                        Some(_) => self.pos += 1,
                    }
                }
                let token = self.data[start..self.pos].iter().collect();
                self.pos += 1;
                self.skip_spaces(false);
                Ok(token)
            }
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let token = self.parse_quoted(quote)?;
                self.skip_spaces(false);
                Ok(token)
            }
            Some(_) => {
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if self.is_stop_symbol(ch) {
                        break;
                    }
                    self.pos += 1;
                }
                let token = self.data[start..self.pos].iter().collect();
                self.skip_spaces(false);
                Ok(token)
            }
        }
    }

    fn parse_quoted(&mut self, quote: char) -> LoomResult<String> {
        let mut result = String::new();
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.error("unexpected end of text"));
            };
            self.pos += 1;
            if ch == quote {
                return Ok(result);
            }
            if ch != '\\' {
                result.push(ch);
                continue;
            }

            let Some(escape) = self.peek() else {
                return Err(self.error("unexpected end of text"));
            };
            self.pos += 1;
            match escape {
                'n' => result.push('\n'),
                'r' => result.push('\r'),
                't' => result.push('\t'),
                '"' => result.push('"'),
                '\'' => result.push('\''),
                '\\' => result.push('\\'),
                'x' | 'X' => result.push(self.parse_hex_escape(2)?),
                'u' | 'U' => result.push(self.parse_hex_escape(4)?),
                _ => return Err(self.error("invalid escape sequence")),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> LoomResult<char> {
        let mut text = String::with_capacity(digits);
        for _ in 0..digits {
            let ch = self.peek().ok_or_else(|| self.error("invalid escape sequence"))?;
            text.push(ch);
            self.pos += 1;
        }
        let bytes = hex::decode(&text).map_err(|_| self.error("invalid escape sequence"))?;
        let code = bytes.iter().fold(0u32, |code, byte| (code << 8) | u32::from(*byte));
        char::from_u32(code).ok_or_else(|| self.error("invalid escape sequence"))
    }

    /// `{ node, node\n node }`; the cursor is on `{`
    fn parse_object(&mut self, tag: String) -> LoomResult<DataObject> {
        if self.peek() != Some('{') {
            return Err(self.error("expected '{'"));
        }
        self.pos += 1;

        let mut object = DataObject::new(tag);
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(self.error("unexpected end of text")),
                Some('}') => {
                    self.pos += 1;
                    self.skip_spaces(false);
                    return Ok(object);
                }
                Some(_) => {
                    let node = self.parse_node()?;
                    object.nodes.push(node);
                    self.skip_spaces(false);
                    match self.peek() {
                        Some('}' | ',' | '\n') => {}
                        None => return Err(self.error("unexpected end of text")),
                        Some(_) => return Err(self.error("expected '}', '\\n' or ','")),
                    }
                }
            }
        }
    }

    fn skip_separators(&mut self) {
        loop {
            self.skip_spaces(true);
            if self.peek() == Some(',') {
                self.pos += 1;
            } else {
                return;
            }
        }
    }

    fn parse_node(&mut self) -> LoomResult<DataNode> {
        let tag = self.parse_token()?;
        self.skip_spaces(true);
        if self.peek() != Some('=') {
            return Err(self.error("expected '=' after a tag name"));
        }
        self.pos += 1;
        self.skip_spaces(true);

        let value = match self.peek() {
            None => return Err(self.error("unexpected end of text")),
            Some('[') => DataValue::Array(self.parse_array()?),
            Some('{') => DataValue::Object(self.parse_object("_".to_string())?),
            Some('}' | ']' | '=') => {
                return Err(self.error("expected '[', '{' or a tag name after '='"));
            }
            Some(_) => self.parse_text_or_object()?,
        };
        Ok(DataNode { tag, value })
    }

    fn parse_text_or_object(&mut self) -> LoomResult<DataValue> {
        let token = self.parse_token()?;
        if self.peek() == Some('{') {
            Ok(DataValue::Object(self.parse_object(token)?))
        } else {
            Ok(DataValue::Text(token))
        }
    }

    /// `[ item, item ]`; the cursor is on `[`
    fn parse_array(&mut self) -> LoomResult<Vec<DataValue>> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(self.error("unexpected end of text")),
                Some(']') => {
                    self.pos += 1;
                    self.skip_spaces(false);
                    return Ok(items);
                }
                Some(_) => {
                    items.push(self.parse_text_or_object()?);
                    self.skip_spaces(false);
                    match self.peek() {
                        Some(']' | ',' | '\n') => {}
                        None => return Err(self.error("unexpected end of text")),
                        Some(_) => return Err(self.error("expected ']' or ','")),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_inline_event() {
        let object =
            parse_data_text("click-event{id=id000001, timeStamp=1700, button=0}").unwrap();
        assert_eq!(object.tag(), "click-event");
        assert_eq!(object.property_value("id"), Some("id000001"));
        assert_eq!(object.property_value("button"), Some("0"));
        assert_eq!(object.len(), 3);
    }

    #[test]
    fn test_parse_nested_and_arrays() {
        let text = r#"
            resize {
                views = [
                    view{id=id000002, x=0, y=0, width=100, height=20},
                    view{id=id000003, x=0, y=20, width=100, height=20}
                ]
                list = [a, "b c", `raw\n`]
                obj = _{ k = v }
                typed = border{ style = solid }
            }
        "#;
        let object = parse_data_text(text).unwrap();
        let views = object.property_array("views").unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(
            views[1].as_object().unwrap().property_value("y"),
            Some("20")
        );

        let list = object.property_array("list").unwrap();
        assert_eq!(
            list,
            &[
                DataValue::from("a"),
                DataValue::from("b c"),
                DataValue::from("raw\\n")
            ]
        );
        assert_eq!(object.property_object("obj").unwrap().tag(), "_");
        assert_eq!(object.property_object("typed").unwrap().tag(), "border");
    }

    #[test]
    fn test_parse_escapes() {
        let object =
            parse_data_text(r#"obj{ text = "a\n\t\"q\" \x41é\\", single = 'it\'s' }"#)
                .unwrap();
        assert_eq!(object.property_value("text"), Some("a\n\t\"q\" Aé\\"));
        assert_eq!(object.property_value("single"), Some("it's"));

        assert!(parse_data_text(r#"obj{ text = "\q" }"#).is_err());
        assert!(parse_data_text(r#"obj{ text = "\xZZ" }"#).is_err());
    }

    #[test]
    fn test_parse_comments_and_slashes() {
        let text = "obj { // line comment\n  path = images/logo.png, /* block\n comment */ n = 1 }";
        let object = parse_data_text(text).unwrap();
        assert_eq!(object.property_value("path"), Some("images/logo.png"));
        assert_eq!(object.property_value("n"), Some("1"));
    }

    #[test]
    fn test_parse_errors_report_position() {
        let err = parse_data_text("obj {\n a b }").unwrap_err();
        assert!(err.to_string().contains("line: 2"), "{err}");

        assert!(parse_data_text("obj { a = ").is_err());
        assert!(parse_data_text("obj { a = } ").is_err());
        assert!(parse_data_text("obj { a = 1 } extra").is_err());
        assert!(parse_data_text("obj { a = \"open }").is_err());
    }

    #[test]
    fn test_parse_empty_object() {
        let object = parse_data_text("session-close{}").unwrap();
        assert_eq!(object.tag(), "session-close");
        assert!(object.is_empty());
    }
}
