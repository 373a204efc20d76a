//! `.rui` text writer

use super::{DataObject, DataValue};

/// Arrays of plain texts shorter than this are written on one line
const INLINE_ARRAY_LIMIT: usize = 80;

pub(super) fn write_object(object: &DataObject) -> String {
    let mut buffer = String::new();
    write_object_body(&mut buffer, object, "");
    buffer
}

fn write_object_body(buffer: &mut String, object: &DataObject, indent: &str) {
    write_text(buffer, object.tag());
    buffer.push_str(" {\n");
    let inner = format!("{indent}\t");
    for node in object.nodes() {
        buffer.push_str(&inner);
        write_text(buffer, &node.tag);
        buffer.push_str(" = ");
        write_value(buffer, &node.value, &inner);
        buffer.push_str(",\n");
    }
    buffer.push_str(indent);
    buffer.push('}');
}

fn write_value(buffer: &mut String, value: &DataValue, indent: &str) {
    match value {
        DataValue::Text(text) => write_text(buffer, text),
        DataValue::Object(object) => write_object_body(buffer, object, indent),
        DataValue::Array(items) => {
            if let Some(inline) = inline_array(items) {
                buffer.push_str(&inline);
                return;
            }
            buffer.push_str("[\n");
            let inner = format!("{indent}\t");
            for item in items {
                buffer.push_str(&inner);
                write_value(buffer, item, &inner);
                buffer.push_str(",\n");
            }
            buffer.push_str(indent);
            buffer.push(']');
        }
    }
}

fn inline_array(items: &[DataValue]) -> Option<String> {
    let mut line = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        write_text(&mut line, item.as_text()?);
    }
    line.push(']');
    (line.len() < INLINE_ARRAY_LIMIT).then_some(line)
}

fn is_plain_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '@' | '/' | '_' | '.' | ':' | '#' | '%' | 'π' | '°')
}

/// Bare when every char is plain, otherwise double-quoted with escapes
fn write_text(buffer: &mut String, text: &str) {
    let bare = !text.is_empty()
        && text.chars().all(is_plain_char)
        && !text.contains("//")
        && !text.contains("/*");
    if bare {
        buffer.push_str(text);
        return;
    }

    buffer.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => buffer.push_str("\\\\"),
            '\t' => buffer.push_str("\\t"),
            '\r' => buffer.push_str("\\r"),
            '\n' => buffer.push_str("\\n"),
            '"' => buffer.push_str("\\\""),
            _ => buffer.push(ch),
        }
    }
    buffer.push('"');
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::parse_data_text;
    use super::*;

    fn sample() -> DataObject {
        let mut nested = DataObject::new("border");
        nested.set_property_value("style", "solid");
        nested.set_property_value("width", "1px");

        let mut item = DataObject::new("view");
        item.set_property_value("id", "id000002");

        let mut object = DataObject::new("root");
        object.set_property_value("key1", "text");
        object.set_property_value("key2", "text 2");
        object.set_property_value("key 3", "line\n\"quoted\"");
        object.set_property_value("color", "#7FD18243");
        object.set_property_object("border", nested);
        object.set_property("short", DataValue::Array(vec!["a".into(), "b".into()]));
        object.set_property(
            "views",
            DataValue::Array(vec![DataValue::Object(item), "x".into()]),
        );
        object.set_property_value("empty", "");
        object
    }

    #[test]
    fn test_write_layout() {
        let expected = "root {\n\
            \tkey1 = text,\n\
            \tkey2 = \"text 2\",\n\
            \t\"key 3\" = \"line\\n\\\"quoted\\\"\",\n\
            \tcolor = #7FD18243,\n\
            \tborder = border {\n\
            \t\tstyle = solid,\n\
            \t\twidth = 1px,\n\
            \t},\n\
            \tshort = [a, b],\n\
            \tviews = [\n\
            \t\tview {\n\
            \t\t\tid = id000002,\n\
            \t\t},\n\
            \t\tx,\n\
            \t],\n\
            \tempty = \"\",\n\
            }";
        assert_eq!(sample().to_string(), expected);
    }

    #[test]
    fn test_written_text_parses_back() {
        let object = sample();
        let parsed = parse_data_text(&object.to_string()).unwrap();
        assert_eq!(parsed, object);
    }

    #[test]
    fn test_comment_like_text_is_quoted() {
        let mut object = DataObject::new("o");
        object.set_property_value("url", "http://host/path");
        let text = object.to_string();
        assert!(text.contains("\"http://host/path\""), "{text}");
        assert_eq!(
            parse_data_text(&text).unwrap().property_value("url"),
            Some("http://host/path")
        );
    }
}
