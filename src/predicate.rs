//! Equality predicates for the remote query grammar.

use serde_json::Value;

/// A single field-equality filter, rendered as an `at(field, value)` fragment
/// of the repository's query grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    value: Value,
}

impl Predicate {
    /// Equality predicate: documents whose `field` equals `value`.
    pub fn at(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Renders the fragment the search endpoint understands, e.g.
    /// `[:d = at(document.type, "post")]`.
    pub fn render(&self) -> String {
        format!("[:d = at({}, {})]", self.field, render_value(&self.value))
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_string_value_quoted() {
        let predicate = Predicate::at("document.type", "post");
        assert_eq!(predicate.render(), r#"[:d = at(document.type, "post")]"#);
    }

    #[test]
    fn renders_number_and_bool_values_bare() {
        assert_eq!(
            Predicate::at("my.article.rank", 3).render(),
            "[:d = at(my.article.rank, 3)]"
        );
        assert_eq!(
            Predicate::at("my.article.published", true).render(),
            "[:d = at(my.article.published, true)]"
        );
    }

    #[test]
    fn renders_array_values_bracketed() {
        let predicate = Predicate::at("document.tags", json!(["news", "sport"]));
        assert_eq!(
            predicate.render(),
            r#"[:d = at(document.tags, ["news", "sport"])]"#
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes_in_string_values() {
        let predicate = Predicate::at("my.article.title", r#"he said "hi\there""#);
        assert_eq!(
            predicate.render(),
            r#"[:d = at(my.article.title, "he said \"hi\\there\"")]"#
        );
    }
}
