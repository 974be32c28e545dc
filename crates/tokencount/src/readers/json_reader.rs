//! # JSON / JSONL Reader
//!
//! Accepts newline-delimited (or simply concatenated) JSON values, and
//! top-level arrays; each element of a top-level array is a row.

use std::{
    io::{BufReader, Read},
    vec,
};

use serde_json::{Value, de::IoRead};

use crate::{errors::TCResult, readers::FieldValue};

/// Project a JSON row onto one field.
pub fn field_value(
    row: Value,
    field: &str,
) -> FieldValue {
    let Value::Object(mut object) = row else {
        return FieldValue::Null;
    };
    match object.remove(field) {
        Some(Value::String(text)) => FieldValue::Text(text),
        None | Some(Value::Null) => FieldValue::Null,
        Some(_) => FieldValue::NonText,
    }
}

/// Iterator over the rows of a JSON stream.
pub struct JsonRows<R: Read> {
    values: serde_json::StreamDeserializer<'static, IoRead<BufReader<R>>, Value>,
    pending: vec::IntoIter<Value>,
}

impl<R: Read> JsonRows<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            values: serde_json::Deserializer::from_reader(BufReader::new(reader)).into_iter(),
            pending: Vec::new().into_iter(),
        }
    }
}

impl<R: Read> Iterator for JsonRows<R> {
    type Item = TCResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.next() {
                return Some(Ok(row));
            }
            match self.values.next()? {
                Ok(Value::Array(rows)) => self.pending = rows.into_iter(),
                Ok(row) => return Some(Ok(row)),
                Err(err) => return Some(Err(err.into())),
            }
        }
    }
}

/// Count the rows of a JSON stream.
pub fn count_rows<R: Read>(reader: R) -> TCResult<u64> {
    let mut count = 0;
    for row in JsonRows::new(reader) {
        row?;
        count += 1;
    }
    Ok(count)
}

/// Read `field` from up to `limit` rows, starting at row `offset`.
pub fn read_field<R: Read>(
    reader: R,
    field: &str,
    offset: u64,
    limit: usize,
) -> TCResult<Vec<FieldValue>> {
    let rows = JsonRows::new(reader).map(|row| row.map(|row| field_value(row, field)));
    super::skip_take(rows, offset, limit)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::TokencountError;

    const JSONL: &str = r#"{"text": "alpha", "n": 1}
{"text": ""}
{"n": 3}
{"text": null}
{"text": 42}

{"text": "omega"}
"#;

    #[test]
    fn test_field_value() {
        assert_eq!(
            field_value(json!({"text": "a b"}), "text"),
            FieldValue::Text("a b".to_string())
        );
        assert_eq!(field_value(json!({"text": null}), "text"), FieldValue::Null);
        assert_eq!(field_value(json!({"other": "x"}), "text"), FieldValue::Null);
        assert_eq!(field_value(json!({"text": [1, 2]}), "text"), FieldValue::NonText);
        assert_eq!(field_value(json!("bare string"), "text"), FieldValue::Null);
    }

    #[test]
    fn test_jsonl() -> TCResult<()> {
        assert_eq!(count_rows(JSONL.as_bytes())?, 6);

        let values = read_field(JSONL.as_bytes(), "text", 0, 100)?;
        assert_eq!(
            values,
            vec![
                FieldValue::Text("alpha".to_string()),
                FieldValue::Text(String::new()),
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::NonText,
                FieldValue::Text("omega".to_string()),
            ]
        );

        let values = read_field(JSONL.as_bytes(), "text", 4, 1)?;
        assert_eq!(values, vec![FieldValue::NonText]);
        Ok(())
    }

    #[test]
    fn test_top_level_array() -> TCResult<()> {
        let doc = r#"[{"text": "a"}, {"text": "b"}, {"text": "c"}]"#;
        assert_eq!(count_rows(doc.as_bytes())?, 3);
        assert_eq!(
            read_field(doc.as_bytes(), "text", 1, 5)?,
            vec![
                FieldValue::Text("b".to_string()),
                FieldValue::Text("c".to_string()),
            ]
        );

        assert_eq!(count_rows("[]".as_bytes())?, 0);
        Ok(())
    }

    #[test]
    fn test_malformed() {
        let doc = "{\"text\": \"ok\"}\n{\"text\": \n";
        assert!(matches!(
            count_rows(doc.as_bytes()),
            Err(TokencountError::Json(_))
        ));
    }
}
