use serde::{Serialize, Serializer};

/// A single column value in its canonical text form.
///
/// Values are never reinterpreted as numbers or dates; whatever text the database produced is
/// carried through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    #[default]
    Null,
    Text(String),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Null => None,
            Value::Text(value) => Some(value.as_str()),
        }
    }

    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(value) => Some(value),
        }
    }
}

/// Convert raw driver bytes; bytes that are not valid UTF-8 are replaced with U+FFFD.
impl From<Option<Vec<u8>>> for Value {
    fn from(raw: Option<Vec<u8>>) -> Self {
        match raw {
            None => Value::Null,
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Value::Text(text),
                Err(error) => Value::Text(String::from_utf8_lossy(error.as_bytes()).into_owned()),
            },
        }
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Value::Null, Value::Text)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(value) => serializer.serialize_str(value),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_raw_null() {
        assert_eq!(Value::from(None::<Vec<u8>>), Value::Null);
    }

    #[test]
    fn test_from_raw_bytes() {
        let value = Value::from(Some(b"42".to_vec()));
        assert_eq!(value, Value::Text("42".to_string()));
    }

    #[test]
    fn test_from_raw_empty_bytes_is_not_null() {
        let value = Value::from(Some(Vec::new()));
        assert_eq!(value, Value::Text(String::new()));
        assert!(!value.is_null());
    }

    #[test]
    fn test_from_raw_invalid_utf8() {
        let value = Value::from(Some(vec![b'a', 0xff, b'b']));
        assert_eq!(value, Value::Text("a\u{fffd}b".to_string()));
    }

    #[test]
    fn test_numeric_text_is_not_reformatted() {
        let value = Value::from(Some(b"789.1230".to_vec()));
        assert_eq!(value.as_text(), Some("789.1230"));
    }

    #[test]
    fn test_into_text() {
        assert_eq!(Value::Null.into_text(), None);
        assert_eq!(Value::from("foo").into_text(), Some("foo".to_string()));
    }

    #[test]
    fn test_from_option_string() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(
            Value::from(Some("bar".to_string())),
            Value::Text("bar".to_string())
        );
    }

    #[test]
    fn test_serialize() -> serde_json::Result<()> {
        let row = vec![Value::from("1"), Value::Null];
        assert_eq!(serde_json::to_string(&row)?, r#"["1",null]"#);
        Ok(())
    }
}
