use serde_json::Value;

/// A tool declaration as written in an annotation block, before validation.
///
/// Every field except `source_location` is kept untyped; the registry
/// compiler decides what is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToolDeclaration {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub path: Option<Value>,
    pub schema: Option<Value>,
    /// File the block was found in.
    pub source_location: String,
}

impl RawToolDeclaration {
    /// Build a declaration from a parsed payload.
    ///
    /// Only a mapping payload contributes fields. Any other shape (scalar,
    /// sequence, null) yields a declaration with no fields, which the
    /// compiler later drops for lacking a name.
    pub fn from_payload(payload: Value, source_location: impl Into<String>) -> Self {
        let source_location = source_location.into();
        match payload {
            Value::Object(mut map) => Self {
                name: map.remove("name"),
                description: map.remove("description"),
                path: map.remove("path"),
                schema: map.remove("schema"),
                source_location,
            },
            _ => Self::empty(source_location),
        }
    }

    fn empty(source_location: String) -> Self {
        Self {
            name: None,
            description: None,
            path: None,
            schema: None,
            source_location,
        }
    }
}
