use serde_json::Value;
use std::fmt;

/// Identifier of a persisted entity.
///
/// A deployment uses either integer or string identifiers for all of its
/// entities; the variant only matters when the id is rendered into a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Id {
    Int(i64),
    Str(String),
}

impl Id {
    /// Reads an `@iot.id` value. Anything but an integer or string is rejected.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Id::Int),
            Value::String(s) => Some(Id::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Id::Int(n) => Value::from(*n),
            Id::Str(s) => Value::from(s.as_str()),
        }
    }

    /// Renders the id the way it appears between parentheses in a URL path:
    /// integers bare, strings as percent-encoded OData literals
    /// (`'it''s'`, `'team%231'`).
    pub fn to_path_literal(&self) -> String {
        match self {
            Id::Int(n) => n.to_string(),
            Id::Str(s) => {
                let escaped = s.replace('\'', "''");
                // `%` itself is encoded, so every `%27` left is one of our quotes
                format!("'{}'", urlencoding::encode(&escaped).replace("%27", "'"))
            }
        }
    }

    /// Extracts the identifier from a `Location` header such as
    /// `https://host/v1.1/Parties('abc123')` or `.../Things(42)`.
    pub fn from_location(location: &str) -> Option<Self> {
        let body = location.trim_end().strip_suffix(')')?;

        if let Some(quoted) = body.strip_suffix('\'') {
            let open = opening_quote(quoted)?;
            let literal = urlencoding::decode(&quoted[open + 1..]).ok()?;
            return Some(Id::Str(literal.replace("''", "'")));
        }

        let open = body.rfind('(')?;
        let inner = urlencoding::decode(body[open + 1..].trim()).ok()?;
        if inner.is_empty() {
            return None;
        }

        Some(
            inner
                .parse::<i64>()
                .map(Id::Int)
                .unwrap_or_else(|_| Id::Str(inner.into_owned())),
        )
    }
}

/// Byte offset of the quote opening the OData string literal that `quoted`
/// ends with (its closing quote already stripped). Doubled quotes belong to
/// the literal; the opening quote directly follows `(`.
fn opening_quote(quoted: &str) -> Option<usize> {
    let bytes = quoted.as_bytes();
    let mut i = bytes.len();
    while i > 0 {
        i -= 1;
        if bytes[i] != b'\'' {
            continue;
        }
        if i > 0 && bytes[i - 1] == b'\'' {
            i -= 1;
            continue;
        }
        return (i > 0 && bytes[i - 1] == b'(').then_some(i);
    }
    None
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(n) => write!(f, "{}", n),
            Id::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Int(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Str(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id::Str(value)
    }
}
