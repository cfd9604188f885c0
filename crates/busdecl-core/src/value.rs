//! Dynamically typed values carried by properties, signals and method calls.

use std::fmt;

use indexmap::IndexMap;

/// A value crossing the declaration boundary.
///
/// `Unit` is the empty result, returned for instance when reading a
/// write-only property.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Unit,
    Bool(bool),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Str(String),
    ObjectPath(String),
    Array(Vec<Value>),
    Dict(IndexMap<String, Value>),
}

impl Value {
    /// Returns the type signature of this value.
    ///
    /// Arrays report their element signature when all elements agree and
    /// fall back to `av` otherwise. Dictionaries are always `a{sv}`.
    pub fn signature(&self) -> String {
        match self {
            Self::Unit => String::new(),
            Self::Bool(_) => "b".to_string(),
            Self::Byte(_) => "y".to_string(),
            Self::Int16(_) => "n".to_string(),
            Self::UInt16(_) => "q".to_string(),
            Self::Int32(_) => "i".to_string(),
            Self::UInt32(_) => "u".to_string(),
            Self::Int64(_) => "x".to_string(),
            Self::UInt64(_) => "t".to_string(),
            Self::Double(_) => "d".to_string(),
            Self::Str(_) => "s".to_string(),
            Self::ObjectPath(_) => "o".to_string(),
            Self::Array(items) => {
                let mut signatures = items.iter().map(Value::signature);
                match signatures.next() {
                    Some(first) if !first.is_empty() && signatures.all(|sig| sig == first) => {
                        format!("a{first}")
                    }
                    _ => "av".to_string(),
                }
            }
            Self::Dict(_) => "a{sv}".to_string(),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) | Self::ObjectPath(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Byte(value) => write!(f, "{value}"),
            Self::Int16(value) => write!(f, "{value}"),
            Self::UInt16(value) => write!(f, "{value}"),
            Self::Int32(value) => write!(f, "{value}"),
            Self::UInt32(value) => write!(f, "{value}"),
            Self::Int64(value) => write!(f, "{value}"),
            Self::UInt64(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value:?}"),
            Self::ObjectPath(value) => f.write_str(value),
            Self::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Dict(entries) => {
                f.write_str("{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f64 => Double,
    String => Str,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Unit
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self::Dict(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_signatures() {
        assert_eq!(Value::from(true).signature(), "b");
        assert_eq!(Value::from(5i32).signature(), "i");
        assert_eq!(Value::from("hi").signature(), "s");
        assert_eq!(Value::Unit.signature(), "");
    }

    #[test]
    fn test_array_signature() {
        assert_eq!(Value::from(vec!["a", "b"]).signature(), "as");
        assert_eq!(
            Value::Array(vec![Value::from(1i32), Value::from("x")]).signature(),
            "av"
        );
        assert_eq!(Value::Array(vec![]).signature(), "av");
    }

    #[test]
    fn test_dict_display_keeps_order() {
        let mut entries = IndexMap::new();
        entries.insert("Count".to_string(), Value::from(5i32));
        entries.insert("Name".to_string(), Value::from("svc"));

        assert_eq!(Value::from(entries).to_string(), r#"{"Count": 5, "Name": "svc"}"#);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(7i32).as_i32(), Some(7));
        assert_eq!(Value::from("x").as_i32(), None);
        assert_eq!(Value::ObjectPath("/a".into()).as_str(), Some("/a"));
        assert!(Value::default().is_unit());
    }
}
