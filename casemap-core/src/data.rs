// Core value types for casemap

use crate::error::LogicalError;

/// Runtime values, including discriminated (enum) values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Double(f64),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Struct(Vec<Field>),
    Enum { tag: u32, value: Box<Value> },
}

/// Named field in a struct
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Field {
            name: name.into(),
            value,
        }
    }
}

impl Value {
    /// Build a discriminated value without checking it against a schema.
    ///
    /// Prefer [`SumSchema::construct`](crate::schema::SumSchema::construct),
    /// which rejects tags and payloads the sum does not declare.
    pub fn variant(tag: u32, payload: Value) -> Value {
        Value::Enum {
            tag,
            value: Box::new(payload),
        }
    }

    pub fn text(s: &str) -> Value {
        Value::Binary(s.as_bytes().to_vec())
    }

    /// Variant tag, if this is a discriminated value
    pub fn tag(&self) -> Option<u32> {
        match self {
            Value::Enum { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    /// Variant payload, if this is a discriminated value
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Value::Enum { value, .. } => Some(value.as_ref()),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Enum { .. } => "enum",
        }
    }
}

/// Type-safe extractors for values
impl Value {
    pub fn take_bool(&self) -> Result<bool, LogicalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.unexpected("bool")),
        }
    }

    pub fn take_int(&self) -> Result<i64, LogicalError> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(self.unexpected("int")),
        }
    }

    pub fn take_double(&self) -> Result<f64, LogicalError> {
        match self {
            Value::Double(d) => Ok(*d),
            _ => Err(self.unexpected("double")),
        }
    }

    pub fn take_binary(&self) -> Result<&[u8], LogicalError> {
        match self {
            Value::Binary(b) => Ok(b.as_slice()),
            _ => Err(self.unexpected("binary")),
        }
    }

    pub fn take_array(&self) -> Result<&[Value], LogicalError> {
        match self {
            Value::Array(a) => Ok(a.as_slice()),
            _ => Err(self.unexpected("array")),
        }
    }

    pub fn take_struct(&self) -> Result<&[Field], LogicalError> {
        match self {
            Value::Struct(s) => Ok(s.as_slice()),
            _ => Err(self.unexpected("struct")),
        }
    }

    pub fn take_enum(&self) -> Result<(u32, &Value), LogicalError> {
        match self {
            Value::Enum { tag, value } => Ok((*tag, value.as_ref())),
            _ => Err(self.unexpected("enum")),
        }
    }

    fn unexpected(&self, expected: &str) -> LogicalError {
        LogicalError::InvalidValue {
            field: "value".to_string(),
            reason: format!("Expected {}, got {:?}", expected, self),
        }
    }
}
