// Error types for casemap

use std::error::Error as StdError;
use std::fmt;

/// Umbrella error across casemap layers
#[derive(Debug)]
pub enum Error {
    Schema(SchemaError),
    Logical(LogicalError),
    Build(BuildError),
    Dispatch(DispatchError),
    Json(JsonError),
}

/// Schema well-formedness and value/schema compatibility errors
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    TypeMismatch { expected: String, actual: String },
    MissingField(String),
    DuplicateField(String),
    DuplicateVariant(String),
    DuplicateTag(u32),
    UnknownVariant(String),
    UnknownTag(u32),
    UnsupportedType(String),
}

/// Errors extracting data out of values
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalError {
    InvalidValue { field: String, reason: String },
}

/// Errors building a case mapping against a sum schema
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// One or more declared cases have no handler
    MissingCases { sum: String, cases: Vec<String> },
    /// A handler was supplied for a case the sum does not declare
    UnknownCase { sum: String, case: String },
    /// Two handlers were supplied for the same case
    DuplicateCase { sum: String, case: String },
}

/// Errors selecting a handler for a value
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The value's case is declared but the mapping has no handler for it
    MissingCase { sum: String, case: String, tag: u32 },
    /// The value carries a tag the sum does not declare
    UnknownTag { sum: String, tag: u32 },
    /// The value is not a discriminated value at all
    NotAVariant { sum: String, actual: &'static str },
}

/// JSON interchange errors
#[derive(Debug)]
pub enum JsonError {
    Parse(serde_json::Error),
    Schema(SchemaError),
    Mismatch { expected: String, actual: String },
    UnknownCase(String),
    UnknownTag(u32),
    MissingField(String),
    UnknownField(String),
}

// Error trait implementations

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Schema(e) => Some(e),
            Error::Logical(e) => Some(e),
            Error::Build(e) => Some(e),
            Error::Dispatch(e) => Some(e),
            Error::Json(e) => Some(e),
        }
    }
}

impl StdError for SchemaError {}
impl StdError for LogicalError {}
impl StdError for BuildError {}
impl StdError for DispatchError {}

impl StdError for JsonError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            JsonError::Parse(e) => Some(e),
            JsonError::Schema(e) => Some(e),
            _ => None,
        }
    }
}

// Display implementations

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "Schema error: {}", e),
            Error::Logical(e) => write!(f, "Value error: {}", e),
            Error::Build(e) => write!(f, "Case mapping error: {}", e),
            Error::Dispatch(e) => write!(f, "Dispatch error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, actual)
            }
            SchemaError::MissingField(field) => {
                write!(f, "Missing required field: {}", field)
            }
            SchemaError::DuplicateField(field) => {
                write!(f, "Duplicate field name: {}", field)
            }
            SchemaError::DuplicateVariant(name) => {
                write!(f, "Duplicate variant name: {}", name)
            }
            SchemaError::DuplicateTag(tag) => {
                write!(f, "Duplicate variant tag: {}", tag)
            }
            SchemaError::UnknownVariant(name) => {
                write!(f, "Unknown variant: {}", name)
            }
            SchemaError::UnknownTag(tag) => {
                write!(f, "Unknown variant tag: {}", tag)
            }
            SchemaError::UnsupportedType(type_name) => {
                write!(f, "Unsupported type: {}", type_name)
            }
        }
    }
}

impl fmt::Display for LogicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for field '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingCases { sum, cases } => {
                write!(f, "Missing case(s) for {}: {}", sum, cases.join(", "))
            }
            BuildError::UnknownCase { sum, case } => {
                write!(f, "Unknown case '{}' for {}", case, sum)
            }
            BuildError::DuplicateCase { sum, case } => {
                write!(f, "Duplicate handler for case '{}' of {}", case, sum)
            }
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::MissingCase { sum, case, tag } => {
                write!(
                    f,
                    "Missing case '{}' (tag {}) when matching {}",
                    case, tag, sum
                )
            }
            DispatchError::UnknownTag { sum, tag } => {
                write!(f, "Tag {} is not a variant of {}", tag, sum)
            }
            DispatchError::NotAVariant { sum, actual } => {
                write!(f, "Cannot match {} value against {}", actual, sum)
            }
        }
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::Parse(e) => write!(f, "Invalid JSON: {}", e),
            JsonError::Schema(e) => write!(f, "Invalid schema: {}", e),
            JsonError::Mismatch { expected, actual } => {
                write!(f, "Expected {}, got {}", expected, actual)
            }
            JsonError::UnknownCase(name) => write!(f, "Unknown case: {}", name),
            JsonError::UnknownTag(tag) => write!(f, "Unknown variant tag: {}", tag),
            JsonError::MissingField(field) => write!(f, "Missing field: {}", field),
            JsonError::UnknownField(field) => write!(f, "Unknown field: {}", field),
        }
    }
}

// Convenience From implementations for error composition

impl From<SchemaError> for Error {
    fn from(error: SchemaError) -> Self {
        Error::Schema(error)
    }
}

impl From<LogicalError> for Error {
    fn from(error: LogicalError) -> Self {
        Error::Logical(error)
    }
}

impl From<BuildError> for Error {
    fn from(error: BuildError) -> Self {
        Error::Build(error)
    }
}

impl From<DispatchError> for Error {
    fn from(error: DispatchError) -> Self {
        Error::Dispatch(error)
    }
}

impl From<JsonError> for Error {
    fn from(error: JsonError) -> Self {
        Error::Json(error)
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(error: serde_json::Error) -> Self {
        JsonError::Parse(error)
    }
}

impl From<SchemaError> for JsonError {
    fn from(error: SchemaError) -> Self {
        JsonError::Schema(error)
    }
}
