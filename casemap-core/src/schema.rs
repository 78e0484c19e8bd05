// Schema layer - describes the shape of values and the closed set of cases of a sum

use std::collections::BTreeSet;

use crate::data::Value;
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};

/// Schema definition for values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueSchema {
    #[default]
    Unit,
    Bool,
    Int,
    Double,
    Binary {
        #[serde(default)]
        encoding: BinaryEncoding,
    },
    Array {
        element: Box<ValueSchema>,
    },
    Struct {
        fields: Vec<FieldSchema>,
    },
    Enum {
        variants: Vec<VariantSchema>,
    },
}

/// Binary encoding variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryEncoding {
    #[default]
    Binary,
    Utf8,
}

/// Schema for struct fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub schema: ValueSchema,
}

/// Schema for enum variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSchema {
    pub name: String,
    pub tag: u32,
    #[serde(default)]
    pub schema: ValueSchema,
}

impl VariantSchema {
    pub fn new(name: impl Into<String>, tag: u32, schema: ValueSchema) -> Self {
        VariantSchema {
            name: name.into(),
            tag,
            schema,
        }
    }
}

impl ValueSchema {
    pub fn utf8() -> ValueSchema {
        ValueSchema::Binary {
            encoding: BinaryEncoding::Utf8,
        }
    }

    /// Check that the schema itself is well formed
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self {
            ValueSchema::Unit
            | ValueSchema::Bool
            | ValueSchema::Int
            | ValueSchema::Double
            | ValueSchema::Binary { .. } => Ok(()),
            ValueSchema::Array { element } => element.validate(),
            ValueSchema::Struct { fields } => {
                let mut seen = BTreeSet::new();
                for field in fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(SchemaError::DuplicateField(field.name.clone()));
                    }
                    field.schema.validate()?;
                }
                Ok(())
            }
            ValueSchema::Enum { variants } => validate_variants(variants),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ValueSchema::Unit => "unit",
            ValueSchema::Bool => "bool",
            ValueSchema::Int => "int",
            ValueSchema::Double => "double",
            ValueSchema::Binary { .. } => "binary",
            ValueSchema::Array { .. } => "array",
            ValueSchema::Struct { .. } => "struct",
            ValueSchema::Enum { .. } => "enum",
        }
    }
}

fn validate_variants(variants: &[VariantSchema]) -> Result<(), SchemaError> {
    if variants.is_empty() {
        return Err(SchemaError::UnsupportedType(
            "Empty enum schemas are not supported".to_string(),
        ));
    }

    let mut names = BTreeSet::new();
    let mut tags = BTreeSet::new();
    for variant in variants {
        if !names.insert(variant.name.as_str()) {
            return Err(SchemaError::DuplicateVariant(variant.name.clone()));
        }
        if !tags.insert(variant.tag) {
            return Err(SchemaError::DuplicateTag(variant.tag));
        }
        variant.schema.validate()?;
    }
    Ok(())
}

/// Schema validation for values
impl Value {
    /// Validate value against schema
    pub fn validate_schema(&self, schema: &ValueSchema) -> Result<(), SchemaError> {
        match (self, schema) {
            (Value::Unit, ValueSchema::Unit) => Ok(()),
            (Value::Bool(_), ValueSchema::Bool) => Ok(()),
            (Value::Int(_), ValueSchema::Int) => Ok(()),
            (Value::Double(_), ValueSchema::Double) => Ok(()),
            (Value::Binary(bytes), ValueSchema::Binary { encoding }) => {
                if *encoding == BinaryEncoding::Utf8 && std::str::from_utf8(bytes).is_err() {
                    return Err(SchemaError::TypeMismatch {
                        expected: "utf8 binary".to_string(),
                        actual: "non-utf8 binary".to_string(),
                    });
                }
                Ok(())
            }
            (Value::Array(values), ValueSchema::Array { element }) => {
                for value in values {
                    value.validate_schema(element)?;
                }
                Ok(())
            }
            (
                Value::Struct(fields),
                ValueSchema::Struct {
                    fields: field_schemas,
                },
            ) => {
                if fields.len() != field_schemas.len() {
                    return Err(SchemaError::TypeMismatch {
                        expected: format!("struct with {} fields", field_schemas.len()),
                        actual: format!("struct with {} fields", fields.len()),
                    });
                }
                for (field, field_schema) in fields.iter().zip(field_schemas.iter()) {
                    if field.name != field_schema.name {
                        return Err(SchemaError::MissingField(field_schema.name.clone()));
                    }
                    field.value.validate_schema(&field_schema.schema)?;
                }
                Ok(())
            }
            (Value::Enum { tag, value }, ValueSchema::Enum { variants }) => {
                match variants.iter().find(|v| v.tag == *tag) {
                    Some(variant) => value.validate_schema(&variant.schema),
                    None => Err(SchemaError::UnknownTag(*tag)),
                }
            }
            _ => Err(SchemaError::TypeMismatch {
                expected: schema.kind().to_string(),
                actual: self.kind().to_string(),
            }),
        }
    }
}

/// A named, closed set of cases.
///
/// Names and tags are unique and there is at least one case; every
/// `SumSchema`, including deserialized ones, has been validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSumSchema")]
pub struct SumSchema {
    name: String,
    variants: Vec<VariantSchema>,
}

#[derive(Deserialize)]
struct RawSumSchema {
    name: String,
    variants: Vec<VariantSchema>,
}

impl TryFrom<RawSumSchema> for SumSchema {
    type Error = SchemaError;

    fn try_from(raw: RawSumSchema) -> Result<Self, Self::Error> {
        SumSchema::new(raw.name, raw.variants)
    }
}

impl SumSchema {
    /// Validated sum with the given cases
    pub fn new(
        name: impl Into<String>,
        variants: Vec<VariantSchema>,
    ) -> Result<SumSchema, SchemaError> {
        validate_variants(&variants)?;
        Ok(SumSchema {
            name: name.into(),
            variants,
        })
    }

    /// Optional value: `absent` (tag 0, no payload) or `present` (tag 1)
    pub fn option(payload: ValueSchema) -> SumSchema {
        SumSchema {
            name: "option".to_string(),
            variants: vec![
                VariantSchema::new("absent", 0, ValueSchema::Unit),
                VariantSchema::new("present", 1, payload),
            ],
        }
    }

    /// Either value: `left` (tag 0) or `right` (tag 1)
    pub fn either(left: ValueSchema, right: ValueSchema) -> SumSchema {
        SumSchema {
            name: "either".to_string(),
            variants: vec![
                VariantSchema::new("left", 0, left),
                VariantSchema::new("right", 1, right),
            ],
        }
    }

    /// Sum name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cases in declaration order
    pub fn variants(&self) -> &[VariantSchema] {
        &self.variants
    }

    /// Case names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.name.as_str())
    }

    /// Look up a case by name
    pub fn variant(&self, name: &str) -> Option<&VariantSchema> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Look up a case by tag
    pub fn variant_by_tag(&self, tag: u32) -> Option<&VariantSchema> {
        self.variants.iter().find(|v| v.tag == tag)
    }

    /// Payload schema for a value of this sum nested in another value
    pub fn to_value_schema(&self) -> ValueSchema {
        ValueSchema::Enum {
            variants: self.variants.clone(),
        }
    }

    /// Constructor for the named case
    pub fn constructor(&self, name: &str) -> Result<Constructor<'_>, SchemaError> {
        self.variant(name)
            .map(|variant| Constructor { variant })
            .ok_or_else(|| SchemaError::UnknownVariant(name.to_string()))
    }

    /// Build a value of the named case, checking the payload
    pub fn construct(&self, name: &str, payload: Value) -> Result<Value, SchemaError> {
        self.constructor(name)?.build(payload)
    }

    /// Check that `value` is a case of this sum with a valid payload
    pub fn validate_value(&self, value: &Value) -> Result<(), SchemaError> {
        match value {
            Value::Enum { tag, value } => {
                let variant = self
                    .variant_by_tag(*tag)
                    .ok_or(SchemaError::UnknownTag(*tag))?;
                value.validate_schema(&variant.schema)
            }
            other => Err(SchemaError::TypeMismatch {
                expected: self.name.clone(),
                actual: other.kind().to_string(),
            }),
        }
    }
}

/// Builds values of one case of a sum
#[derive(Debug, Clone, Copy)]
pub struct Constructor<'s> {
    variant: &'s VariantSchema,
}

impl<'s> Constructor<'s> {
    pub fn name(&self) -> &'s str {
        &self.variant.name
    }

    pub fn tag(&self) -> u32 {
        self.variant.tag
    }

    pub fn build(&self, payload: Value) -> Result<Value, SchemaError> {
        payload.validate_schema(&self.variant.schema)?;
        Ok(Value::variant(self.variant.tag, payload))
    }

    pub fn unit(&self) -> Result<Value, SchemaError> {
        self.build(Value::Unit)
    }
}
