// JSON interchange - schema-directed conversion between JSON and values

use std::sync::Arc;

use serde_json::{Map, Number, Value as Json};

use crate::data::{Field, Value};
use crate::dispatch::{CaseMap, ExtraCasePolicy};
use crate::error::{BuildError, JsonError};
use crate::schema::{BinaryEncoding, SumSchema, ValueSchema, VariantSchema};

/// Template string replaced by the payload in case templates
pub const PAYLOAD_PLACEHOLDER: &str = "$payload";

const TAG_KEY: &str = "tag";
const VALUE_KEY: &str = "value";

/// Result produced by a template handler
pub type TemplateResult = Result<Json, JsonError>;

/// Parse and validate a sum schema
pub fn parse_sum_schema(text: &str) -> Result<SumSchema, JsonError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a value of the given sum, e.g. `{"tag": "present", "value": 5}`
pub fn sum_from_json(json: &Json, schema: &SumSchema) -> Result<Value, JsonError> {
    variant_from_json(json, schema.variants())
}

pub fn sum_to_json(value: &Value, schema: &SumSchema) -> Result<Json, JsonError> {
    variant_to_json(value, schema.variants())
}

pub fn value_from_json(json: &Json, schema: &ValueSchema) -> Result<Value, JsonError> {
    match (schema, json) {
        (ValueSchema::Unit, Json::Null) => Ok(Value::Unit),
        (ValueSchema::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (ValueSchema::Int, Json::Number(n)) => n
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| mismatch("int", json)),
        (ValueSchema::Double, Json::Number(n)) => n
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| mismatch("double", json)),
        (
            ValueSchema::Binary {
                encoding: BinaryEncoding::Utf8,
            },
            Json::String(s),
        ) => Ok(Value::text(s)),
        (
            ValueSchema::Binary {
                encoding: BinaryEncoding::Binary,
            },
            Json::Array(items),
        ) => {
            let bytes: Result<Vec<u8>, JsonError> = items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|b| u8::try_from(b).ok())
                        .ok_or_else(|| mismatch("byte", item))
                })
                .collect();
            Ok(Value::Binary(bytes?))
        }
        (ValueSchema::Array { element }, Json::Array(items)) => {
            let values: Result<Vec<_>, _> = items
                .iter()
                .map(|item| value_from_json(item, element))
                .collect();
            Ok(Value::Array(values?))
        }
        (ValueSchema::Struct { fields }, Json::Object(obj)) => {
            if let Some(unknown) = obj.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
                return Err(JsonError::UnknownField(unknown.clone()));
            }
            let values: Result<Vec<_>, JsonError> = fields
                .iter()
                .map(|field| {
                    let json = obj
                        .get(&field.name)
                        .ok_or_else(|| JsonError::MissingField(field.name.clone()))?;
                    Ok(Field {
                        name: field.name.clone(),
                        value: value_from_json(json, &field.schema)?,
                    })
                })
                .collect();
            Ok(Value::Struct(values?))
        }
        (ValueSchema::Enum { variants }, _) => variant_from_json(json, variants),
        _ => Err(mismatch(schema.kind(), json)),
    }
}

pub fn value_to_json(value: &Value, schema: &ValueSchema) -> Result<Json, JsonError> {
    match (schema, value) {
        (ValueSchema::Unit, Value::Unit) => Ok(Json::Null),
        (ValueSchema::Bool, Value::Bool(b)) => Ok(Json::Bool(*b)),
        (ValueSchema::Int, Value::Int(n)) => Ok(Json::Number((*n).into())),
        (ValueSchema::Double, Value::Double(d)) => Number::from_f64(*d)
            .map(Json::Number)
            .ok_or_else(|| JsonError::Mismatch {
                expected: "finite double".to_string(),
                actual: d.to_string(),
            }),
        (ValueSchema::Binary { encoding }, Value::Binary(bytes)) => match encoding {
            BinaryEncoding::Utf8 => String::from_utf8(bytes.clone())
                .map(Json::String)
                .map_err(|_| JsonError::Mismatch {
                    expected: "utf8 binary".to_string(),
                    actual: "non-utf8 binary".to_string(),
                }),
            BinaryEncoding::Binary => Ok(Json::Array(
                bytes.iter().map(|b| Json::Number((*b).into())).collect(),
            )),
        },
        (ValueSchema::Array { element }, Value::Array(values)) => {
            let items: Result<Vec<_>, _> = values
                .iter()
                .map(|value| value_to_json(value, element))
                .collect();
            Ok(Json::Array(items?))
        }
        (ValueSchema::Struct { fields: schemas }, Value::Struct(fields)) => {
            if fields.len() != schemas.len() {
                return Err(JsonError::Mismatch {
                    expected: format!("struct with {} fields", schemas.len()),
                    actual: format!("struct with {} fields", fields.len()),
                });
            }
            // fields are positional, as in Value::validate_schema
            let mut obj = Map::new();
            for (field, schema) in fields.iter().zip(schemas) {
                if field.name != schema.name {
                    return Err(JsonError::MissingField(schema.name.clone()));
                }
                obj.insert(field.name.clone(), value_to_json(&field.value, &schema.schema)?);
            }
            Ok(Json::Object(obj))
        }
        (ValueSchema::Enum { variants }, _) => variant_to_json(value, variants),
        _ => Err(JsonError::Mismatch {
            expected: schema.kind().to_string(),
            actual: value.kind().to_string(),
        }),
    }
}

fn variant_from_json(json: &Json, variants: &[VariantSchema]) -> Result<Value, JsonError> {
    let obj = json.as_object().ok_or_else(|| mismatch("tagged object", json))?;

    if let Some(unknown) = obj.keys().find(|k| *k != TAG_KEY && *k != VALUE_KEY) {
        return Err(JsonError::UnknownField(unknown.clone()));
    }

    let name = match obj.get(TAG_KEY) {
        Some(Json::String(name)) => name,
        Some(other) => return Err(mismatch("case name", other)),
        None => return Err(JsonError::MissingField(TAG_KEY.to_string())),
    };
    let variant = variants
        .iter()
        .find(|v| &v.name == name)
        .ok_or_else(|| JsonError::UnknownCase(name.clone()))?;

    let payload = match obj.get(VALUE_KEY) {
        Some(json) => value_from_json(json, &variant.schema)?,
        None => value_from_json(&Json::Null, &variant.schema)?,
    };
    Ok(Value::variant(variant.tag, payload))
}

fn variant_to_json(value: &Value, variants: &[VariantSchema]) -> Result<Json, JsonError> {
    let (tag, payload) = match value {
        Value::Enum { tag, value } => (*tag, value.as_ref()),
        other => {
            return Err(JsonError::Mismatch {
                expected: "enum".to_string(),
                actual: other.kind().to_string(),
            });
        }
    };
    let variant = variants
        .iter()
        .find(|v| v.tag == tag)
        .ok_or(JsonError::UnknownTag(tag))?;

    let mut obj = Map::new();
    obj.insert(TAG_KEY.to_string(), Json::String(variant.name.clone()));
    match value_to_json(payload, &variant.schema)? {
        Json::Null if variant.schema == ValueSchema::Unit => {}
        payload => {
            obj.insert(VALUE_KEY.to_string(), payload);
        }
    }
    Ok(Json::Object(obj))
}

fn mismatch(expected: &str, actual: &Json) -> JsonError {
    let actual = match actual {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    };
    JsonError::Mismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// How to build a case mapping from templates
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateOptions {
    pub extra_cases: ExtraCasePolicy,
    /// Allow cases without a template; dispatching them fails
    pub partial: bool,
}

/// Build a case mapping from a JSON object of `case name -> result template`.
///
/// Each handler renders its template, replacing every `"$payload"` string
/// with the payload's JSON form.
pub fn template_case_map(
    schema: impl Into<Arc<SumSchema>>,
    templates: &Map<String, Json>,
    options: TemplateOptions,
) -> Result<CaseMap<'static, TemplateResult>, BuildError> {
    let schema = schema.into();
    let mut builder = CaseMap::builder(Arc::clone(&schema)).extra_cases(options.extra_cases);

    for (name, template) in templates {
        // undeclared cases are rejected or dropped by the builder
        let payload_schema = schema
            .variant(name)
            .map(|v| v.schema.clone())
            .unwrap_or_default();
        let template = template.clone();
        builder = builder.case(name.clone(), move |payload: &Value| {
            let payload = value_to_json(payload, &payload_schema)?;
            Ok(render(&template, &payload))
        });
    }

    if options.partial {
        builder.build_partial()
    } else {
        builder.build()
    }
}

fn render(template: &Json, payload: &Json) -> Json {
    match template {
        Json::String(s) if s == PAYLOAD_PLACEHOLDER => payload.clone(),
        Json::Array(items) => Json::Array(items.iter().map(|item| render(item, payload)).collect()),
        Json::Object(obj) => Json::Object(
            obj.iter()
                .map(|(key, value)| (key.clone(), render(value, payload)))
                .collect(),
        ),
        other => other.clone(),
    }
}
