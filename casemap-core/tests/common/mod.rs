// Test utilities and generators for casemap property-based testing

#![allow(dead_code)]

use casemap_core::data::{Field, Value};
use casemap_core::schema::{BinaryEncoding, FieldSchema, SumSchema, ValueSchema, VariantSchema};
use proptest::prelude::*;

/// Generate case and field names
pub fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("absent".to_string()),
        Just("present".to_string()),
        Just("left".to_string()),
        Just("right".to_string()),
        "[a-z][a-z0-9_]{0,8}".prop_map(|s| s.to_string()),
    ]
}

/// Generate a payload schema with limited recursion depth
pub fn arb_value_schema_depth(depth: u32) -> BoxedStrategy<ValueSchema> {
    let leaf = prop_oneof![
        Just(ValueSchema::Unit),
        Just(ValueSchema::Bool),
        Just(ValueSchema::Int),
        Just(ValueSchema::Double),
        Just(ValueSchema::utf8()),
        Just(ValueSchema::Binary {
            encoding: BinaryEncoding::Binary
        }),
    ];

    leaf.prop_recursive(depth, 32, 4, move |inner| {
        prop_oneof![
            inner.clone().prop_map(|element| ValueSchema::Array {
                element: Box::new(element)
            }),
            prop::collection::btree_map(arb_name(), inner.clone(), 1..4).prop_map(|fields| {
                ValueSchema::Struct {
                    fields: fields
                        .into_iter()
                        .map(|(name, schema)| FieldSchema { name, schema })
                        .collect(),
                }
            }),
            arb_variants(inner).prop_map(|variants| ValueSchema::Enum { variants }),
        ]
    })
    .boxed()
}

/// Generate a reasonable payload schema (depth 2)
pub fn arb_value_schema() -> BoxedStrategy<ValueSchema> {
    arb_value_schema_depth(2)
}

/// Generate variants with unique names and unique tags
pub fn arb_variants(
    payload: impl Strategy<Value = ValueSchema> + Clone,
) -> impl Strategy<Value = Vec<VariantSchema>> {
    (
        prop::collection::btree_set(arb_name(), 1..6),
        any::<u32>(),
    )
        .prop_flat_map(move |(names, offset)| {
            let count = names.len();
            (
                Just(names),
                Just(offset),
                prop::collection::vec(payload.clone(), count),
            )
        })
        .prop_map(|(names, offset, payloads)| {
            names
                .into_iter()
                .zip(payloads)
                .enumerate()
                .map(|(i, (name, schema))| VariantSchema {
                    name,
                    tag: offset.wrapping_add(i as u32 * 7),
                    schema,
                })
                .collect()
        })
}

/// Generate a valid sum schema
pub fn arb_sum_schema() -> impl Strategy<Value = SumSchema> {
    ("[a-z]{1,8}", arb_variants(arb_value_schema())).prop_map(|(name, variants)| {
        SumSchema::new(name, variants).expect("generated variants are unique")
    })
}

/// Generate a value that conforms to the schema
pub fn arb_value_for_schema(schema: &ValueSchema) -> BoxedStrategy<Value> {
    match schema {
        ValueSchema::Unit => Just(Value::Unit).boxed(),
        ValueSchema::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        ValueSchema::Int => any::<i64>().prop_map(Value::Int).boxed(),
        ValueSchema::Double => (-1.0e6f64..1.0e6).prop_map(Value::Double).boxed(),
        ValueSchema::Binary {
            encoding: BinaryEncoding::Utf8,
        } => "[a-zA-Z0-9 ]*".prop_map(|s| Value::text(&s)).boxed(),
        ValueSchema::Binary {
            encoding: BinaryEncoding::Binary,
        } => prop::collection::vec(any::<u8>(), 0..16)
            .prop_map(Value::Binary)
            .boxed(),
        ValueSchema::Array { element } => prop::collection::vec(arb_value_for_schema(element), 0..4)
            .prop_map(Value::Array)
            .boxed(),
        ValueSchema::Struct { fields } => {
            let names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
            let values: Vec<_> = fields
                .iter()
                .map(|f| arb_value_for_schema(&f.schema))
                .collect();
            values
                .prop_map(move |values| {
                    Value::Struct(
                        names
                            .iter()
                            .cloned()
                            .zip(values)
                            .map(|(name, value)| Field { name, value })
                            .collect(),
                    )
                })
                .boxed()
        }
        ValueSchema::Enum { variants } => arb_variant_value(variants),
    }
}

/// Generate a value of one of the given variants
pub fn arb_variant_value(variants: &[VariantSchema]) -> BoxedStrategy<Value> {
    let choices: Vec<_> = variants
        .iter()
        .map(|variant| {
            let tag = variant.tag;
            arb_value_for_schema(&variant.schema).prop_map(move |payload| Value::variant(tag, payload))
        })
        .collect();
    prop::strategy::Union::new(choices).boxed()
}

/// Generate a sum schema together with a conforming value
pub fn arb_sum_and_value() -> impl Strategy<Value = (SumSchema, Value)> {
    arb_sum_schema().prop_flat_map(|schema| {
        let value = arb_variant_value(schema.variants());
        (Just(schema), value)
    })
}
