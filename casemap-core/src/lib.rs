// casemap - exhaustive case dispatch for discriminated values
//
// Two layers share one contract: a value is matched by invoking the handler
// keyed by its case, and a mapping must cover every case of the sum.
//
// - `typed`: closed Rust enums with compiler-checked cases records
// - `schema` + `dispatch`: runtime sums checked when the mapping is built

pub mod data;
pub mod dispatch;
pub mod error;
pub mod json;
pub mod schema;
pub mod typed;

pub use data::{Field, Value};
pub use dispatch::{CaseMap, CaseMapBuilder, ExtraCasePolicy, Handler};
pub use error::{BuildError, DispatchError, Error, JsonError, LogicalError, SchemaError};
pub use schema::{Constructor, SumSchema, ValueSchema, VariantSchema};
