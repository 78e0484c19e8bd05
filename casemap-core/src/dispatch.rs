// Dynamic dispatch - case mappings checked against a sum schema at build time

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::data::Value;
use crate::error::{BuildError, DispatchError};
use crate::schema::SumSchema;

/// Handler for one case; receives the case's payload
pub type Handler<'a, R> = Box<dyn Fn(&Value) -> R + Send + Sync + 'a>;

/// What to do with handlers for cases the sum does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraCasePolicy {
    /// Fail the build with [`BuildError::UnknownCase`]
    #[default]
    Reject,
    /// Drop the handler and log a warning
    Ignore,
}

/// Collects handlers before they are checked against the schema
pub struct CaseMapBuilder<'a, R> {
    schema: Arc<SumSchema>,
    handlers: Vec<(String, Handler<'a, R>)>,
    extra_cases: ExtraCasePolicy,
}

impl<'a, R> CaseMapBuilder<'a, R> {
    /// Add the handler for the named case
    pub fn case<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'a,
    {
        self.case_boxed(name, Box::new(handler))
    }

    /// Add an already boxed handler for the named case
    pub fn case_boxed(mut self, name: impl Into<String>, handler: Handler<'a, R>) -> Self {
        self.handlers.push((name.into(), handler));
        self
    }

    /// Set how handlers for undeclared cases are treated
    pub fn extra_cases(mut self, policy: ExtraCasePolicy) -> Self {
        self.extra_cases = policy;
        self
    }

    /// Build a mapping with a handler for every case of the sum
    pub fn build(self) -> Result<CaseMap<'a, R>, BuildError> {
        self.assemble(true)
    }

    /// Build a mapping that may lack handlers.
    ///
    /// Dispatching a value whose case has no handler fails with
    /// [`DispatchError::MissingCase`].
    pub fn build_partial(self) -> Result<CaseMap<'a, R>, BuildError> {
        self.assemble(false)
    }

    fn assemble(self, exhaustive: bool) -> Result<CaseMap<'a, R>, BuildError> {
        let CaseMapBuilder {
            schema,
            handlers: supplied,
            extra_cases,
        } = self;

        let mut handlers = BTreeMap::new();
        for (name, handler) in supplied {
            let variant = match schema.variant(&name) {
                Some(variant) => variant,
                None => match extra_cases {
                    ExtraCasePolicy::Reject => {
                        return Err(BuildError::UnknownCase {
                            sum: schema.name().to_string(),
                            case: name,
                        });
                    }
                    ExtraCasePolicy::Ignore => {
                        warn!(sum = schema.name(), case = %name, "ignoring handler for undeclared case");
                        continue;
                    }
                },
            };

            if handlers.insert(variant.tag, handler).is_some() {
                return Err(BuildError::DuplicateCase {
                    sum: schema.name().to_string(),
                    case: name,
                });
            }
        }

        if exhaustive {
            let missing: Vec<String> = schema
                .variants()
                .iter()
                .filter(|v| !handlers.contains_key(&v.tag))
                .map(|v| v.name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingCases {
                    sum: schema.name().to_string(),
                    cases: missing,
                });
            }
        }

        debug!(
            sum = schema.name(),
            cases = handlers.len(),
            exhaustive,
            "built case mapping"
        );
        Ok(CaseMap { schema, handlers })
    }
}

/// One handler per case of a sum, keyed by tag
pub struct CaseMap<'a, R> {
    schema: Arc<SumSchema>,
    handlers: BTreeMap<u32, Handler<'a, R>>,
}

impl<'a, R> CaseMap<'a, R> {
    /// Start a mapping for the given sum
    pub fn builder(schema: impl Into<Arc<SumSchema>>) -> CaseMapBuilder<'a, R> {
        CaseMapBuilder {
            schema: schema.into(),
            handlers: Vec::new(),
            extra_cases: ExtraCasePolicy::default(),
        }
    }

    /// Sum this mapping dispatches over
    pub fn schema(&self) -> &SumSchema {
        &self.schema
    }

    /// True if every case has a handler
    pub fn is_exhaustive(&self) -> bool {
        self.handlers.len() == self.schema.variants().len()
    }

    /// Declared cases without a handler, in declaration order
    pub fn missing_cases(&self) -> Vec<&str> {
        self.schema
            .variants()
            .iter()
            .filter(|v| !self.handlers.contains_key(&v.tag))
            .map(|v| v.name.as_str())
            .collect()
    }

    /// Invoke the handler for `value`'s case with its payload.
    ///
    /// The handler's result is returned as is. Only the selected handler
    /// runs, exactly once.
    pub fn dispatch(&self, value: &Value) -> Result<R, DispatchError> {
        let (tag, payload) = match value {
            Value::Enum { tag, value } => (*tag, value.as_ref()),
            other => {
                return Err(DispatchError::NotAVariant {
                    sum: self.schema.name().to_string(),
                    actual: other.kind(),
                });
            }
        };

        match self.handlers.get(&tag) {
            Some(handler) => {
                trace!(sum = self.schema.name(), tag, "dispatching");
                Ok(handler(payload))
            }
            None => match self.schema.variant_by_tag(tag) {
                Some(variant) => Err(DispatchError::MissingCase {
                    sum: self.schema.name().to_string(),
                    case: variant.name.clone(),
                    tag,
                }),
                None => Err(DispatchError::UnknownTag {
                    sum: self.schema.name().to_string(),
                    tag,
                }),
            },
        }
    }

    /// The mapping partially applied: a reusable `value -> result` function
    pub fn matcher(&self) -> Box<dyn Fn(&Value) -> Result<R, DispatchError> + Send + Sync + '_> {
        Box::new(move |value: &Value| self.dispatch(value))
    }
}

impl<R> fmt::Debug for CaseMap<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cases: Vec<&str> = self
            .schema
            .variants()
            .iter()
            .filter(|v| self.handlers.contains_key(&v.tag))
            .map(|v| v.name.as_str())
            .collect();
        f.debug_struct("CaseMap")
            .field("sum", &self.schema.name())
            .field("cases", &cases)
            .finish()
    }
}
