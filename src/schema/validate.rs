//! Optional JSON Schema documents attached to a route.
//!
//! Documents are compiled once, at registration; a document that does not
//! compile fails the registration. At request time each part is checked
//! against its compiled document before typed decoding. String-valued parts
//! (params, querystring, headers) are checked as strings first; a value the
//! document rejects is then read as a number or boolean and checked again.

use std::collections::BTreeSet;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::{Map, Value};
use tracing::debug;

use super::decode::coerce_value;
use crate::error::RouteError;

/// JSON Schema documents for the request parts of one route
#[derive(Debug, Clone, Default)]
pub struct SchemaDocs {
    pub body: Option<Value>,
    pub headers: Option<Value>,
    pub querystring: Option<Value>,
    pub params: Option<Value>,
}

impl SchemaDocs {
    pub fn is_empty(&self) -> bool {
        self.body.is_none()
            && self.headers.is_none()
            && self.querystring.is_none()
            && self.params.is_none()
    }
}

fn compile_part(
    part: &'static str,
    doc: Option<&Value>,
) -> Result<Option<Arc<Validator>>, RouteError> {
    doc.map(|schema| {
        jsonschema::validator_for(schema)
            .map(Arc::new)
            .map_err(|err| RouteError::InvalidSchema {
                part,
                message: err.to_string(),
            })
    })
    .transpose()
}

/// Compiled validators for one route
#[derive(Clone, Default)]
pub(crate) struct CompiledSchemas {
    body: Option<Arc<Validator>>,
    headers: Option<Arc<Validator>>,
    querystring: Option<Arc<Validator>>,
    params: Option<Arc<Validator>>,
}

impl CompiledSchemas {
    pub(crate) fn compile(docs: &SchemaDocs) -> Result<Self, RouteError> {
        Ok(Self {
            body: compile_part("body", docs.body.as_ref())?,
            headers: compile_part("headers", docs.headers.as_ref())?,
            querystring: compile_part("querystring", docs.querystring.as_ref())?,
            params: compile_part("params", docs.params.as_ref())?,
        })
    }

    /// Names of the parts that carry a document
    pub(crate) fn parts(&self) -> Vec<&'static str> {
        [
            ("body", self.body.is_some()),
            ("headers", self.headers.is_some()),
            ("querystring", self.querystring.is_some()),
            ("params", self.params.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.parts().is_empty()
    }

    pub(crate) fn check_body(&self, body: &Value) -> Result<(), String> {
        match &self.body {
            Some(v) => check("body", v, body),
            None => Ok(()),
        }
    }

    pub(crate) fn check_headers(&self, headers: &Map<String, Value>) -> Result<(), String> {
        check_strings("headers", self.headers.as_deref(), headers)
    }

    pub(crate) fn check_querystring(&self, query: &Map<String, Value>) -> Result<(), String> {
        check_strings("querystring", self.querystring.as_deref(), query)
    }

    pub(crate) fn check_params(&self, params: &Map<String, Value>) -> Result<(), String> {
        check_strings("params", self.params.as_deref(), params)
    }
}

impl std::fmt::Debug for CompiledSchemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchemas")
            .field("parts", &self.parts())
            .finish()
    }
}

fn check(part: &str, validator: &Validator, instance: &Value) -> Result<(), String> {
    let details: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| e.to_string())
        .collect();
    if details.is_empty() {
        Ok(())
    } else {
        debug!(part = part, errors = ?details, "Request validation failed");
        Err(format!("{part} {}", details.join("; ")))
    }
}

/// First segment of a JSON pointer such as `/limit` or `/tags/0`
fn top_level_key(pointer: &str) -> Option<String> {
    let first = pointer.strip_prefix('/')?.split('/').next()?;
    Some(first.replace("~1", "/").replace("~0", "~"))
}

fn check_strings(
    part: &str,
    validator: Option<&Validator>,
    raw: &Map<String, Value>,
) -> Result<(), String> {
    let Some(validator) = validator else {
        return Ok(());
    };
    let raw_value = Value::Object(raw.clone());
    let mut details = Vec::new();
    let mut rejected = BTreeSet::new();
    for err in validator.iter_errors(&raw_value) {
        if let Some(key) = top_level_key(&err.instance_path().to_string()) {
            rejected.insert(key);
        }
        details.push(err.to_string());
    }
    if details.is_empty() {
        return Ok(());
    }

    // Only values the document rejected are read as scalars
    let mut adjusted = raw.clone();
    for key in &rejected {
        if let Some(value) = adjusted.get_mut(key) {
            *value = coerce_value(value);
        }
    }
    if !rejected.is_empty() && validator.is_valid(&Value::Object(adjusted)) {
        return Ok(());
    }

    debug!(part = part, errors = ?details, "Request validation failed");
    Err(format!("{part} {}", details.join("; ")))
}
