use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PathTemplate;
use crate::error::RouteError;

/// Parameters captured from a request path, keyed by name.
///
/// This is the default params shape of every route: the record derived
/// from the path template, mapping each `:name` to its string value. It is
/// a map, not a sequence, so equality does not depend on declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: String, value: String) {
        self.0.insert(name, value);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameter names, sorted
    #[must_use]
    pub fn names(&self) -> BTreeSet<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A type usable as the `params` member of a route schema.
///
/// Implementors decode from the name -> string record captured by the
/// router. A type may also declare which names it expects; registration then
/// checks the declaration against the route template. Types generated by
/// `#[route_params("...")]` declare their names; maps accept any template.
pub trait ParamsShape: DeserializeOwned + Send + 'static {
    /// Names this type expects, or `None` to accept whatever the template declares
    fn declared_names() -> Option<&'static [&'static str]> {
        None
    }

    /// The template the names were extracted from, if known
    fn declared_template() -> Option<&'static str> {
        None
    }
}

impl ParamsShape for PathParams {}
impl ParamsShape for serde_json::Value {}
impl ParamsShape for HashMap<String, String> {}
impl ParamsShape for BTreeMap<String, String> {}

/// Check a params type's declared names against a template.
///
/// Order is irrelevant; only the sets must agree.
pub(crate) fn check_declared<P: ParamsShape>(template: &PathTemplate) -> Result<(), RouteError> {
    let Some(declared) = P::declared_names() else {
        return Ok(());
    };

    let declared_set: BTreeSet<&str> = declared.iter().copied().collect();
    if declared_set == template.param_set() {
        return Ok(());
    }

    Err(RouteError::ParamsMismatch {
        template: template.as_str().to_string(),
        template_params: template.param_names().into_iter().map(str::to_string).collect(),
        declared_params: declared.iter().map(|s| (*s).to_string()).collect(),
    })
}
