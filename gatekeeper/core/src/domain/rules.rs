// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Extraction and Injection Rules
//!
//! Extraction rules say which request fields are copied into the decision
//! input; injection rules say where the decision is written back.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Validated rule sets built once per filter instance

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::domain::document;
use crate::domain::path::{PathError, PathExpression};

/// Output-field name → extracted value. Built fresh for every request.
pub type FieldMap = Map<String, Value>;

/// Where an extracted field comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// A spec with no `.` is copied verbatim.
    Constant(String),
    Path(PathExpression),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRule {
    pub field: String,
    pub source: FieldSource,
    /// A required rule that yields nothing aborts the decision.
    pub required: bool,
}

impl ExtractionRule {
    pub fn parse(field: impl Into<String>, spec: &str) -> Result<Self, PathError> {
        let source = if spec.contains('.') {
            FieldSource::Path(PathExpression::parse(spec)?)
        } else {
            FieldSource::Constant(spec.to_string())
        };
        Ok(Self {
            field: field.into(),
            source,
            required: false,
        })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Extraction rules keyed by output field. Inserting a field twice keeps
/// the later rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRules {
    rules: BTreeMap<String, ExtractionRule>,
}

impl ExtractionRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `field → spec` pairs.
    pub fn parse<'a, I>(specs: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut rules = Self::new();
        for (field, spec) in specs {
            rules.insert(ExtractionRule::parse(field, spec)?);
        }
        Ok(rules)
    }

    pub fn insert(&mut self, rule: ExtractionRule) {
        self.rules.insert(rule.field.clone(), rule);
    }

    /// Mark every rule as required.
    pub fn require_all(mut self) -> Self {
        for rule in self.rules.values_mut() {
            rule.required = true;
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractionRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// What an injection rule writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionSource {
    /// The resolved decision value itself.
    Decision,
    /// A dotted field looked up in the decision service's response.
    Field(String),
    Literal(String),
}

impl InjectionSource {
    pub fn resolve(&self, decision: &Value, response: &Value) -> Option<Value> {
        match self {
            InjectionSource::Decision => Some(decision.clone()),
            InjectionSource::Field(name) => document::lookup_dotted(response, name).cloned(),
            InjectionSource::Literal(value) => Some(Value::String(value.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionRule {
    pub target: PathExpression,
    pub source: InjectionSource,
}

impl InjectionRule {
    pub fn parse(target: &str, source: InjectionSource) -> Result<Self, PathError> {
        Ok(Self {
            target: PathExpression::parse_target(target)?,
            source,
        })
    }
}

/// Injection rules keyed by destination path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionRules {
    rules: BTreeMap<String, InjectionRule>,
}

impl InjectionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule: InjectionRule) {
        self.rules.insert(rule.target.as_str().to_string(), rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &InjectionRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
