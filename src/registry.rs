//! Parameter registry: raw values keyed by name, and the spec declared for each name.
//!
//! Raw values arrive from the argument scanner (or a driver) before generation;
//! specs arrive as typed parameters are constructed. A name may be declared once.
//! Looking up a name yields a [`Resolution`] that tells the caller how to proceed
//! when no value was supplied, rather than failing on the spot.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{AutotestError, AutotestResult};
use crate::spec::{is_valid_label, render_spec_table, ParamSpec, SpecFormat};

/// Whether missing parameters are fatal or requested from a live peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Batch,
    Interactive,
}

/// Outcome of looking up a parameter's raw value.
#[derive(Debug)]
pub enum Resolution {
    /// A value was supplied (or obtained earlier); it still needs validation.
    Resolved(String),
    /// No value yet; the caller must ask for one over the interactive transport.
    NeedsInteractiveInput,
    /// No value and no way to get one. The spec table should be dumped before
    /// the missing-parameter error is surfaced.
    Fatal(String),
}

#[derive(Debug, Clone, Default)]
pub struct ParamRegistry {
    values: BTreeMap<String, String>,
    specs: BTreeMap<String, ParamSpec>,
}

impl ParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from externally supplied raw values.
    pub fn with_values(values: BTreeMap<String, String>) -> Self {
        Self {
            values,
            specs: BTreeMap::new(),
        }
    }

    /// Declare the spec for `name`. Each name may be declared exactly once.
    pub fn register(&mut self, name: &str, spec: ParamSpec) -> AutotestResult<()> {
        if !is_valid_label(name) {
            return Err(AutotestError::InvalidName { name: name.to_string() });
        }
        if self.specs.contains_key(name) {
            return Err(AutotestError::DuplicateParameter { name: name.to_string() });
        }
        spec.validate(name)?;
        debug!("Registered param '{}': {:?}", name, spec);
        self.specs.insert(name.to_string(), spec);
        Ok(())
    }

    pub fn lookup_raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Store (or replace) the raw value for `name`.
    pub fn set_raw(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.get(name)
    }

    pub fn specs(&self) -> &BTreeMap<String, ParamSpec> {
        &self.specs
    }

    /// Registered names, in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Render every registered spec, ordered by name.
    pub fn serialize_all_specs(&self, format: SpecFormat) -> AutotestResult<String> {
        render_spec_table(&self.specs, format)
    }

    /// Decide how `get()` should proceed for `name` under `mode`.
    pub fn resolve(&self, name: &str, mode: Mode) -> Resolution {
        match (self.lookup_raw(name), mode) {
            (Some(value), _) => Resolution::Resolved(value.to_string()),
            (None, Mode::Interactive) => Resolution::NeedsInteractiveInput,
            (None, Mode::Batch) => {
                Resolution::Fatal(format!("no value supplied for '{}' in batch mode", name))
            }
        }
    }
}
