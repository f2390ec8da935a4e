//! Typed parameter handles.
//!
//! Constructing a handle registers its spec immediately, so a spec dump lists
//! every declared parameter even if some are never read. `get()` resolves the
//! raw value through the scope and re-validates it on every call.

use crate::error::AutotestResult;
use crate::scope::Scope;
use crate::spec::{convert_choice, convert_float, convert_integer, ParamSpec, ParamValue};

/// A named, declared parameter of any kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    spec: ParamSpec,
}

impl Param {
    pub fn new(scope: &mut Scope, name: &str, spec: ParamSpec) -> AutotestResult<Self> {
        scope.register(name, spec.clone())?;
        Ok(Self {
            name: name.to_string(),
            spec,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &ParamSpec {
        &self.spec
    }

    pub fn get(&self, scope: &mut Scope) -> AutotestResult<ParamValue> {
        let raw = self.raw(scope)?;
        self.spec.convert(&self.name, &raw)
    }

    fn raw(&self, scope: &mut Scope) -> AutotestResult<String> {
        scope.raw_value(&self.name)
    }
}

/// Integer parameter with inclusive bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerParam {
    param: Param,
    min: i64,
    max: i64,
}

impl IntegerParam {
    pub const DEFAULT_MIN: i64 = 0;
    pub const DEFAULT_MAX: i64 = i32::MAX as i64;

    pub fn new(scope: &mut Scope, name: &str, min: i64, max: i64) -> AutotestResult<Self> {
        let param = Param::new(scope, name, ParamSpec::Integer { min, max })?;
        Ok(Self { param, min, max })
    }

    /// Bounds `[0, i32::MAX]`.
    pub fn with_defaults(scope: &mut Scope, name: &str) -> AutotestResult<Self> {
        Self::new(scope, name, Self::DEFAULT_MIN, Self::DEFAULT_MAX)
    }

    pub fn name(&self) -> &str {
        self.param.name()
    }

    pub fn get(&self, scope: &mut Scope) -> AutotestResult<i64> {
        let raw = self.param.raw(scope)?;
        convert_integer(self.name(), &raw, self.min, self.max)
    }
}

/// Floating point parameter with inclusive bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatParam {
    param: Param,
    min: f64,
    max: f64,
}

impl FloatParam {
    pub fn new(scope: &mut Scope, name: &str, min: f64, max: f64) -> AutotestResult<Self> {
        let param = Param::new(scope, name, ParamSpec::Float { min, max })?;
        Ok(Self { param, min, max })
    }

    /// Bounds `[0.0, 1.0]`.
    pub fn with_defaults(scope: &mut Scope, name: &str) -> AutotestResult<Self> {
        Self::new(scope, name, 0.0, 1.0)
    }

    pub fn name(&self) -> &str {
        self.param.name()
    }

    pub fn get(&self, scope: &mut Scope) -> AutotestResult<f64> {
        let raw = self.param.raw(scope)?;
        convert_float(self.name(), &raw, self.min, self.max)
    }
}

/// Parameter restricted to a fixed, ordered set of strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceParam {
    param: Param,
    choices: Vec<String>,
}

impl ChoiceParam {
    pub fn new<S: AsRef<str>>(scope: &mut Scope, name: &str, choices: &[S]) -> AutotestResult<Self> {
        let choices: Vec<String> = choices.iter().map(|c| c.as_ref().to_string()).collect();
        let param = Param::new(
            scope,
            name,
            ParamSpec::Choice {
                choices: choices.clone(),
            },
        )?;
        Ok(Self { param, choices })
    }

    pub fn name(&self) -> &str {
        self.param.name()
    }

    pub fn get(&self, scope: &mut Scope) -> AutotestResult<String> {
        let raw = self.param.raw(scope)?;
        convert_choice(self.name(), &raw, &self.choices)
    }
}
