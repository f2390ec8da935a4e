// Shape-controllable sampling on (0, 1), shared by the tree and partition
// generators. We use the Kumaraswamy distribution: close to Beta in the shapes
// it can take, but with a closed-form quantile function, so one sample costs a
// couple of `powf` calls.

use rand::distributions::{Distribution, Open01};
use rand::Rng;

use crate::error::{AutotestError, AutotestResult};
use crate::params::FloatParam;
use crate::scope::Scope;

/// Samples are clamped into `[EPSILON, 1 - EPSILON]`.
pub const EPSILON: f64 = 1e-9;

/// Bounds of the log-shape parameters every generator declares.
pub const LOG_SHAPE_MIN: f64 = -15.0;
pub const LOG_SHAPE_MAX: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kumaraswamy {
    a: f64,
    b: f64,
}

impl Kumaraswamy {
    pub fn new(a: f64, b: f64) -> AutotestResult<Self> {
        if !(a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0) {
            return Err(AutotestError::InvalidShape { a, b });
        }
        Ok(Self { a, b })
    }

    /// Shapes given as natural logarithms.
    pub fn from_log_shapes(loga: f64, logb: f64) -> AutotestResult<Self> {
        Self::new(loga.exp(), logb.exp())
    }

    /// Inverse CDF: solves `1 - (1 - x^a)^b = u` for x.
    pub fn quantile(&self, u: f64) -> f64 {
        let x = (1.0 - (1.0 - u).powf(1.0 / self.b)).powf(1.0 / self.a);
        x.clamp(EPSILON, 1.0 - EPSILON)
    }
}

impl Distribution<f64> for Kumaraswamy {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = Open01.sample(rng);
        self.quantile(u)
    }
}

/// The `<prefix>/loga` and `<prefix>/logb` parameters of one generator.
#[derive(Debug, Clone)]
pub struct ShapeParams {
    loga: FloatParam,
    logb: FloatParam,
}

impl ShapeParams {
    pub fn new(scope: &mut Scope, prefix: &str) -> AutotestResult<Self> {
        Ok(Self {
            loga: FloatParam::new(scope, &format!("{}/loga", prefix), LOG_SHAPE_MIN, LOG_SHAPE_MAX)?,
            logb: FloatParam::new(scope, &format!("{}/logb", prefix), LOG_SHAPE_MIN, LOG_SHAPE_MAX)?,
        })
    }

    pub fn distribution(&self, scope: &mut Scope) -> AutotestResult<Kumaraswamy> {
        let loga = self.loga.get(scope)?;
        let logb = self.logb.get(scope)?;
        Kumaraswamy::from_log_shapes(loga, logb)
    }
}
