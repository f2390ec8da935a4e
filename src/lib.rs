//! # autotest
//!
//! Randomized, parameter-driven test inputs for algorithmic problems.
//!
//! A generator declares named, typed, bounds-checked parameters on a [`Scope`].
//! Values come from the command line (`-Pname value`). When one is missing the
//! scope either fails after dumping every declared spec (batch mode) or asks
//! for it over a line protocol (interactive mode). The generators themselves
//! (random trees and integer partitions) draw all their randomness from the
//! scope's single seeded source through the Kumaraswamy distribution.

pub mod distributions;
pub mod error;
pub mod params;
pub mod partitions;
pub mod registry;
pub mod scope;
pub mod seed;
pub mod spec;
pub mod transport;
pub mod trees;

pub use distributions::{Kumaraswamy, ShapeParams};
pub use error::{AutotestError, AutotestResult};
pub use params::{ChoiceParam, FloatParam, IntegerParam, Param};
pub use partitions::PartitionGen;
pub use registry::{Mode, ParamRegistry, Resolution};
pub use scope::{Scope, ScopeConfig};
pub use seed::{compute_seed, RandomSource};
pub use spec::{parse_spec, parse_spec_table, render_spec_table, ParamSpec, ParamValue, SpecFormat};
pub use transport::{LineTransport, ParamTransport, StdioTransport, PARAM_REQUEST_TOKEN};
pub use trees::{Tree, TreeGen};
