//! The run context: one registry, one randomness source, one seed per run.
//!
//! Every typed parameter and generator takes a `&mut Scope` instead of reaching
//! for process-wide state. A scope is built from a [`ScopeConfig`], usually
//! scanned from the process arguments with [`ScopeConfig::from_args`].

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{AutotestError, AutotestResult};
use crate::registry::{Mode, ParamRegistry, Resolution};
use crate::seed::{compute_seed, RandomSource};
use crate::spec::{ParamSpec, SpecFormat};
use crate::transport::{ParamTransport, StdioTransport};

/// Name of the spec dump inside the system temp directory.
pub const DEFAULT_SPEC_FILENAME: &str = "params.sexp";

/// Configuration for a [`Scope`]
#[derive(Debug, Clone)]
pub struct ScopeConfig {
    /// Raw values supplied up front
    pub params: BTreeMap<String, String>,

    /// Batch (missing is fatal) or interactive (missing is requested)
    pub mode: Mode,

    /// Where the spec table is dumped when a batch parameter is missing
    pub spec_output: PathBuf,

    /// Encoding used for the dump and for interactive request lines
    pub spec_format: SpecFormat,

    /// Upper bound on a single interactive wait; `None` waits forever
    pub interactive_timeout: Option<Duration>,

    /// Seed for the randomness source
    pub seed: u64,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        let no_args: [&str; 0] = [];
        Self {
            params: BTreeMap::new(),
            mode: Mode::Batch,
            spec_output: std::env::temp_dir().join(DEFAULT_SPEC_FILENAME),
            spec_format: SpecFormat::SExpr,
            interactive_timeout: Some(Duration::from_secs(300)),
            seed: compute_seed(&no_args),
        }
    }
}

impl ScopeConfig {
    /// Scan process arguments (program name excluded).
    ///
    /// Recognized: `-P<name> <value>`, `-po <path>` and `--interactive`.
    /// The seed is derived from the same argument strings.
    pub fn from_args<I, S>(args: I) -> AutotestResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut config = ScopeConfig {
            seed: compute_seed(&args),
            ..ScopeConfig::default()
        };
        debug!("Seed: {}", config.seed);

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if let Some(name) = arg.strip_prefix("-P") {
                if name.is_empty() {
                    return Err(AutotestError::InvalidName { name: String::new() });
                }
                let value = iter
                    .next()
                    .ok_or_else(|| AutotestError::MissingOptionValue { option: arg.clone() })?;
                debug!("CLI param: {} = {}", name, value);
                config.params.insert(name.to_string(), value.clone());
            } else if arg == "-po" {
                let path = iter
                    .next()
                    .ok_or_else(|| AutotestError::MissingOptionValue { option: arg.clone() })?;
                debug!("params output override to: {}", path);
                config.spec_output = PathBuf::from(path);
            } else if arg == "--interactive" {
                config.mode = Mode::Interactive;
            } else {
                return Err(AutotestError::UnrecognizedOption { option: arg.clone() });
            }
        }
        Ok(config)
    }
}

pub struct Scope {
    registry: ParamRegistry,
    random: RandomSource,
    mode: Mode,
    spec_output: PathBuf,
    spec_format: SpecFormat,
    transport: Box<dyn ParamTransport>,
}

impl Scope {
    /// Build a scope that talks to stdin/stdout in interactive mode.
    pub fn new(config: ScopeConfig) -> Self {
        let transport = Box::new(StdioTransport::new(config.interactive_timeout));
        Self::with_transport(config, transport)
    }

    /// Build a scope with a caller-provided interactive transport.
    pub fn with_transport(config: ScopeConfig, transport: Box<dyn ParamTransport>) -> Self {
        Self {
            registry: ParamRegistry::with_values(config.params),
            random: RandomSource::new(config.seed),
            mode: config.mode,
            spec_output: config.spec_output,
            spec_format: config.spec_format,
            transport,
        }
    }

    pub fn seed(&self) -> u64 {
        self.random.seed()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn spec_output(&self) -> &PathBuf {
        &self.spec_output
    }

    pub fn registry(&self) -> &ParamRegistry {
        &self.registry
    }

    /// The single randomness source all sampling draws from.
    pub fn random(&mut self) -> &mut RandomSource {
        &mut self.random
    }

    /// Override the raw value for `name`; the next `get()` validates it.
    pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
        self.registry.set_raw(name, value);
    }

    /// Declare `name`, failing on duplicates or unusable declarations.
    pub fn register(&mut self, name: &str, spec: ParamSpec) -> AutotestResult<()> {
        self.registry.register(name, spec)?;
        if self.registry.lookup_raw(name).is_none() {
            debug!(
                "Param '{}' not supplied. Any call to get() will need the missing-parameter protocol.",
                name
            );
        }
        Ok(())
    }

    /// Write the full spec table to the configured output path.
    pub fn dump_specs(&self) -> AutotestResult<()> {
        let specs = self.registry.serialize_all_specs(self.spec_format)?;
        fs::write(&self.spec_output, format!("{}\n", specs))?;
        info!("Param specs dumped to {}", self.spec_output.display());
        Ok(())
    }

    /// Raw value for `name`, running the missing-parameter protocol if needed.
    ///
    /// Interactive answers are stored, so later calls do not ask again.
    pub fn raw_value(&mut self, name: &str) -> AutotestResult<String> {
        match self.registry.resolve(name, self.mode) {
            Resolution::Resolved(value) => Ok(value),
            Resolution::NeedsInteractiveInput => {
                let spec = self
                    .registry
                    .spec(name)
                    .ok_or_else(|| AutotestError::InvalidName { name: name.to_string() })?
                    .render(self.spec_format)?;
                let value = self.transport.request(name, &spec)?;
                self.registry.set_raw(name, value.clone());
                Ok(value)
            }
            Resolution::Fatal(reason) => {
                warn!("{}; dumping specs", reason);
                self.dump_specs()?;
                Err(AutotestError::MissingParameter {
                    name: name.to_string(),
                    dump_path: self.spec_output.clone(),
                })
            }
        }
    }
}
