use std::collections::BTreeMap;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::ConfigError;
use crate::scheduler::Scheduler;
use crate::schedulers::fmheft::FmheftScheduler;
use crate::schedulers::ppmheft::{PpmheftScheduler, PurgePolicy};
use crate::schedulers::wpmheft::WpmheftScheduler;

/// Scheduler descriptor of the form `Name` or `Name[key=value,...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerParams {
    name: String,
    params: BTreeMap<String, String>,
}

impl FromStr for SchedulerParams {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::UnknownScheduler(s.to_string());
        let (name, body) = match s.split_once('[') {
            Some((name, rest)) => (name, rest.strip_suffix(']').ok_or_else(malformed)?),
            None => (s, ""),
        };
        let params = body
            .split(',')
            .filter(|param| !param.trim().is_empty())
            .map(|param| {
                param
                    .split_once('=')
                    .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                    .ok_or_else(malformed)
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self {
            name: name.trim().to_string(),
            params,
        })
    }
}

impl SchedulerParams {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed value of a parameter, `None` if it is not given.
    ///
    /// A value that does not parse makes the whole descriptor invalid.
    pub fn get<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.params
            .get(key)
            .map(|value| value.parse().map_err(|_| self.invalid()))
            .transpose()
    }

    /// Fails if the descriptor has a parameter the scheduler does not accept.
    fn check_keys(&self, accepted: &[&str]) -> Result<(), ConfigError> {
        match self.params.keys().find(|key| !accepted.contains(&key.as_str())) {
            Some(key) => {
                log::warn!("scheduler {} does not accept parameter {}", self.name, key);
                Err(self.invalid())
            }
            None => Ok(()),
        }
    }

    fn invalid(&self) -> ConfigError {
        ConfigError::UnknownScheduler(self.to_string())
    }
}

impl std::fmt::Display for SchedulerParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            let params = self
                .params
                .iter()
                .format_with(",", |(key, value), f| f(&format_args!("{}={}", key, value)));
            write!(f, "[{}]", params)?;
        }
        Ok(())
    }
}

impl PpmheftScheduler {
    /// Builds the scheduler from `Ppmheft[purge=infeasible|all|keep]`, the purge policy is optional.
    pub fn from_scheduler_params(params: &SchedulerParams, processors: usize) -> Result<Self, ConfigError> {
        params.check_keys(&["purge"])?;
        let purge_policy = params.get::<PurgePolicy>("purge")?.unwrap_or_default();
        Ok(Self::new(processors).with_purge_policy(purge_policy))
    }
}

/// Builds a scheduler for `processors` processors by its descriptor.
pub fn default_scheduler_resolver(
    params: &SchedulerParams,
    processors: usize,
) -> Result<Box<dyn Scheduler>, ConfigError> {
    match params.name.to_lowercase().as_str() {
        "fmheft" | "f_mheft" => {
            params.check_keys(&[])?;
            Ok(Box::new(FmheftScheduler::new(processors)))
        }
        "wpmheft" | "wp_mheft" => {
            params.check_keys(&[])?;
            Ok(Box::new(WpmheftScheduler::new(processors)))
        }
        "ppmheft" | "pp_mheft" => Ok(Box::new(PpmheftScheduler::from_scheduler_params(params, processors)?)),
        _ => Err(params.invalid()),
    }
}
