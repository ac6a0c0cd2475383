//! Profile-level configuration
//!
//! The `config` object of a profile. Only the duplicate policy is
//! configurable today.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::decode::{self, deserialize_via_value};
use crate::error::{Error, Result};

/// What to do when an applied record already exists on the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Append only, fail on conflicting existing records
    #[default]
    Error,
    /// Replace existing records
    Overwrite,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Overwrite => "overwrite",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "error" => Ok(Self::Error),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(Error::InvalidPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour of a profile run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Policy for records that already exist, `error` by default
    pub duplicate_policy: DuplicatePolicy,
}

impl Config {
    /// Decode the `config` object
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(Error::parse(format!(
                "expected object for config, got {}",
                decode::shape(value)
            )));
        };

        decode::deny_unknown_keys(object, &["duplicatePolicy"], "config")?;

        let duplicate_policy = match object.get("duplicatePolicy") {
            None | Some(Value::Null) => DuplicatePolicy::default(),
            Some(value) => decode::string(value, "duplicatePolicy")?.parse()?,
        };

        Ok(Self { duplicate_policy })
    }
}

deserialize_via_value!(Config);
