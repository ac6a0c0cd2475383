//! Reading profiles from text, readers and files
//!
//! Every entry point parses and then validates. YAML is decoded into the
//! same value tree as JSON, so both share one decoder.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use super::Profile;
use crate::error::{Error, Result, ResultExt};

/// Serialization format of a profile document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Json,
    Yaml,
}

impl ProfileFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(Error::parse(format!(
                "cannot detect profile format of {}",
                path.display()
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl FromStr for ProfileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(Error::parse(format!("unknown profile format {other:?}"))),
        }
    }
}

impl fmt::Display for ProfileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Profile {
    /// Parse and validate a JSON profile
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
            .with_context(|| "failed to parse JSON")?
            .validated()
    }

    /// Parse and validate a YAML profile
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(&value)
            .with_context(|| "failed to parse YAML")?
            .validated()
    }

    /// Read, parse and validate a profile
    pub fn from_reader(mut reader: impl Read, format: ProfileFormat) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        match format {
            ProfileFormat::Json => Self::from_json_str(&text),
            ProfileFormat::Yaml => Self::from_yaml_str(&text),
        }
    }

    /// Load a profile file; the format is detected from the extension when
    /// not given
    pub fn load(path: impl AsRef<Path>, format: Option<ProfileFormat>) -> Result<Self> {
        let path = path.as_ref();
        let format = match format {
            Some(format) => format,
            None => ProfileFormat::from_path(path)?,
        };

        debug!(path = %path.display(), %format, "loading profile");

        let file = std::fs::File::open(path)
            .map_err(Error::from)
            .with_context(|| format!("failed to open profile {}", path.display()))?;
        Self::from_reader(file, format)
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
