//! Error types for dnsmill
//!
//! Errors fall into a few broad kinds:
//! - parse and validation errors, raised while reading a profile and always
//!   before any network I/O happens
//! - resolution errors, scoped to the host address being resolved
//! - provider errors, scoped to the zone being applied
//!
//! [`Error::Context`] wraps an error with a human readable message and
//! [`Error::Multiple`] joins several independent failures into one.

use std::fmt;

use thiserror::Error;

/// Result type alias for dnsmill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dnsmill
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed profile document (wrong shape, ambiguous union, unknown key)
    #[error("parse error: {0}")]
    Parse(String),

    /// A host address flag outside the recognized set
    #[error("unknown host address flag {0:?}")]
    UnknownFlag(String),

    /// Two flags of the same exclusivity group
    #[error("mutually exclusive host address flags {first:?} and {second:?} (both have type {group})")]
    ConflictingFlags {
        first: String,
        second: String,
        group: &'static str,
    },

    /// The `external` flag was given together with an address
    #[error("external address cannot have an actual address (needs to be empty), has: {0:?}")]
    ExternalWithAddress(String),

    /// A zone declared by more than one provider
    #[error("domain {0:?} is already managed by another provider")]
    ZoneConflict(String),

    /// A record domain not covered by any declared zone
    #[error("domain {0:?} is not managed by any provider")]
    UnownedDomain(String),

    /// A record domain covered by several declared zones
    #[error("domain {domain:?} is managed by more than one zone: {zones:?}")]
    AmbiguousDomain { domain: String, zones: Vec<String> },

    /// Text that does not parse as an IP literal
    #[error("invalid IP address {0:?}")]
    InvalidIp(String),

    /// Network interface lookup failure
    #[error("failed to get interface {name:?}: {message}")]
    Interface { name: String, message: String },

    /// Hostname lookup failure
    #[error("failed to resolve hostname {host:?}: {message}")]
    Hostname { host: String, message: String },

    /// None of the inferred address types worked
    #[error("cannot guess address type for {0:?}, use an explicit flag")]
    CannotGuess(String),

    /// External IP discovery failure
    #[error("external IP error: {0}")]
    ExternalIp(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found on the provider side
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A required credential is missing
    #[error("environment variable {0} is not set")]
    MissingCredential(String),

    /// Provider name not present in the registry
    #[error("unknown provider: {0:?}")]
    UnknownProvider(String),

    /// Provider registered twice
    #[error("provider {0:?} already registered")]
    DuplicateProvider(String),

    /// Unrecognized duplicate policy value
    #[error("invalid duplicate policy: {0:?}")]
    InvalidPolicy(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An error wrapped with a message describing what was being done
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// Several independent failures
    #[error("{}", Joined(.0))]
    Multiple(Vec<Error>),
}

struct Joined<'a>(&'a [Error]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an interface lookup error
    pub fn interface(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Interface {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a hostname lookup error
    pub fn hostname(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hostname {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create an external IP discovery error
    pub fn external_ip(msg: impl Into<String>) -> Self {
        Self::ExternalIp(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with a message
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Join a list of errors.
    ///
    /// Returns `None` for an empty list and the error itself for a list of one.
    pub fn join(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }

    /// The innermost error behind any [`Error::Context`] layers
    pub fn root_cause(&self) -> &Error {
        let mut err = self;
        while let Self::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// The joined errors, or this error alone
    pub fn errors(&self) -> &[Error] {
        match self {
            Self::Multiple(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }
}

/// Attach context to the error of a `Result`
pub trait ResultExt<T> {
    /// Wrap the error (if any) with a lazily built message
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|err| err.context(f()))
    }
}
