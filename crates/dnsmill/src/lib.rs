//! Composition layer shared by the `dnsmill` and `dnsmill-resolve` binaries.
//!
//! Everything with behaviour lives in `dnsmill-core`; this crate only wires
//! the concrete providers, the HTTP echo transport and logging together.

use std::future::Future;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use dnsmill_core::{HostResolver, ProfileFormat, ProviderRegistry};
use dnsmill_ip_http::HttpIpEcho;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the binaries
///
/// - 0: Clean exit
/// - 1: Configuration, parse or validation error
/// - 2: Runtime error (resolution or provider failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsmillExitCode {
    Clean = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DnsmillExitCode> for ExitCode {
    fn from(code: DnsmillExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Profile format chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Fixed(ProfileFormat),
    /// Detect from the file extension
    Auto,
}

impl FormatArg {
    pub fn format(self) -> Option<ProfileFormat> {
        match self {
            Self::Fixed(format) => Some(format),
            Self::Auto => None,
        }
    }
}

/// clap value parser for `--format`; an empty value means `auto`
pub fn parse_format(value: &str) -> std::result::Result<FormatArg, String> {
    match value.trim() {
        "" | "auto" => Ok(FormatArg::Auto),
        other => other
            .parse()
            .map(FormatArg::Fixed)
            .map_err(|_| format!("expected json, yaml or auto, got {other:?}")),
    }
}

/// Whether log output should be coloured
fn use_ansi(no_color: bool, is_terminal: bool) -> bool {
    !no_color && is_terminal
}

/// Install the global tracing subscriber, writing to stderr
pub fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let ansi = use_ansi(
        std::env::var_os("NO_COLOR").is_some(),
        std::io::stderr().is_terminal(),
    );

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish())?;
    }
    Ok(())
}

/// Registry of every provider compiled into this build
pub fn registry() -> dnsmill_core::Result<ProviderRegistry> {
    #[allow(unused_mut)]
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "cloudflare")]
    dnsmill_provider_cloudflare::register(&mut registry)?;

    Ok(registry)
}

/// Resolver backed by this machine and the configured IP echo endpoint
pub fn resolver() -> HostResolver {
    let echo = HttpIpEcho::from_env();
    tracing::debug!(endpoint = %dnsmill_core::IpEcho::endpoint(&echo), "using IP echo endpoint");
    HostResolver::system(Arc::new(echo))
}

/// Run `work` until it completes or `shutdown` fires.
///
/// Returns `None` when interrupted; `work` is dropped at its current await
/// point, so a zone already submitted stays applied and the in-flight one
/// is abandoned.
pub async fn run_until_interrupted<F, S>(work: F, shutdown: S) -> Option<F::Output>
where
    F: Future,
    S: Future<Output = &'static str>,
{
    tokio::select! {
        output = work => Some(output),
        signal = shutdown => {
            tracing::warn!(signal, "received shutdown signal");
            None
        }
    }
}

/// Wait for SIGINT or SIGTERM
#[cfg(unix)]
pub async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("failed to install signal handlers: {e}");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Wait for CTRL-C
#[cfg(not(unix))]
pub async fn shutdown_signal() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT",
        Err(e) => {
            tracing::warn!("failed to wait for CTRL-C: {e}");
            std::future::pending().await
        }
    }
}
