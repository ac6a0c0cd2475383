// # dnsmill - apply a DNS profile
//
// This binary is a THIN integration layer:
// 1. Parse the command line
// 2. Initialize logging and the runtime
// 3. Load and validate the profile
// 4. Hand it to `dnsmill_core::ApplyEngine`
//
// ## Environment
//
// - `CLOUDFLARE_API_TOKEN`: credential for the `cloudflare` provider
// - `DNSMILL_EXTERNAL_IP_URL`: IP echo endpoint (default `https://ifconfig.me/ip`)
// - `NO_COLOR`: disable coloured log output
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
// dnsmill --dry-run -v profile.yaml
// ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dnsmill::{DnsmillExitCode, FormatArg, parse_format};
use dnsmill_core::{ApplyEngine, Profile};
use tracing::{error, info};

/// Apply the records of a profile to their DNS providers
#[derive(Debug, Parser)]
#[command(name = "dnsmill")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Resolve and convert records without submitting them
    #[arg(long)]
    dry_run: bool,

    /// Log as JSON lines
    #[arg(long, short)]
    json_log: bool,

    /// Profile format: json, yaml or auto (detect from extension)
    #[arg(long, short, default_value = "yaml", value_parser = parse_format)]
    format: FormatArg,

    /// List the available providers and exit
    #[arg(long)]
    list_providers: bool,

    /// Path to the profile
    #[arg(required_unless_present = "list_providers")]
    profile: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = dnsmill::init_tracing(cli.verbose, cli.json_log) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DnsmillExitCode::ConfigError.into();
    }

    let registry = match dnsmill::registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!("failed to register providers: {e}");
            return DnsmillExitCode::ConfigError.into();
        }
    };

    if cli.list_providers {
        for factory in registry.list() {
            println!("{}\t{}", factory.name(), factory.doc_url());
        }
        return DnsmillExitCode::Clean.into();
    }

    let Some(path) = cli.profile else {
        error!("no profile given");
        return DnsmillExitCode::ConfigError.into();
    };

    let profile = match load_profile(&path, cli.format, &registry) {
        Ok(profile) => profile,
        Err(e) => {
            error!("{e:#}");
            return DnsmillExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return DnsmillExitCode::RuntimeError.into();
        }
    };

    let engine = ApplyEngine::new(Arc::new(registry), dnsmill::resolver());

    rt.block_on(async {
        let applied =
            dnsmill::run_until_interrupted(engine.apply(&profile, cli.dry_run), dnsmill::shutdown_signal())
                .await;

        let Some(result) = applied else {
            error!("interrupted, aborting apply");
            return DnsmillExitCode::RuntimeError;
        };

        match result {
            Ok(()) => {
                info!(dry_run = cli.dry_run, "profile applied");
                DnsmillExitCode::Clean
            }
            Err(e) => {
                for err in e.errors() {
                    error!("{err}");
                }
                DnsmillExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Load, parse and validate the profile, including its provider names
fn load_profile(
    path: &Path,
    format: FormatArg,
    registry: &dnsmill_core::ProviderRegistry,
) -> anyhow::Result<Profile> {
    let profile = Profile::load(path, format.format())
        .with_context(|| format!("failed to load profile {}", path.display()))?;
    profile.validate_providers(registry)?;

    info!(
        path = %path.display(),
        providers = profile.providers.len(),
        records = profile.records.len(),
        "profile loaded"
    );
    Ok(profile)
}
