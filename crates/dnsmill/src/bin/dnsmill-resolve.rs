// # dnsmill-resolve
//
// Resolve host address specifiers (e.g. `interface,external!eth0`) with the
// same resolver `dnsmill` uses and print one IP per line.

use std::process::ExitCode;

use clap::Parser;
use dnsmill::DnsmillExitCode;
use dnsmill_core::HostAddress;
use tracing::error;

/// Resolve host address specifiers and print the IPs
#[derive(Debug, Parser)]
#[command(name = "dnsmill-resolve")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Host address specifiers, `flags!address`
    #[arg(default_value = "external!")]
    specifiers: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = dnsmill::init_tracing(cli.verbose, false) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DnsmillExitCode::ConfigError.into();
    }

    let mut addrs = Vec::with_capacity(cli.specifiers.len());
    for spec in &cli.specifiers {
        match HostAddress::parse(spec) {
            Ok(addr) => addrs.push(addr),
            Err(e) => {
                error!("{e}");
                return DnsmillExitCode::ConfigError.into();
            }
        }
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return DnsmillExitCode::RuntimeError.into();
        }
    };

    let resolver = dnsmill::resolver();

    rt.block_on(async {
        for addr in &addrs {
            match resolver.resolve(addr).await {
                Ok(ips) => {
                    for ip in ips {
                        println!("{ip}");
                    }
                }
                Err(e) => {
                    error!(address = %addr, "{e}");
                    return DnsmillExitCode::RuntimeError;
                }
            }
        }
        DnsmillExitCode::Clean
    })
    .into()
}
