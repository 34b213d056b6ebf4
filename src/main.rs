//! applink-resolve entry point
//!
//! Command-line front end for the App Link resolver: fetches a URL the way an
//! App Link parser would and prints the terminal response.

use anyhow::Context;
use applink_resolver::config::{load_config, Config};
use applink_resolver::{MissingLocationPolicy, RedirectLimit, Resolution, Resolver};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Resolve a URL to the HTML document an App Link parser would read
///
/// Every redirect hop is requested with `Prefer-Html-Meta-Tags: al`.
#[derive(Parser, Debug)]
#[command(name = "applink-resolve")]
#[command(version)]
#[command(about = "Resolve a URL to its App Link HTML document", long_about = None)]
struct Cli {
    /// Absolute URL to resolve
    #[arg(value_name = "URL")]
    url: Url,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of redirects to follow
    #[arg(long, value_name = "N", conflicts_with = "unbounded")]
    max_redirects: Option<u32>,

    /// Follow redirects without a limit
    #[arg(long)]
    unbounded: bool,

    /// Fail instead of retrying when a redirect has no Location header
    #[arg(long)]
    fail_on_missing_location: bool,

    /// Print status line and response headers before the body
    #[arg(short, long)]
    include_headers: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let resolver = build_resolver(&cli, &config)?;
    tracing::debug!("Using {:?}", resolver);

    match resolver.resolve(&cli.url).await {
        Ok(resolution) => {
            print_resolution(&resolution, cli.include_headers)?;
            Ok(())
        }
        Err(e) => {
            tracing::error!("Resolution of {} failed: {}", cli.url, e);
            Err(e).with_context(|| format!("Failed to resolve {}", cli.url))
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("applink_resolver=warn,warn"),
            1 => EnvFilter::new("applink_resolver=info,warn"),
            2 => EnvFilter::new("applink_resolver=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the resolver, letting command-line flags override the config file
fn build_resolver(cli: &Cli, config: &Config) -> anyhow::Result<Resolver> {
    let mut resolver = Resolver::from_config(config).context("Failed to build HTTP client")?;

    if cli.unbounded {
        resolver = resolver.with_redirect_limit(RedirectLimit::Unbounded);
    } else if let Some(max) = cli.max_redirects {
        resolver = resolver.with_redirect_limit(RedirectLimit::Bounded(max));
    }

    if cli.fail_on_missing_location {
        resolver = resolver.with_missing_location(MissingLocationPolicy::Fail);
    }

    Ok(resolver)
}

/// Writes the terminal response to stdout
fn print_resolution(resolution: &Resolution, include_headers: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if include_headers {
        writeln!(
            out,
            "{} {}",
            resolution.response.status_code,
            resolution.final_url()
        )?;
        for (name, value) in &resolution.response.headers {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)?;
    }

    out.write_all(&resolution.data)?;
    out.flush()?;
    Ok(())
}
