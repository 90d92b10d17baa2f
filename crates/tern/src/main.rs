//! Tern
//!
//! Decodes DNS messages and applies RFC 2136 dynamic updates to the zones
//! described by a configuration file.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, debug, warn};

use tern::input::{decode_hex, read_input, split_messages};
use tern::logging::{LogConfig, LogFormat, init_tracing, parse_log_level};
use tern::setup::{build_filter, build_handler, build_zones};
use tern_config::{Config, ConfigHolder};
use tern_filter::Filter;
use tern_proto::wire::frame_tcp;
use tern_proto::{Header, Message, Name, OpCode, Question, RecordClass, Type};
use tern_zone::Zone;

/// DNS message decoding and dynamic zone updates
#[derive(Parser, Debug)]
#[command(name = "tern")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that read messages.
#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Input file, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Input is hex text rather than raw bytes
    #[arg(long)]
    hex: bool,

    /// Input is a stream of length-prefixed TCP messages
    #[arg(long)]
    tcp: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode DNS messages and print them
    Decode {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Apply UPDATE messages to the configured zones and print the responses
    Update {
        #[command(flatten)]
        input: InputArgs,

        /// Write the encoded responses to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the zones after all updates
        #[arg(long)]
        dump: bool,
    },

    /// Check whether the configured filters permit a query
    Check {
        /// Query name
        name: String,

        /// Query type
        #[arg(short = 't', long = "type", default_value = "A")]
        rtype: String,
    },

    /// Print the records of the configured zones
    Zones {
        /// Only print this zone
        origin: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Show detailed validation output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Find the configuration file in standard locations
fn find_config_file(explicit_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path);
    }

    [
        "./tern.yaml",
        "./tern.yml",
        "./tern.toml",
        "/etc/tern/tern.yaml",
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

fn load_config(explicit_path: Option<PathBuf>) -> Result<Arc<Config>> {
    match find_config_file(explicit_path) {
        Some(path) => {
            let holder = ConfigHolder::from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            Ok(holder.get())
        }
        None => Ok(Arc::new(Config::default())),
    }
}

/// Initialize logging/tracing subsystem
fn init_logging(config: &Config, cli_level: Option<&str>, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        parse_log_level(cli_level.unwrap_or(&config.logging.level))
    };

    init_tracing(&LogConfig {
        level,
        format: LogFormat::from_name(&config.logging.format),
        span_events: false,
    });
}

async fn read_messages(args: &InputArgs) -> Result<Vec<Vec<u8>>> {
    let mut data = read_input(args.input.as_deref()).await?;
    if args.hex {
        data = decode_hex(&data)?;
    }
    Ok(split_messages(&data, args.tcp)?
        .into_iter()
        .map(<[u8]>::to_vec)
        .collect())
}

async fn decode(args: &InputArgs) -> Result<()> {
    let messages = read_messages(args).await?;
    let mut failures = 0;

    for (i, wire) in messages.iter().enumerate() {
        match Message::decode(wire) {
            Ok(message) => println!("{message}"),
            Err(e) => {
                failures += 1;
                eprintln!("message {}: {e}", i + 1);
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} messages failed to decode", messages.len());
    }
    Ok(())
}

async fn update(
    config: &Config,
    args: &InputArgs,
    output: Option<PathBuf>,
    dump: bool,
) -> Result<()> {
    let handler = build_handler(config).await?;
    let messages = read_messages(args).await?;

    let mut encoded = Vec::new();
    for (i, wire) in messages.iter().enumerate() {
        let Some(reply) = handler.handle_wire(wire).await else {
            warn!(message = i + 1, "no response: not a readable request");
            continue;
        };
        let response = Message::decode(&reply).context("failed to decode own response")?;
        println!("{response}");

        if args.tcp {
            encoded.extend_from_slice(&frame_tcp(&reply)?);
        } else {
            encoded.extend_from_slice(&reply);
        }
    }

    if let Some(path) = output {
        tokio::fs::write(&path, &encoded)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = encoded.len(), "responses written");
    }

    if dump {
        print_zones(handler.zones().as_ref(), None);
    }
    Ok(())
}

fn print_zones(zones: &tern_zone::ZoneTree, only: Option<&Name>) {
    let mut names = zones.zone_names();
    names.sort_by_key(ToString::to_string);

    for origin in names.iter().filter(|n| only.is_none_or(|o| o == *n)) {
        let Some(zone) = zones.get(origin) else {
            continue;
        };
        let records = zone.records();
        println!("; zone {origin} ({} records)", records.len());
        for record in records.iter() {
            println!("{record}");
        }
        println!();
    }
}

async fn check(config: &Config, name: &str, rtype: &str) -> Result<()> {
    let filter = build_filter(&config.filter).await?;
    let name = Name::from_str(name).with_context(|| format!("invalid name '{name}'"))?;
    let rtype = Type::from_str(rtype)?;

    let query = Header::with_question(
        OpCode::Query,
        Question::new(name.clone(), rtype, RecordClass::IN),
    );
    let verdict = if filter.is_permitted(&query) {
        "permitted"
    } else {
        "blocked"
    };
    println!("{name} {rtype} {verdict}");
    Ok(())
}

async fn zones(config: &Config, origin: Option<&str>) -> Result<()> {
    let tree = build_zones(config).await?;
    let only = origin
        .map(|o| Name::from_str(o).with_context(|| format!("invalid zone '{o}'")))
        .transpose()?;
    if let Some(o) = &only {
        if tree.get(o).is_none() {
            bail!("zone {o} is not configured");
        }
    }
    print_zones(&tree, only.as_ref());
    Ok(())
}

fn validate_config(path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let Some(path) = find_config_file(path) else {
        bail!("No configuration file found");
    };

    let config = Config::from_file(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.validate().context("Invalid configuration")?;

    println!("Configuration is valid: {}", path.display());
    if verbose {
        println!("  Zones: {}", config.zones.len());
        for zone in &config.zones {
            println!(
                "    {} ({} host sources, {} static hosts)",
                zone.origin,
                zone.hosts.len(),
                zone.static_hosts.len()
            );
        }
        println!("  SOA serial bump: {}", config.update.bump_soa_serial);
        println!(
            "  Filtering: {} ({} block lists, {} allow lists)",
            if config.filter.enabled { "enabled" } else { "disabled" },
            config.filter.blocklists.len(),
            config.filter.allowlists.len()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Validate { verbose } = &cli.command {
        return validate_config(cli.config, *verbose);
    }

    let config = load_config(cli.config.clone())?;
    init_logging(&config, cli.log_level.as_deref(), cli.quiet);

    match &cli.command {
        Commands::Decode { input } => decode(input).await,
        Commands::Update {
            input,
            output,
            dump,
        } => update(&config, input, output.clone(), *dump).await,
        Commands::Check { name, rtype } => check(&config, name, rtype).await,
        Commands::Zones { origin } => zones(&config, origin.as_deref()).await,
        Commands::Validate { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_args() {
        let cli = Cli::parse_from(["tern", "-c", "tern.yaml", "update", "--tcp", "req.bin", "--dump"]);
        assert_eq!(cli.config, Some(PathBuf::from("tern.yaml")));
        match cli.command {
            Commands::Update { input, dump, output } => {
                assert!(input.tcp);
                assert!(!input.hex);
                assert!(dump);
                assert!(output.is_none());
                assert_eq!(input.input, Some(PathBuf::from("req.bin")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let path = PathBuf::from("/nonexistent/tern.yaml");
        assert_eq!(find_config_file(Some(path.clone())), Some(path));
    }
}
