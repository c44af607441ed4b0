//! Patchwire CLI - read, write and convert synthesizer SysEx dumps.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patchwire")]
#[command(author, version, about = "SysEx patch codec for vintage synthesizers", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported devices
    Devices(commands::devices::DevicesArgs),

    /// Show the frames in a .syx file
    Info(commands::info::InfoArgs),

    /// Decode a dump into a patch
    Decode(commands::decode::DecodeArgs),

    /// Encode a patch file into a dump
    Encode(commands::encode::EncodeArgs),

    /// List, extract and retarget bank dumps
    Bank(commands::bank::BankArgs),

    /// Pack 8-bit hex bytes into 7-bit form
    Pack(commands::pack::PackArgs),

    /// Unpack 7-bit hex bytes into 8-bit form
    Unpack(commands::pack::PackArgs),

    /// Write dump request messages to a .syx file
    Request(commands::request::RequestArgs),

    /// Show or create the configuration file
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Decode(args) => commands::decode::run(args),
        Commands::Encode(args) => commands::encode::run(args),
        Commands::Bank(args) => commands::bank::run(args),
        Commands::Pack(args) => commands::pack::run_pack(args),
        Commands::Unpack(args) => commands::pack::run_unpack(args),
        Commands::Request(args) => commands::request::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
