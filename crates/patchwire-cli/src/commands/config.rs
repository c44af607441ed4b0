//! Configuration file commands.

use crate::commands::common::load_config;
use clap::{Args, Subcommand};
use patchwire_config::{
    Config, DeviceRegistry, config_file_path, ensure_user_config_dir, patch_name_from_path,
    paths::list_patches_in_dir,
};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the active configuration
    Show,

    /// Show configuration and patch directories
    Paths,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Paths => show_paths(),
        ConfigCommand::Init { force } => init_config(force),
    }
}

fn show_config() -> anyhow::Result<()> {
    let config = load_config()?;
    let path = config_file_path();

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# defaults ({} does not exist)", path.display());
    }
    print!("{}", config.to_toml()?);

    if let Err(e) = config.validate(&DeviceRegistry::new()) {
        println!();
        println!("Warning: {e}");
    }

    Ok(())
}

fn show_paths() -> anyhow::Result<()> {
    let patches_dir = load_config()?.patches_dir();
    println!("Config file:     {}", config_file_path().display());
    println!("User patches:    {}", patches_dir.display());
    println!();

    let patches = list_patches_in_dir(&patches_dir);
    if patches.is_empty() {
        println!("No saved patches. Save one with: patchwire decode <file.syx> -o <name>.toml");
    } else {
        println!("Saved patches:");
        for path in patches {
            println!("  {}", patch_name_from_path(&path).unwrap_or_default());
        }
    }

    Ok(())
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    ensure_user_config_dir()?;
    Config::default().save(&path)?;
    println!("Wrote default configuration to {}", path.display());

    Ok(())
}
