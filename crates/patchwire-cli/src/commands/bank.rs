//! Bank dump commands.
//!
//! Lists, extracts from, builds and retargets whole-bank dumps (4-op VMEM
//! and FB-01 voice banks, and Venom multi-patch files).

use crate::commands::common::{Codec, DeviceOpts, load_patch_file, sysex_frames, write_frames};
use anyhow::Context;
use clap::{Args, Subcommand};
use patchwire_config::PatchFile;
use patchwire_core::{BankCodec, split_frames};
use patchwire_io::read_syx;
use patchwire_registry::DeviceRegistry;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args)]
pub struct BankArgs {
    #[command(subcommand)]
    command: BankCommand,
}

#[derive(Subcommand)]
enum BankCommand {
    /// List the patch names in a bank dump
    List {
        /// Bank .syx file
        file: PathBuf,

        #[command(flatten)]
        device: DeviceOpts,

        /// Print JSON instead of a list
        #[arg(long)]
        json: bool,
    },

    /// Save one patch of a bank dump as a TOML patch file
    Extract {
        /// Bank .syx file
        file: PathBuf,

        #[command(flatten)]
        device: DeviceOpts,

        /// Patch index within the bank
        #[arg(short, long)]
        index: usize,

        /// Output patch file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Build a bank dump from patch files
    Build {
        /// Patch files or names, in bank order
        #[arg(required = true)]
        patches: Vec<String>,

        #[command(flatten)]
        device: DeviceOpts,

        /// Output .syx file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rewrite a dump so it stores into another bank
    Retarget {
        /// Dump .syx file
        file: PathBuf,

        #[command(flatten)]
        device: DeviceOpts,

        /// Destination bank
        #[arg(short, long)]
        bank: u8,

        /// New bank name, where the device stores one
        #[arg(short, long)]
        name: Option<String>,

        /// Output .syx file
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub fn run(args: BankArgs) -> anyhow::Result<()> {
    match args.command {
        BankCommand::List { file, device, json } => list_bank(&file, &device, json),
        BankCommand::Extract {
            file,
            device,
            index,
            output,
        } => extract_patch(&file, &device, index, &output),
        BankCommand::Build {
            patches,
            device,
            output,
        } => build_bank(&patches, &device, &output),
        BankCommand::Retarget {
            file,
            device,
            bank,
            name,
            output,
        } => retarget(&file, &device, bank, name.as_deref(), &output),
    }
}

/// Reads `path` and builds the codec for it, identifying the device when
/// `--device` is absent.
fn open(path: &Path, opts: &DeviceOpts) -> anyhow::Result<(Vec<u8>, Codec)> {
    let data = read_syx(path).with_context(|| format!("reading {}", path.display()))?;
    let identified = match opts.device {
        Some(_) => None,
        None => DeviceRegistry::new().identify(&data).map(|d| d.id),
    };
    let codec = opts.codec(identified)?;
    Ok((data, codec))
}

fn bank_of(codec: &Codec) -> anyhow::Result<&dyn BankCodec> {
    codec
        .as_bank()
        .ok_or_else(|| anyhow::anyhow!("{} has no bank dumps", codec.descriptor().name))
}

fn bank_frame<'a>(bank: &dyn BankCodec, data: &'a [u8]) -> anyhow::Result<&'a [u8]> {
    split_frames(data)
        .find(|f| bank.recognize_bank(f))
        .ok_or_else(|| anyhow::anyhow!("No bank dump found"))
}

fn list_bank(path: &Path, opts: &DeviceOpts, json: bool) -> anyhow::Result<()> {
    let (data, codec) = open(path, opts)?;
    let bank = bank_of(&codec)?;
    let names = bank.bank_patch_names(bank_frame(bank, &data)?);

    if json {
        let report = serde_json::json!({
            "device": codec.descriptor().id,
            "patches": names,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let title = format!("{} bank: {}", codec.descriptor().name, path.display());
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    for (i, name) in names.iter().enumerate() {
        println!("  {i:3}  {name}");
    }
    if names.len() < bank.patches_per_bank() {
        warn!(
            found = names.len(),
            expected = bank.patches_per_bank(),
            "bank dump is short"
        );
    }

    Ok(())
}

fn extract_patch(path: &Path, opts: &DeviceOpts, index: usize, output: &Path) -> anyhow::Result<()> {
    let (data, codec) = open(path, opts)?;
    let bank = bank_of(&codec)?;
    let patch = bank
        .parse_from_bank(bank_frame(bank, &data)?, index)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let file = PatchFile::from_patch(codec.descriptor().id, &patch);
    file.save(output)?;
    println!("Extracted '{}' to {}", file.name, output.display());

    Ok(())
}

fn build_bank(patches: &[String], opts: &DeviceOpts, output: &Path) -> anyhow::Result<()> {
    let files = patches
        .iter()
        .map(|name| load_patch_file(name))
        .collect::<anyhow::Result<Vec<PatchFile>>>()?;
    let fallback = files.first().map(|f| f.device.as_str());
    let codec = opts.codec(fallback)?;
    let bank = bank_of(&codec)?;

    if files.len() > bank.patches_per_bank() {
        warn!(
            given = files.len(),
            capacity = bank.patches_per_bank(),
            "extra patches are dropped"
        );
    }

    let voices: Vec<_> = files
        .iter()
        .map(|file| {
            let mut patch = codec.init_patch();
            file.apply_to(&mut patch);
            codec.revise(&mut patch);
            patch
        })
        .collect();

    write_frames(output, &[bank.emit_bank(&voices)])?;
    info!(patches = voices.len(), "built bank");
    println!(
        "Wrote {} bank with {} patch(es) to {}",
        codec.descriptor().name,
        voices.len().min(bank.patches_per_bank()),
        output.display()
    );

    Ok(())
}

fn retarget(
    path: &Path,
    opts: &DeviceOpts,
    bank: u8,
    name: Option<&str>,
    output: &Path,
) -> anyhow::Result<()> {
    let (data, codec) = open(path, opts)?;
    let device = codec.descriptor();

    let messages = codec.prepare_bulk_write(&data, bank, name).ok_or_else(|| {
        anyhow::anyhow!(
            "{} cannot write this dump to bank {} (writable banks: {:?})",
            device.name,
            bank,
            device.writable_banks
        )
    })?;
    let frames = sysex_frames(&messages);
    write_frames(output, &frames)?;
    println!(
        "Wrote {} frame(s) for bank {} to {}",
        frames.len(),
        bank,
        output.display()
    );

    Ok(())
}
