//! Dump decoding command.

use crate::commands::common::DeviceOpts;
use anyhow::Context;
use clap::Args;
use patchwire_config::PatchFile;
use patchwire_core::{ParameterModel, ParseOutcome, Patch, SysexCodec, split_frames};
use patchwire_io::read_syx;
use patchwire_registry::DeviceRegistry;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct DecodeArgs {
    /// .syx file holding a patch or bank dump
    file: PathBuf,

    #[command(flatten)]
    device: DeviceOpts,

    /// Decode patch N of a bank dump instead of the first patch
    #[arg(short, long)]
    index: Option<usize>,

    /// Save the decoded patch as a TOML patch file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the patch as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: DecodeArgs) -> anyhow::Result<()> {
    let data = read_syx(&args.file).with_context(|| format!("reading {}", args.file.display()))?;

    let identified = match args.device.device {
        Some(_) => None,
        None => DeviceRegistry::new().identify(&data).map(|d| d.id),
    };
    let codec = args.device.codec(identified)?;
    let device = codec.descriptor();
    info!(device = device.id, "decoding {}", args.file.display());

    let patch = match args.index {
        Some(index) => decode_from_bank(codec.as_ref(), &data, index)?,
        None => match codec.parse(&data) {
            (ParseOutcome::Succeeded, patch) => patch,
            (ParseOutcome::Incomplete, _) => {
                anyhow::bail!("{} dump is incomplete: a required frame is missing", device.name)
            }
            (ParseOutcome::Failed, _) => {
                anyhow::bail!("No {} patch found in {}", device.name, args.file.display())
            }
        },
    };

    let file = PatchFile::from_patch(device.id, &patch);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&file)?);
    } else {
        print_patch(codec.as_ref(), &patch);
    }

    if let Some(path) = &args.output {
        file.save(path)?;
        println!();
        println!("Saved patch to {}", path.display());
    }

    Ok(())
}

fn decode_from_bank(codec: &dyn SysexCodec, data: &[u8], index: usize) -> anyhow::Result<Patch> {
    let bank = codec
        .as_bank()
        .ok_or_else(|| anyhow::anyhow!("{} has no bank dumps", codec.descriptor().name))?;
    let frame = split_frames(data)
        .find(|f| bank.recognize_bank(f))
        .ok_or_else(|| anyhow::anyhow!("No {} bank dump found", codec.descriptor().name))?;
    bank.parse_from_bank(frame, index)
        .map_err(|e| anyhow::anyhow!("{}", e))
}

fn print_patch(codec: &dyn SysexCodec, patch: &Patch) {
    let device = codec.descriptor();

    println!("{}", patch.name());
    println!("{}", "=".repeat(patch.name().len().max(1)));
    println!();
    println!("  Device:     {}", device.name);
    if let Some(location) = patch.location() {
        let bank = device
            .banks
            .get(location.bank as usize)
            .copied()
            .unwrap_or("?");
        println!("  Location:   bank {} ({}), patch {}", location.bank, bank, location.number);
    }
    println!("  Parameters: {}", patch.len());
    println!();

    for (key, value) in patch.values() {
        let shown = codec.display(key, value);
        if shown == value.to_string() {
            println!("  {:28} {}", key, value);
        } else {
            println!("  {:28} {:6} {}", key, value, shown);
        }
    }
}
