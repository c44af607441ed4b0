//! Patch encoding command.

use crate::commands::common::{DeviceOpts, load_patch_file, sysex_frames, to_hex, write_frames};
use clap::Args;
use patchwire_config::validate_patch;
use patchwire_core::{Destination, PatchLocation};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args)]
pub struct EncodeArgs {
    /// Patch file path, user patch name, or factory patch name
    patch: String,

    #[command(flatten)]
    device: DeviceOpts,

    /// Output .syx file (prints hex when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target bank for a stored-patch dump
    #[arg(long, requires = "number")]
    bank: Option<u8>,

    /// Target patch number for a stored-patch dump
    #[arg(long, requires = "bank")]
    number: Option<u8>,
}

pub fn run(args: EncodeArgs) -> anyhow::Result<()> {
    let file = load_patch_file(&args.patch)?;
    let codec = args.device.codec(Some(file.device.as_str()))?;
    let device = codec.descriptor();

    if !file.device.eq_ignore_ascii_case(device.id) {
        warn!(
            patch_device = %file.device,
            device = device.id,
            "patch was written for another device"
        );
    }
    if let Err(e) = validate_patch(&file, codec.ranges(), device.name_len) {
        warn!("{}", e);
    }

    let mut patch = codec.init_patch();
    file.apply_to(&mut patch);
    codec.revise(&mut patch);

    let destination = match (args.bank, args.number) {
        (Some(bank), Some(number)) => Destination::Slot(PatchLocation::new(bank, number)),
        _ => Destination::File,
    };
    let frames = sysex_frames(&codec.emit(&patch, destination));
    info!(device = device.id, frames = frames.len(), "encoded '{}'", file.name);

    match &args.output {
        Some(path) => {
            write_frames(path, &frames)?;
            println!(
                "Wrote {} frame(s) for {} to {}",
                frames.len(),
                device.name,
                path.display()
            );
        }
        None => {
            for frame in &frames {
                println!("{}", to_hex(frame));
            }
        }
    }

    Ok(())
}
