//! Dump request command.

use crate::commands::common::{DeviceOpts, sysex_frames, to_hex, write_frames};
use clap::Args;
use patchwire_core::{Message, PatchLocation};
use std::path::PathBuf;

#[derive(Args)]
pub struct RequestArgs {
    #[command(flatten)]
    device: DeviceOpts,

    /// Bank of the first stored patch to request
    #[arg(long, requires = "number")]
    bank: Option<u8>,

    /// Number of the first stored patch to request
    #[arg(long, requires = "bank")]
    number: Option<u8>,

    /// Consecutive patches to request, wrapping across banks [default: 1]
    #[arg(long, requires = "bank")]
    count: Option<usize>,

    /// Request a whole bank instead of single patches
    #[arg(long, conflicts_with_all = ["number", "count"])]
    whole_bank: bool,

    /// Output .syx file (prints hex when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: RequestArgs) -> anyhow::Result<()> {
    let codec = args.device.codec(None)?;
    let device = codec.descriptor();

    let messages: Vec<Message> = if args.whole_bank {
        let bank = codec
            .as_bank()
            .ok_or_else(|| anyhow::anyhow!("{} has no bank dumps", device.name))?;
        bank.request_bank(args.bank.unwrap_or(0))
    } else if let (Some(bank), Some(number)) = (args.bank, args.number) {
        let mut location = PatchLocation::new(bank, number);
        let mut messages = Vec::new();
        for _ in 0..args.count.unwrap_or(1).max(1) {
            messages.extend(codec.request_dump(location));
            location = location.next(device.bank_count(), device.patches_per_bank);
        }
        messages
    } else {
        codec.request_current_dump()
    };

    let frames = sysex_frames(&messages);
    match &args.output {
        Some(path) => {
            write_frames(path, &frames)?;
            println!(
                "Wrote {} request frame(s) for {} to {}",
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
