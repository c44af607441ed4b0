//! `.syx` file inspection command.

use crate::commands::common::{checksum_ok, to_hex};
use anyhow::Context;
use clap::Args;
use patchwire_io::{read_syx, syx_info};
use patchwire_registry::DeviceRegistry;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// .syx file to inspect
    file: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let data = read_syx(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let info = syx_info(&data);
    let registry = DeviceRegistry::new();

    let frames: Vec<_> = info
        .frames
        .iter()
        .map(|f| {
            let frame = &data[f.offset..f.offset + f.len];
            let device = registry.identify(frame);
            let checksum = device.and_then(|d| checksum_ok(d.family, frame));
            (f, frame, device, checksum)
        })
        .collect();

    if args.json {
        let frames: Vec<_> = frames
            .iter()
            .map(|(f, frame, device, checksum)| {
                serde_json::json!({
                    "offset": f.offset,
                    "length": f.len,
                    "header": to_hex(&frame[..frame.len().min(6)]),
                    "device": device.map(|d| d.id),
                    "checksum_ok": checksum,
                })
            })
            .collect();
        let report = serde_json::json!({
            "file": args.file.display().to_string(),
            "total_bytes": info.total_bytes,
            "stray_bytes": info.stray_bytes,
            "unterminated": info.unterminated,
            "frames": frames,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File: {}", args.file.display());
    println!("  Size:         {} bytes", info.total_bytes);
    println!("  Frames:       {}", info.frame_count());
    if info.stray_bytes > 0 {
        println!("  Stray bytes:  {}", info.stray_bytes);
    }
    if info.unterminated {
        println!("  Warning:      last frame has no F7 terminator");
    }
    println!();

    for (i, (f, frame, device, checksum)) in frames.iter().enumerate() {
        let device = device.map_or("unknown", |d| d.name);
        let checksum = match checksum {
            Some(true) => "checksum ok",
            Some(false) => "CHECKSUM BAD",
            None => "",
        };
        println!(
            "  #{:<3} @{:<6} {:>5} bytes  {}  {:28} {}",
            i,
            f.offset,
            f.len,
            to_hex(&frame[..frame.len().min(6)]),
            device,
            checksum
        );
    }

    Ok(())
}
