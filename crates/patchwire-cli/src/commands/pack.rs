//! 7-bit packing commands.

use crate::commands::common::{parse_hex, to_hex};
use clap::Args;
use patchwire_core::seven_bit;
use tracing::warn;

#[derive(Args)]
pub struct PackArgs {
    /// Hex bytes, e.g. "F0 43 10" or 0xF0,0x43
    #[arg(required = true, num_args = 1..)]
    hex: Vec<String>,
}

pub fn run_pack(args: PackArgs) -> anyhow::Result<()> {
    let bytes = parse_hex(&args.hex.join(" "))?;
    println!("{}", to_hex(&seven_bit::pack(&bytes)));
    Ok(())
}

pub fn run_unpack(args: PackArgs) -> anyhow::Result<()> {
    let bytes = parse_hex(&args.hex.join(" "))?;
    if let Some(pos) = bytes.iter().position(|&b| b > 0x7F) {
        warn!(pos, byte = bytes[pos], "input is not 7-bit clean");
    }
    println!("{}", to_hex(&seven_bit::unpack(&bytes)));
    Ok(())
}
