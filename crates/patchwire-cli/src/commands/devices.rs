//! Device listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use patchwire_core::DeviceFamily;
use patchwire_registry::DeviceRegistry;
use serde::Serialize;

#[derive(Args)]
pub struct DevicesArgs {
    /// Only list devices of one family (venom, yamaha4op, fb01)
    #[arg(short, long)]
    family: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DeviceRow {
    id: &'static str,
    name: &'static str,
    family: &'static str,
    banks: Vec<&'static str>,
    writable_banks: Vec<&'static str>,
    patches_per_bank: u8,
    name_len: usize,
    quirks: Vec<&'static str>,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let registry = DeviceRegistry::new();

    let devices = match &args.family {
        Some(name) => {
            let family = DeviceFamily::from_name(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown family '{}'. Use venom, yamaha4op or fb01.", name)
            })?;
            registry.devices_in_family(family)
        }
        None => registry.all_devices(),
    };

    if args.json {
        let rows: Vec<DeviceRow> = devices
            .iter()
            .map(|d| DeviceRow {
                id: d.id,
                name: d.name,
                family: d.family.name(),
                banks: d.banks.to_vec(),
                writable_banks: d
                    .writable_banks
                    .iter()
                    .filter_map(|&b| d.banks.get(b as usize).copied())
                    .collect(),
                patches_per_bank: d.patches_per_bank,
                name_len: d.name_len,
                quirks: d.quirks.iter().map(|q| q.description()).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Supported Devices");
    println!("=================");
    println!();
    println!("  {:8}  {:36}  {:10}  {}", "ID", "Name", "Family", "Banks");
    println!("  {:8}  {:36}  {:10}  {}", "--", "----", "------", "-----");

    for d in &devices {
        println!(
            "  {:8}  {:36}  {:10}  {} x {}",
            d.id,
            d.name,
            d.family.name(),
            d.bank_count(),
            d.patches_per_bank
        );
    }

    println!();
    println!("Use 'patchwire devices --json' for quirks and writable banks.");

    Ok(())
}
