//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use serde::Serialize;
use vintage_synth::{SynthParam, Waveform};

#[derive(Args)]
pub struct ParamsArgs {
    /// Print the table as JSON
    #[arg(long)]
    json: bool,
}

/// One row of the parameter table, as printed with `--json`.
#[derive(Debug, Serialize)]
struct ParamRow {
    index: usize,
    id: &'static str,
    name: &'static str,
    group: &'static str,
    unit: &'static str,
    min: f32,
    max: f32,
    default: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    choices: Vec<&'static str>,
}

fn param_rows() -> Vec<ParamRow> {
    SynthParam::ALL
        .iter()
        .map(|&param| {
            let desc = param.descriptor();
            let choices = if param == SynthParam::Waveform {
                Waveform::ALL.iter().map(|w| w.name()).collect()
            } else {
                Vec::new()
            };
            ParamRow {
                index: param.index(),
                id: desc.string_id,
                name: desc.name,
                group: desc.group,
                unit: desc.unit.label(),
                min: desc.min,
                max: desc.max,
                default: desc.default,
                choices,
            }
        })
        .collect()
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let rows = param_rows();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Synth Parameters");
    println!("================");
    println!();
    println!(
        "  {:>2}  {:18}  {:24}  {:>10}  {}",
        "#", "Id", "Name", "Default", "Range"
    );
    println!(
        "  {:>2}  {:18}  {:24}  {:>10}  {}",
        "--", "--", "----", "-------", "-----"
    );

    for (row, param) in rows.iter().zip(SynthParam::ALL) {
        let suffix = param.descriptor().unit.suffix();
        let range = if row.choices.is_empty() {
            format!("{}..{}{}", row.min, row.max, suffix)
        } else {
            row.choices.join(" | ")
        };
        println!(
            "  {:>2}  {:18}  {:24}  {:>10}  {}",
            row.index, row.id, row.name, row.default, range
        );
    }

    println!();
    println!("Patch files use the Id column as keys, e.g. `cutoff = 1200.0`.");

    Ok(())
}
