use super::InputArgs;
use clap::Args;
use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use hssp_bio::hits::HitSummary;
use hssp_bio::{prepare, ConversionOptions};
use hssp_core::Diagnostics;

#[derive(Args, Debug)]
pub struct HitsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the hit table as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: HitsArgs, threads: usize, diag: &Diagnostics) -> anyhow::Result<()> {
    let config = args.input.config_with_pool(threads)?;
    let options = ConversionOptions::from_config(&config);

    let resolver = args.input.resolver()?;
    let set = args.input.read()?;
    let prepared = prepare(set, &options, resolver.as_ref(), diag)?;
    let summaries = prepared.table.summaries();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("{}", hit_table(&summaries));
    }

    Ok(())
}

fn hit_table(summaries: &[HitSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        [
            "NR", "ID", "ACCNUM", "CHAIN", "%IDE", "%WSIM", "IFIR", "ILAS", "JFIR", "JLAS",
            "LALI", "NGAP", "LGAP", "LSEQ2", "INS",
        ]
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold)),
    );

    for hit in summaries {
        let numbers = [
            hit.ifir as usize,
            hit.ilas as usize,
            hit.jfir as usize,
            hit.jlas as usize,
            hit.lali as usize,
            hit.ngap as usize,
            hit.lgap as usize,
            hit.lseq2,
            hit.insertions,
        ];

        let mut row = vec![
            Cell::new(hit.nr).set_alignment(CellAlignment::Right),
            Cell::new(&hit.id),
            Cell::new(&hit.accession),
            Cell::new(hit.chain),
            Cell::new(format!("{:.2}", hit.identity)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", hit.similarity)).set_alignment(CellAlignment::Right),
        ];
        row.extend(
            numbers
                .iter()
                .map(|n| Cell::new(n).set_alignment(CellAlignment::Right)),
        );
        table.add_row(row);
    }

    table
}
