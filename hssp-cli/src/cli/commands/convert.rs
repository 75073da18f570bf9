use super::InputArgs;
use chrono::NaiveDate;
use clap::Args;
use hssp_bio::{convert, ConversionOptions};
use hssp_core::{Diagnostics, HsspError};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output HSSP file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Gzip the report (implied by a .gz output name)
    #[arg(long)]
    pub compress: bool,

    /// Date for the DATE line, as YYYY-MM-DD (default: today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,
}

pub fn run(args: ConvertArgs, threads: usize, diag: &Diagnostics) -> anyhow::Result<()> {
    let config = args.input.config_with_pool(threads)?;
    let mut options = ConversionOptions::from_config(&config);
    if let Some(date) = args.date {
        options = options.with_date(date);
    }

    let resolver = args.input.resolver()?;
    let set = args.input.read()?;
    let report = convert(set, &options, resolver.as_ref(), diag)?;

    match &args.output {
        Some(path) => {
            report.write_to(path, args.compress || config.output.compress)?;
            info!(
                "Wrote {} hits over {} residues to {}",
                report.hits.len(),
                report.header.seq_length,
                path.display()
            );
        }
        None => {
            let text = report.render()?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(HsspError::from)?;
        }
    }

    Ok(())
}
