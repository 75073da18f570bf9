use clap::Args;
use colored::*;
use hssp_core::config::to_toml;
use hssp_core::{save_config, Config};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the configuration to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = Config::default();

    match &args.output {
        Some(path) => {
            save_config(path, &config)?;
            eprintln!(
                "{} Default configuration written to {}",
                "✓".green().bold(),
                path.display()
            );
        }
        None => print!("{}", to_toml(&config)?),
    }

    Ok(())
}
