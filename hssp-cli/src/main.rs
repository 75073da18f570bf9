use clap::Parser;
use colored::*;
use std::process;

mod cli;

use crate::cli::{Cli, Commands};
use hssp_core::{Diagnostics, HsspError};

fn main() {
    let cli = Cli::parse();

    // Logging follows RUST_LOG, then HSSP_LOG, then the -v count
    let diag = Diagnostics::new(cli.verbose);
    diag.init_tracing();

    if let Err(e) = run(cli, &diag) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

/// Exit code for each error kind
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<HsspError>() {
        Some(HsspError::Configuration(_)) => 2,
        Some(HsspError::Io(_)) => 3,
        Some(
            HsspError::Parse(_) | HsspError::MalformedInput(_) | HsspError::InvalidResidue { .. },
        ) => 4,
        Some(HsspError::NoHits) => 5,
        _ => 1,
    }
}

fn run(cli: Cli, diag: &Diagnostics) -> anyhow::Result<()> {
    match cli.command {
        Commands::Convert(args) => cli::commands::convert::run(args, cli.threads, diag),
        Commands::Hits(args) => cli::commands::hits::run(args, cli.threads, diag),
        Commands::Config(args) => cli::commands::config::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let code = |e: HsspError| exit_code(&anyhow::Error::from(e));

        assert_eq!(code(HsspError::Configuration("bad".into())), 2);
        assert_eq!(
            code(HsspError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "missing"
            ))),
            3
        );
        assert_eq!(code(HsspError::MalformedInput("rows".into())), 4);
        assert_eq!(
            code(HsspError::InvalidResidue {
                row: "h".into(),
                residue: 'J',
                column: 0
            }),
            4
        );
        assert_eq!(code(HsspError::NoHits), 5);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
