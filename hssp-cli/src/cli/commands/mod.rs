pub mod config;
pub mod convert;
pub mod hits;

use clap::Args;
use hssp_bio::formats::{read_alignment_file, AlignmentSet};
use hssp_bio::{AcceptAllResolver, AccessionListResolver, AlignmentFormat, IdentityResolver};
use hssp_core::{load_config, Config, HsspError, HsspResult};
use std::path::PathBuf;
use tracing::info;

/// Input and selection options shared by `convert` and `hits`
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Alignment file (aligned FastA or Stockholm, optionally .gz or .bz2)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Input format: fasta, stockholm or auto
    #[arg(short = 'f', long, default_value = "auto")]
    pub format: String,

    /// Id or accession of the reference row (FastA only; default: first row)
    #[arg(short = 'r', long, value_name = "ID")]
    pub reference: Option<String>,

    /// Maximum number of hits to keep (0 = all)
    #[arg(short = 'm', long)]
    pub max_hits: Option<usize>,

    /// Cutoff added to the HSSP threshold curve, as a fraction of identity
    #[arg(short = 't', long, allow_hyphen_values = true)]
    pub threshold: Option<f64>,

    /// Known accessions, one per line; hits not listed are dropped
    #[arg(long, value_name = "FILE")]
    pub accessions: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl InputArgs {
    /// Configuration file values with command line overrides applied
    pub fn config(&self, threads: usize) -> HsspResult<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        if let Some(max_hits) = self.max_hits {
            config.conversion.max_hits = max_hits;
        }
        if let Some(threshold) = self.threshold {
            config.conversion.threshold = threshold;
        }
        if threads > 0 {
            config.performance.threads = threads;
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration as [`InputArgs::config`], with the global rayon pool
    /// sized from its resolved thread count
    pub fn config_with_pool(&self, threads: usize) -> HsspResult<Config> {
        let config = self.config(threads)?;
        init_thread_pool(config.performance.resolved_threads())?;
        Ok(config)
    }

    pub fn resolver(&self) -> HsspResult<Box<dyn IdentityResolver>> {
        match &self.accessions {
            Some(path) => {
                let resolver = AccessionListResolver::from_file(path)?;
                info!("Loaded {} known accessions", resolver.len());
                Ok(Box::new(resolver))
            }
            None => Ok(Box::new(AcceptAllResolver)),
        }
    }

    pub fn read(&self) -> HsspResult<AlignmentSet> {
        let format = match self.format.as_str() {
            "auto" => None,
            other => Some(other.parse::<AlignmentFormat>()?),
        };

        let set = read_alignment_file(&self.input, format, self.reference.as_deref(), 0)?;
        info!(
            "Read {} chain(s) from {}",
            set.chains.len(),
            self.input.display()
        );
        Ok(set)
    }
}

/// Size the global rayon pool used by residue aggregation
fn init_thread_pool(threads: usize) -> HsspResult<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| HsspError::Configuration(format!("failed to start thread pool: {}", e)))?;

    info!("Using {} threads", threads);
    Ok(())
}
