use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use genoskin::matcher::MatchOptions;
use genoskin::report::{self, OutputFormat};
use genoskin::tokenize::AlleleOrder;
use genoskin::AssessOptions;

/// genoskin CLI
#[derive(Parser)]
#[command(name = "genoskin")]
#[command(version)]
#[command(about = "Flag skincare ingredients against genotype risk markers", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReferenceArgs {
    /// SNP mapping CSV
    #[arg(long, default_value = genoskin::reference::DEFAULT_REFERENCE_PATH)]
    reference: PathBuf,
    /// Optional gene ingredient CSV joined onto the mapping by gene
    #[arg(long)]
    gene_ingredients: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess an ingredient list against a genotype file
    Assess {
        /// Raw genotype file (tab-separated, 23andMe layout)
        #[arg(long)]
        genome: PathBuf,
        /// Comma-separated ingredients, e.g. "Water, Retinol, Vitamin C"
        #[arg(long)]
        ingredients: String,
        /// Comma-separated ingredient allergies
        #[arg(long, default_value = "")]
        allergies: String,
        #[command(flatten)]
        reference: ReferenceArgs,
        /// Treat "AG" and "GA" as the same genotype
        #[arg(long)]
        unordered_alleles: bool,
        /// Output format (table, csv, json)
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the SNPs where the genotype file carries a risk genotype
    Matches {
        /// Raw genotype file (tab-separated, 23andMe layout)
        #[arg(long)]
        genome: PathBuf,
        #[command(flatten)]
        reference: ReferenceArgs,
        /// Treat "AG" and "GA" as the same genotype
        #[arg(long)]
        unordered_alleles: bool,
        /// Output format (table, csv, json)
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the reference table
    Reference {
        #[command(flatten)]
        reference: ReferenceArgs,
        /// Output format (table, csv, json)
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn options(reference: ReferenceArgs, unordered_alleles: bool) -> AssessOptions {
    let allele_order = if unordered_alleles { AlleleOrder::Unordered } else { AlleleOrder::Exact };
    AssessOptions {
        reference_path: reference.reference,
        gene_ingredients_path: reference.gene_ingredients,
        matching: MatchOptions { allele_order },
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    report::configure_table_display();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Assess { genome, ingredients, allergies, reference, unordered_alleles, format } => {
            let opts = options(reference, unordered_alleles);
            let result = genoskin::assess(&genome, &ingredients, &allergies, &opts)
                .with_context(|| format!("assessing {}", genome.display()))?;
            report::write_assessments(&mut out, &result.ingredients, format)?;
        }

        Commands::Matches { genome, reference, unordered_alleles, format } => {
            let opts = options(reference, unordered_alleles);
            let table = genoskin::genome::load_genome(&genome)
                .with_context(|| format!("loading {}", genome.display()))?;
            let refs = genoskin::load_reference_tables(&opts)?;
            let (matched, _) = genoskin::matcher::match_risk_genotypes(&table, &refs, opts.matching);
            report::write_matches(&mut out, &matched, format)?;
        }

        Commands::Reference { reference, format } => {
            let opts = options(reference, false);
            let refs = genoskin::load_reference_tables(&opts)?;
            report::write_reference(&mut out, &refs, format)?;
        }
    }

    out.flush()?;
    Ok(())
}
