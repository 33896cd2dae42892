// 🧭 Directorship CLI - read → cluster → audit → optional exports

use anyhow::{bail, Context, Result};
use clap::Parser;
use directorship::{
    cluster_records, read_directorships, write_aliases, write_audit, write_edge_list, ClusterContext,
    CoMembershipGraph, RunConfig,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cluster board-membership records into director identities", long_about = None)]
struct Args {
    /// Input CSV file name (resolved under --indir)
    input: String,

    /// Output directory name (created under --outdir)
    output: String,

    /// Write firms_edge_list.csv (firms linked by shared directors)
    #[arg(short = 'f', long = "firms")]
    firms: bool,

    /// Write directors_edge_list.csv (directors linked by shared boards)
    #[arg(short = 'd', long = "directors")]
    directors: bool,

    /// Write aliases.csv (every name each director was seen under)
    #[arg(short = 'a', long = "aliases")]
    aliases: bool,

    /// Directory holding the input file
    #[arg(long, default_value = "data/input")]
    indir: PathBuf,

    /// Directory the output directory is created in
    #[arg(long, default_value = "data/output")]
    outdir: PathBuf,

    /// JSON file overriding the column layout and void sentinel
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overwrite an existing output directory
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let input_path = args.indir.join(&args.input);
    let output_dir = args.outdir.join(&args.output);
    let logs_dir = output_dir.join("logs");

    if !input_path.exists() {
        bail!("input file {} does not exist", input_path.display());
    }
    if output_dir.exists() && !args.force {
        bail!(
            "output directory {} already exists (pass --force to overwrite)",
            output_dir.display()
        );
    }

    let config = match &args.config {
        Some(path) => RunConfig::from_path(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => RunConfig::default(),
    };

    // 1. Read
    println!("📂 Reading {}...", input_path.display());
    let dataset = read_directorships(&input_path, &config)
        .with_context(|| format!("Failed to read directorships: {}", input_path.display()))?;
    let mut registry = dataset.registry;
    println!(
        "✓ Loaded {} records across {} firms",
        dataset.records.len(),
        registry.organizations().len()
    );

    // 2. Cluster
    println!("\n🔗 Clustering directors...");
    let mut ctx = ClusterContext::new();
    let identities = cluster_records(dataset.records, &mut registry, &mut ctx).context("Clustering failed")?;
    let report = ctx.into_report(identities.len(), registry.organizations().len());
    println!("✓ {} directors constructed", identities.len());

    // 3. Audit trail
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create output directory: {}", logs_dir.display()))?;
    write_audit(&logs_dir, &registry, &report)
        .with_context(|| format!("Failed to write audit trail: {}", logs_dir.display()))?;
    println!("✓ Audit trail written to {}", logs_dir.display());

    // 4. Optional exports
    if args.firms {
        let path = output_dir.join("firms_edge_list.csv");
        let rows = write_edge_list(&path, &CoMembershipGraph::of_organizations(&registry))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ {} ({} rows)", path.display(), rows);
    }
    if args.directors {
        let path = output_dir.join("directors_edge_list.csv");
        let rows = write_edge_list(&path, &CoMembershipGraph::of_identities(&registry, &identities))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ {} ({} rows)", path.display(), rows);
    }
    if args.aliases {
        let path = output_dir.join("aliases.csv");
        let rows = write_aliases(&path, &registry, &identities)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ {} ({} rows)", path.display(), rows);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", report.summary());
    Ok(())
}
