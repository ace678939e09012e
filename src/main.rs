// CLI entry for histo_search
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use histo_search::{default_config, Config, SearchReport, Searcher};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "histo_search", version, about = "Find the images most similar to a query by color histogram")]
struct Cli {
    /// Bits kept per color channel (1-8)
    #[arg(short = 'd', long = "depth")]
    depth: Option<u8>,
    /// Number of matches to report
    #[arg(short = 'k', long = "top-k")]
    top_k: Option<usize>,
    /// Number of parallel shards
    #[arg(short = 'w', long = "workers")]
    workers: Option<usize>,
    /// Use one shard per logical CPU
    #[arg(long = "auto-workers", action = ArgAction::SetTrue)]
    auto_workers: bool,

    /// Query image path
    #[arg(value_hint = ValueHint::FilePath)]
    query: PathBuf,
    /// Directory holding the .jpg corpus
    #[arg(value_hint = ValueHint::DirPath)]
    corpus: PathBuf,
}

fn build_config(cli: &Cli) -> Config {
    let mut cfg = default_config(cli.auto_workers);
    if let Some(v) = cli.depth { cfg.depth = v; }
    if let Some(v) = cli.top_k { cfg.top_k = v; }
    if let Some(v) = cli.workers { cfg.workers = v; }
    cfg
}

fn print_report(report: &SearchReport, top_k: usize) {
    println!("The top {} most similar images to {} are:", top_k, report.query.display());
    for (i, m) in report.matches.iter().enumerate() {
        println!("{}: {} Similarity: {:.6}", i + 1, m.identifier.display(), m.score);
    }
    println!("Execution time: {:?}", report.elapsed);
    for s in &report.skipped {
        eprintln!("warning: skipped {}: {}", s.path.display(), s.reason);
    }
    eprintln!("Scored {} images ({} skipped)", report.scored, report.skipped.len());
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = build_config(&cli);
    let searcher = Searcher::new(cfg).context("invalid search configuration")?;
    let report = searcher
        .search(&cli.query, &cli.corpus)
        .with_context(|| format!("search for {} in {} failed", cli.query.display(), cli.corpus.display()))?;
    print_report(&report, searcher.config().top_k);
    Ok(())
}
