use clap::Parser;
use issue_backup::cli::parser::Cli;
use std::io::{self, BufWriter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    issue_backup::logging::init(cli.quiet);

    let mut out = BufWriter::new(io::stdout().lock());
    issue_backup::run::run(cli, &mut out).await?;
    Ok(())
}
