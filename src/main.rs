use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = listmgr::cli::Cli::parse();
    listmgr::run(cli)
}
