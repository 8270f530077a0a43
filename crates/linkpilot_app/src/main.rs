mod terminal;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = terminal::cli::Args::parse();
    terminal::run_app(args)?;
    Ok(())
}
