use clap::Parser;
use img2mfm::cli::{Cli, Commands};
use img2mfm::output::Printer;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Convert(args) => img2mfm::cli::convert::run(args, &printer)?,
        Commands::Init(args) => img2mfm::cli::init::run(args, &printer)?,
        Commands::Completions(args) => img2mfm::cli::completions::run(args)?,
    }

    Ok(())
}
