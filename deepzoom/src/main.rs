mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Cut images into deep zoom tile pyramids
	Generate(tools::generate::Subcommand),

	/// Show the tile size and zoom levels an image would get
	Probe(tools::probe::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Generate(arguments) => tools::generate::run(arguments),
		Commands::Probe(arguments) => tools::probe::run(arguments),
	}
}
