use clap::Parser;

use mdldec::cli::Cli;
use mdldec::driver;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("Half-Life Studio Model Decompiler");

    let dest = driver::resolve_destination(&cli.source_file, cli.target_directory.as_deref());

    if let Err(err) = driver::run(&cli.source_file, &dest) {
        log::error!("{}", err);
    }
}
