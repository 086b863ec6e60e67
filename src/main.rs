use env_logger::{Builder, Env};
use std::path::PathBuf;
use structopt::StructOpt;

use steward::cli::{CliCommand, GlobalOptions};

#[derive(StructOpt)]
#[structopt(
    name = env!("CARGO_PKG_NAME"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION")
)]
struct Opt {
    #[structopt(subcommand)]
    cmd: CliCommand,

    #[structopt(short, long, global = true, help = "Only print errors")]
    quiet: bool,

    #[structopt(
        short,
        long,
        global = true,
        conflicts_with = "quiet",
        help = "Print debug output, including every git command"
    )]
    verbose: bool,

    #[structopt(
        long,
        global = true,
        parse(from_os_str),
        help = "Path to a TOML settings file"
    )]
    config: Option<PathBuf>,
}

fn main() {
    let opt = Opt::from_args();

    let level = if opt.quiet {
        "error"
    } else if opt.verbose {
        "debug"
    } else {
        "info"
    };
    Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let global = GlobalOptions { config: opt.config };
    if let Err(e) = opt.cmd.execute(&global) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
