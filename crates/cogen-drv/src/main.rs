use clap::Parser;
use cogen_drv::cli::Cli;

/// `main`'s return type is `anyhow::Result` so any future fallible
/// top-level step (beyond the process-exit-coded [`cogen_drv::run`],
/// which maps every internal failure to one of §6's own exit codes)
/// gets anyhow's one-line error rendering for free; it is the only
/// place in this workspace that reaches for `anyhow`.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    std::process::exit(cogen_drv::run(cli));
}
