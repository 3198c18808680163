use clap::{ArgAction, Parser as ClapParser};
use retcc::driver;
use std::path::PathBuf;
use tracing::Level;

/// Compiles a single-function C source file to 32-bit AT&T assembly.
///
/// With no flags, `dir/prog.c` is written to `prog.s` in the current
/// directory; `-o` and `-v` are optional extras on top of that.
#[derive(ClapParser, Debug)]
#[command(author, version)]
struct Args {
    /// Source file, must end in `.c`
    input: PathBuf,
    /// Defaults to the input's file name with `.c` replaced by `.s`, in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Raise log verbosity; repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    driver::run(&args.input, args.output.as_deref())?;

    Ok(())
}
