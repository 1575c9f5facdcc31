//! The CSawIR driver: parse a module, optionally print it back.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser as CliParser;
use csawir::frontend::{parse_file, ParseError, Parser};
use csawir::ir::Context;
use log::info;

#[derive(CliParser, Debug)]
#[command(name = "csawir", version, about = "Parse and print CSawIR modules")]
struct Cli {
    /// Input file, `-` for stdin
    input: PathBuf,

    /// Print the parsed module to stdout
    #[arg(long)]
    emit: bool,

    /// Do not print the summary
    #[arg(short, long)]
    quiet: bool,
}

fn parse(cli: &Cli) -> Result<Context, ParseError> {
    if cli.input.as_os_str() == "-" {
        Parser::new(io::stdin().lock()).parse()
    } else {
        parse_file(&cli.input)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    info!("parsing {}", cli.input.display());

    let ctx = match parse(&cli) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if cli.emit {
        let mut stdout = io::stdout().lock();
        if let Err(err) = write!(stdout, "{}", ctx.display()) {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    }

    if !cli.quiet {
        eprintln!(
            "parsed {} functions, {} globals",
            ctx.funcs().len(),
            ctx.globals().len()
        );
    }

    ExitCode::SUCCESS
}
