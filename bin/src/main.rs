use std::{
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use errors::{Diagnostic, Reporter};
use itertools::Itertools;

/// Scans and parses Lox expressions and prints their syntax tree.
#[derive(clap::Parser)]
#[command(version, about)]
struct Args {
    /// Script to read. Starts a prompt when omitted.
    file: Option<PathBuf>,

    /// Print reverse polish notation instead of the parenthesized prefix form.
    #[arg(long, conflicts_with = "tokens")]
    rpn: bool,

    /// Dump the scanned tokens instead of parsing them.
    #[arg(long)]
    tokens: bool,
}

/// Failures that were already reported to stderr while scanning or parsing.
#[derive(thiserror::Error, Debug)]
enum RunError {
    #[error("source has lexical errors")]
    Scan,
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
}

struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("{diagnostic}");
    }
}

fn run_file(path: &Path, args: &Args) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;

    match run(&source, args, &mut StderrReporter, &mut stdout()) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is::<RunError>() => Ok(ExitCode::from(65)),
        Err(e) => Err(e),
    }
}

fn run_prompt(args: &Args) -> anyhow::Result<()> {
    loop {
        print!("> ");
        stdout().flush()?;

        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match run(prompt_source(&line), args, &mut StderrReporter, &mut stdout()) {
            Ok(()) => (),
            Err(e) if e.is::<RunError>() => log::debug!("{e}"),
            Err(e) => return Err(e),
        }
    }
}

/// One prompt entry without its line break, so errors at its end stay on line 1.
fn prompt_source(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn run(
    source: &str,
    args: &Args,
    reporter: &mut dyn Reporter,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let scanned = scanner::scan(source, reporter);
    if scanned.had_error {
        return Err(RunError::Scan.into());
    }

    if args.tokens {
        writeln!(out, "{}", scanned.tokens.iter().join("\n"))?;
        return Ok(());
    }

    let expr = parser::parse(&scanned.tokens, reporter).map_err(RunError::from)?;
    let rendered = if args.rpn { printer::print_rpn(&expr) } else { printer::print(&expr) };
    writeln!(out, "{rendered}")?;

    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    match &args.file {
        Some(path) => run_file(path, &args),
        None => run_prompt(&args).map(|()| ExitCode::SUCCESS),
    }
}
