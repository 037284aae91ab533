use anyhow::Context;
use clap::{Parser, Subcommand};
use logpar::{Logpar, ParserRegistry, Schema, Syntax};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "logpar")]
#[command(about = "Compile log patterns and parse log lines into JSON", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse log lines and print one JSON document per matching line
    Parse {
        /// JSON object mapping field names to schema types
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,
        /// Pattern describing one log line
        #[arg(short, long)]
        pattern: String,
        /// JSON file overriding the pattern delimiters
        #[arg(long, value_name = "FILE")]
        syntax: Option<PathBuf>,
        /// Fail on the first line that does not match
        #[arg(long)]
        strict: bool,
        /// Log file to read; stdin when omitted
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
    },
    /// Print the parsed pattern as JSON
    Ast {
        #[arg(short, long)]
        pattern: String,
        #[arg(long, value_name = "FILE")]
        syntax: Option<PathBuf>,
    },
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn load_syntax(path: Option<&Path>) -> anyhow::Result<Syntax> {
    let syntax = match path {
        Some(path) => serde_json::from_value(read_json(path)?)
            .with_context(|| format!("Invalid syntax file {}", path.display()))?,
        None => Syntax::default(),
    };
    syntax.validate()?;
    Ok(syntax)
}

fn parse_lines(
    schema: &Path,
    pattern: &str,
    syntax: Option<&Path>,
    strict: bool,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let schema = Schema::from_json(&read_json(schema)?)?;
    let logpar = Logpar::with_syntax(schema, ParserRegistry::with_builtins()?, load_syntax(syntax)?)?;
    let parser = logpar.build(pattern)?;

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = io::stdout().lock();

    let (mut matched, mut skipped) = (0usize, 0usize);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        match parser.run(line) {
            Ok(success) => {
                serde_json::to_writer(&mut out, &success.value)?;
                writeln!(out)?;
                matched += 1;
            }
            Err(failure) if strict => {
                return Err(failure).with_context(|| format!("Line {} does not match", n + 1));
            }
            Err(failure) => {
                log::warn!("Line {} does not match: {}", n + 1, failure);
                skipped += 1;
            }
        }
    }
    out.flush()?;
    log::info!("{} lines matched, {} skipped", matched, skipped);
    Ok(())
}

fn print_ast(pattern: &str, syntax: Option<&Path>) -> anyhow::Result<()> {
    let syntax = load_syntax(syntax)?;
    let nodes = logpar::grammar::parse(pattern, &syntax)
        .with_context(|| format!("Invalid pattern '{pattern}'"))?;
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Parse {
            schema,
            pattern,
            syntax,
            strict,
            input,
        } => parse_lines(
            schema,
            pattern,
            syntax.as_deref(),
            *strict,
            input.as_deref(),
        ),
        Commands::Ast { pattern, syntax } => print_ast(pattern, syntax.as_deref()),
    }
}
