use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use opgram::{OperTable, TokenValue};
use opgram_calc::{CalcOper, CalcParser, load_table, reference};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reads expressions from standard input, one per line
    Repl {
        /// Input file with operator definitions
        #[arg(short, long)]
        defs: Option<PathBuf>,
    },
    /// Parses every non-empty line of a file
    Parse {
        /// Input file with operator definitions
        #[arg(short, long)]
        defs: Option<PathBuf>,
        /// Input file with expressions
        #[arg(short, long)]
        input: PathBuf,
        /// Print each tree back as source text
        #[arg(short, long)]
        render: bool,
    },
    /// Prints the tokens of a file
    Tokens {
        /// Input file with operator definitions
        #[arg(short, long)]
        defs: Option<PathBuf>,
        /// Input file with expressions
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn open_table(defs: Option<&Path>) -> Result<OperTable<CalcOper>> {
    match defs {
        Some(path) => load_table(path).with_context(|| format!("can't load {}", path.display())),
        None => Ok(reference().clone()),
    }
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("can't open {}", path.display()))
}

/// Parses one line and prints the tree, or the error, to stdout.
fn print_line(parser: &mut CalcParser, line: &str, render: bool) -> Result<()> {
    match parser.parse(line) {
        Ok(ast) => {
            println!("{}", ast);
            if render {
                println!("  {}", parser.render(&ast)?);
            }
        }
        Err(e) => println!("error: {}", e),
    }
    log::info!("Stats: {:?}", parser.stats());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Repl { defs } => {
            let table = open_table(defs.as_deref())?;
            let mut parser = CalcParser::new(&table);
            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            loop {
                print!("> ");
                io::stdout().flush()?;
                let Some(line) = lines.next().transpose()? else {
                    break;
                };
                let line = line.trim();
                if line == "exit" {
                    break;
                }
                if !line.is_empty() {
                    print_line(&mut parser, line, true)?;
                }
            }
        }
        Commands::Parse {
            defs,
            input,
            render,
        } => {
            let table = open_table(defs.as_deref())?;
            let mut parser = CalcParser::new(&table);
            for line in read_input(&input)?.lines() {
                if !line.trim().is_empty() {
                    print_line(&mut parser, line, render)?;
                }
            }
        }
        Commands::Tokens { defs, input } => {
            let table = open_table(defs.as_deref())?;
            let parser = CalcParser::new(&table);
            for token in parser.tokens(&read_input(&input)?)? {
                let span = token.span;
                let value = match &token.value {
                    TokenValue::Sign(s) => format!("sign {}", s),
                    TokenValue::Number(n) => format!("number {}", n),
                    TokenValue::Ident(s) => format!("ident {}", s),
                };
                println!(
                    "{}:{}-{}:{}\t{}",
                    span.start.line, span.start.column, span.end.line, span.end.column, value
                );
            }
        }
    }

    Ok(())
}
