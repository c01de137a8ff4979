use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use orderbook::{MatchingEngine, OrderEvent, Snapshot};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

mod parse;

#[derive(Parser)]
#[command(name = "tradesim-cli")]
#[command(about = "Trade simulator - matches buy/sell orders and prints the final order book")]
struct Cli {
    /// Order file, one order per line. Reads standard input when omitted.
    file: Option<PathBuf>,
    /// Print the final order book as JSON
    #[arg(long)]
    json: bool,
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries reports and the book, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level(cli.verbose))
        .init();

    let events = match &cli.file {
        Some(path) => {
            let file = open_orders(path)?;
            parse::parse_orders(BufReader::new(file))?
        }
        None => parse::parse_orders(io::stdin().lock())?,
    };
    info!(events = events.len(), "parsed order stream");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    simulate(events, &mut out, cli.json)
}

fn open_orders(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| {
        let msg = match err.kind() {
            io::ErrorKind::NotFound => format!("File not found: {}", path.display()),
            _ => format!("failed to open {}", path.display()),
        };
        anyhow::Error::new(err).context(msg)
    })
}

/// Runs the whole stream, printing each report as it happens, then the book.
fn simulate<W: Write>(events: Vec<OrderEvent>, out: &mut W, json: bool) -> Result<()> {
    let mut engine = MatchingEngine::new();

    let mut written = Ok(());
    engine.run(events, |report| {
        if written.is_ok() {
            written = writeln!(out, "{report}");
        }
    });
    written.context("failed to write report")?;

    let snapshot = engine.snapshot();
    if json {
        serde_json::to_writer_pretty(&mut *out, &snapshot)?;
        writeln!(out)?;
    } else {
        write_book(out, &snapshot)?;
    }
    Ok(())
}

fn write_book<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    writeln!(out, "Order book:")?;
    writeln!(out, "Sellers: {}", snapshot.sellers_line())?;
    writeln!(out, "Buyers: {}", snapshot.buyers_line())
}
