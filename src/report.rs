use std::io::{self, Write};
use std::time::Duration;

use thiserror::Error;

use crate::ledger::{CoarseLedger, FineLedger};
use crate::runner::{self, Config, RunError};

/// The two built-in locking strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Coarse,
    Fine,
}

/// Grid the binary runs: thread counts {2,4,8,16} at 1000 then 10000
/// transactions per thread.
pub const DEFAULT_MATRIX: [Config; 8] = [
    Config { threads: 2, txns_per_thread: 1000 },
    Config { threads: 4, txns_per_thread: 1000 },
    Config { threads: 8, txns_per_thread: 1000 },
    Config { threads: 16, txns_per_thread: 1000 },
    Config { threads: 2, txns_per_thread: 10000 },
    Config { threads: 4, txns_per_thread: 10000 },
    Config { threads: 8, txns_per_thread: 10000 },
    Config { threads: 16, txns_per_thread: 10000 },
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Both timings for one matrix point.
#[derive(Debug, Clone, Copy)]
pub struct Row {
    pub config: Config,
    pub coarse: Duration,
    pub fine: Duration,
}

impl Row {
    /// Coarse elapsed over fine elapsed; above 1.0 means fine locking won.
    pub fn speedup(&self) -> f64 {
        self.coarse.as_secs_f64() / self.fine.as_secs_f64()
    }
}

/// Run one strategy over one matrix point on a fresh ledger.
pub fn run_strategy(strategy: Strategy, config: Config) -> Result<Duration, RunError> {
    match strategy {
        Strategy::Coarse => runner::run(&CoarseLedger::new(), config),
        Strategy::Fine => runner::run(&FineLedger::new(), config),
    }
}

fn measure(config: Config) -> Result<Row, RunError> {
    let coarse = run_strategy(Strategy::Coarse, config)?;
    let fine = run_strategy(Strategy::Fine, config)?;
    Ok(Row {
        config,
        coarse,
        fine,
    })
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn format_row(row: &Row) -> String {
    format!(
        "{:<8} {:<12} {:<15.2} {:<15.2} {:<10.2}",
        row.config.threads,
        row.config.txns_per_thread,
        ms(row.coarse),
        ms(row.fine),
        row.speedup(),
    )
}

/// Run every matrix point and print the comparison table, one row per
/// point, timings in milliseconds. Rows are flushed as they finish so the
/// slow configurations still show progress.
pub fn write_report<W: Write>(out: &mut W, matrix: &[Config]) -> Result<(), ReportError> {
    writeln!(out, "=== coarse vs fine locking ===")?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<8} {:<12} {:<15} {:<15} {:<10}",
        "threads", "txns/thread", "coarse (ms)", "fine (ms)", "speedup"
    )?;
    writeln!(
        out,
        "{:<8} {:<12} {:<15} {:<15} {:<10}",
        "-------", "-----------", "-----------", "---------", "-------"
    )?;

    for config in matrix {
        let row = measure(*config)?;
        writeln!(out, "{}", format_row(&row))?;
        out.flush()?;
    }
    Ok(())
}
