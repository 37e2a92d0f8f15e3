//! Change log between two versions of a transaction
//!
//! Both files are captured as consecutive snapshots, so the output is the
//! change log of the second snapshot.

use std::path::PathBuf;

use autrace_engine::TransactionAnalyzer;
use clap::Args;

use super::{read_transaction, CommandResult, Context};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Earlier version of the transaction
    pub before: PathBuf,

    /// Later version of the transaction
    pub after: PathBuf,

    /// Lifecycle phase of the earlier version
    #[arg(long, default_value = "prove")]
    pub before_phase: String,

    /// Lifecycle phase of the later version
    #[arg(long, default_value = "send")]
    pub after_phase: String,
}

pub fn execute(args: DiffArgs, ctx: &Context) -> CommandResult {
    let before = read_transaction(&args.before)?;
    let after = read_transaction(&args.after)?;

    let mut analyzer = TransactionAnalyzer::new(ctx.cfg.clone());
    analyzer.take_snapshot(&before, &args.before_phase)?;
    let snapshot = analyzer.take_snapshot(&after, &args.after_phase)?;
    ctx.emit(&snapshot.changes)
}
