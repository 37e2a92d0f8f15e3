//! Flow graph of one transaction

use std::path::PathBuf;

use autrace_engine::TransactionAnalyzer;
use clap::Args;

use super::{read_transaction, CommandResult, Context};

#[derive(Debug, Args)]
pub struct FlowArgs {
    /// Transaction JSON (canonical or block-explorer shape)
    pub file: PathBuf,
}

pub fn execute(args: FlowArgs, ctx: &Context) -> CommandResult {
    let raw = read_transaction(&args.file)?;
    let mut analyzer = TransactionAnalyzer::new(ctx.cfg.clone());
    let state = analyzer.analyze(&raw);
    ctx.emit(&state.flow)
}
