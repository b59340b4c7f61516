use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use finarch_sdk::Amount;

#[derive(Parser)]
#[command(
    name = "finarch",
    about = "FinArch: double-entry ledger with a proof-of-work audit chain",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file; defaults apply when absent
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run simulated transfers and seal them into blocks
    Demo(DemoArgs),
    /// Post one transfer and show the resulting balances
    Post(PostArgs),
    /// Mine blocks and report proofs and timings
    Mine(MineArgs),
    /// Verify chain and ledger integrity
    Verify(VerifyArgs),
    /// Screen a transfer against the AML rules
    Screen(ScreenArgs),
    /// Replay ledger history and compare with live balances
    Replay(ReplayArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub rounds: usize,
    /// Seal a block once this many payloads are pending
    #[arg(long, default_value = "3")]
    pub batch: usize,
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct PostArgs {
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub to: String,
    #[arg(long)]
    pub amount: Amount,
    /// Opening balance of the sending account
    #[arg(long, default_value = "0")]
    pub opening: Amount,
    #[arg(short, long, default_value = "transfer")]
    pub description: String,
}

#[derive(Args)]
pub struct MineArgs {
    #[arg(long, default_value = "1")]
    pub blocks: usize,
    /// Payloads queued per block
    #[arg(long, default_value = "1")]
    pub tx: usize,
    /// Override the configured difficulty
    #[arg(long)]
    pub difficulty: Option<u8>,
    /// Override the configured search threads
    #[arg(long)]
    pub workers: Option<usize>,
    /// Write the sealed chain as canonical JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Chain exported by `mine --export`; a demo chain is built when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

#[derive(Args)]
pub struct ScreenArgs {
    #[arg(long)]
    pub amount: Amount,
    #[arg(long, default_value = "TR")]
    pub country: String,
    #[arg(long, default_value = "SENDER")]
    pub sender: String,
    #[arg(long, default_value = "RECEIVER")]
    pub receiver: String,
}

#[derive(Args)]
pub struct ReplayArgs {
    #[arg(short = 'n', long, default_value = "10")]
    pub rounds: usize,
    #[arg(long)]
    pub seed: Option<u64>,
}
