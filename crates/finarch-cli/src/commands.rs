use std::time::Instant;

use anyhow::Context;
use colored::Colorize;
use finarch_sdk::{
    AccountId, Amount, Block, FinArch, FinArchConfig, RiskLevel, ScreeningRequest,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::cli::*;
use crate::config::load_config;

const RESERVE: &str = "RESERVE";
const RESERVE_OPENING: i64 = 1_000_000;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Demo(args) => cmd_demo(config, args, json),
        Command::Post(args) => cmd_post(config, args, json),
        Command::Mine(args) => cmd_mine(config, args, json),
        Command::Verify(args) => cmd_verify(config, args, json),
        Command::Screen(args) => cmd_screen(config, args, json),
        Command::Replay(args) => cmd_replay(config, args, json),
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Random payouts from the reserve to users, some of which are spent at
/// merchants. A block is sealed whenever `batch` payloads are pending.
fn simulate(fa: &FinArch, rounds: usize, batch: usize, rng: &mut StdRng) -> anyhow::Result<()> {
    fa.open_account(RESERVE, Amount::from(RESERVE_OPENING))?;
    for _ in 0..rounds {
        let cents = rng.gen_range(10_000i64..=500_000);
        let amount = Amount::from_minor(cents, 2)?;
        let user = format!("USER_{}", rng.gen_range(1..=99));
        fa.transfer(RESERVE, user.as_str(), amount, "payout")?;

        if rng.gen_bool(0.5) {
            let spend = Amount::from_minor(cents / 2, 2)?;
            let merchant = format!("MERCHANT_{}", rng.gen_range(1..=9));
            fa.transfer(user.as_str(), merchant, spend, "purchase")?;
        }
        if fa.pending_payloads()? >= batch.max(1) {
            fa.seal_block()?;
        }
    }
    if fa.pending_payloads()? > 0 {
        fa.seal_block()?;
    }
    Ok(())
}

fn short_hash(block: &Block) -> anyhow::Result<String> {
    Ok(block.hash()?[..16].to_string())
}

fn print_blocks(blocks: &[Block]) -> anyhow::Result<()> {
    for block in blocks {
        println!(
            "  {}  {}...  proof {}  {} payload(s)",
            format!("#{}", block.index).yellow().bold(),
            short_hash(block)?.dimmed(),
            block.proof,
            block.transactions.len()
        );
    }
    Ok(())
}

fn cmd_demo(config: FinArchConfig, args: DemoArgs, json: bool) -> anyhow::Result<()> {
    let fa = FinArch::new(config)?;
    simulate(&fa, args.rounds, args.batch, &mut rng(args.seed))?;

    let sheet = fa.balance_sheet()?;
    let summary = fa.summary()?;
    let blocks = fa.blocks()?;
    let recent = &blocks[blocks.len().saturating_sub(3)..];

    if json {
        let out = json!({ "summary": summary, "balances": sheet, "recent_blocks": recent });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "Ledger".cyan().bold());
    for row in &sheet.rows {
        println!("  {:<14} {:>16}", row.account.as_str(), row.balance.to_string().green());
    }
    println!("  {:<14} {:>16}", "TOTAL".bold(), sheet.total.to_string().bold());
    println!("\n{}", "Chain (latest blocks)".yellow().bold());
    print_blocks(recent)?;
    println!(
        "\n{} transactions, {} blocks, difficulty {}",
        summary.transactions.to_string().bold(),
        summary.blocks.to_string().bold(),
        summary.difficulty
    );
    Ok(())
}

fn cmd_post(config: FinArchConfig, args: PostArgs, json: bool) -> anyhow::Result<()> {
    let fa = FinArch::new(config)?;
    fa.open_account(args.from.as_str(), args.opening)?;
    let receipt = fa.transfer(args.from.as_str(), args.to.as_str(), args.amount, args.description)?;
    let block = fa.seal_block()?;

    let from = fa.balance(&AccountId::from(args.from.as_str()))?.unwrap_or(Amount::ZERO);
    let to = fa.balance(&AccountId::from(args.to.as_str()))?.unwrap_or(Amount::ZERO);

    if json {
        let out = json!({
            "receipt": receipt,
            "balances": { args.from.as_str(): from, args.to.as_str(): to },
            "block": block,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} Transaction posted", "✓".green().bold());
    println!("  Id: {}", receipt.transaction_id.to_string().yellow());
    println!("  Sequence: {}", receipt.sequence);
    for flag in &receipt.flags {
        println!("  Flag: {}", flag.red());
    }
    println!("  {}: {}", args.from, from.to_string().green());
    println!("  {}: {}", args.to, to.to_string().green());
    println!("  Sealed in block {} ({}...)", block.index, short_hash(&block)?.dimmed());
    Ok(())
}

fn cmd_mine(mut config: FinArchConfig, args: MineArgs, json: bool) -> anyhow::Result<()> {
    if let Some(difficulty) = args.difficulty {
        config.chain.difficulty = difficulty;
    }
    if let Some(workers) = args.workers {
        config.chain.workers = workers;
    }
    let fa = FinArch::new(config)?;

    let mut mined = Vec::with_capacity(args.blocks);
    for b in 0..args.blocks {
        for t in 0..args.tx {
            fa.transfer(
                format!("USER_{t}"),
                format!("MERCHANT_{b}"),
                Amount::from(t as i64 + 1),
                "mined payment",
            )?;
        }
        let start = Instant::now();
        let block = fa.seal_block()?;
        let elapsed = start.elapsed();
        if !json {
            println!(
                "{} block {}  proof {}  {}...  {:.2?}",
                "⛏".yellow(),
                block.index.to_string().bold(),
                block.proof,
                short_hash(&block)?.dimmed(),
                elapsed
            );
        }
        mined.push(json!({
            "index": block.index,
            "proof": block.proof,
            "hash": block.hash()?,
            "payloads": block.transactions.len(),
            "elapsed_ms": elapsed.as_millis() as u64,
        }));
    }

    if let Some(path) = &args.export {
        std::fs::write(path, fa.export_chain()?)
            .with_context(|| format!("writing {}", path.display()))?;
        if !json {
            println!("Chain written to {}", path.display().to_string().bold());
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "blocks": mined }))?);
    }
    Ok(())
}

fn cmd_verify(config: FinArchConfig, args: VerifyArgs, json: bool) -> anyhow::Result<()> {
    if let Some(path) = &args.input {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let chain = FinArch::restore_chain(&bytes, config.chain)?;
        let result = chain.validate();
        if json {
            let out = match &result {
                Ok(()) => json!({ "valid": true, "blocks": chain.len() }),
                Err(e) => json!({
                    "valid": false,
                    "blocks": chain.len(),
                    "index": e.index,
                    "error": e.kind.to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            match &result {
                Ok(()) => println!(
                    "{} Chain of {} blocks verified",
                    "✓".green().bold(),
                    chain.len()
                ),
                Err(e) => println!("{} Block {}: {}", "✗".red().bold(), e.index, e.kind),
            }
        }
        result?;
        return Ok(());
    }

    let fa = FinArch::new(config)?;
    simulate(&fa, 6, 2, &mut rng(None))?;
    let report = fa.verify()?;

    if json {
        let out = json!({
            "valid": report.is_valid(),
            "chain_error": report.chain.as_ref().map(|e| e.to_string()),
            "transactions": report.ledger.transaction_count,
            "balanced": report.ledger.all_balanced,
            "conserved": report.ledger.conserved,
            "replay_converges": report.ledger.replay_converges,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let mark = |ok: bool| if ok { "valid".green() } else { "INVALID".red() };
        println!("{} Integrity check", if report.is_valid() { "✓".green().bold() } else { "✗".red().bold() });
        println!("  Hash chain: {}", mark(report.chain.is_none()));
        println!("  Balanced postings: {}", mark(report.ledger.all_balanced));
        println!("  Conservation: {}", mark(report.ledger.conserved));
        println!("  Replay: {}", mark(report.ledger.replay_converges));
        for violation in &report.ledger.violations {
            println!("  {} {}", "✗".red(), violation.description);
        }
    }
    anyhow::ensure!(report.is_valid(), "integrity check failed");
    Ok(())
}

fn cmd_screen(config: FinArchConfig, args: ScreenArgs, json: bool) -> anyhow::Result<()> {
    let fa = FinArch::new(config)?;
    let request = ScreeningRequest::new(args.amount, args.sender, args.receiver, args.country)
        .with_currency(fa.config().aml.currency.clone());
    let result = fa.screen(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let risk = result.risk_level.to_string();
    let risk = match result.risk_level {
        RiskLevel::Low => risk.green(),
        RiskLevel::Medium => risk.yellow(),
        RiskLevel::High => risk.red(),
        RiskLevel::Critical => risk.red().bold(),
    };
    println!("Amount: {} {}", request.amount, request.currency);
    println!("  Risk: {risk}");
    let flags = if result.flags.is_empty() {
        "None".to_string()
    } else {
        result.flags.join(", ")
    };
    println!("  Flags: {flags}");
    println!(
        "  Manual review: {}",
        if result.requires_manual_review { "YES".yellow() } else { "NO".normal() }
    );
    println!(
        "  Valid: {}",
        if result.is_valid { "✓".green() } else { "✗".red() }
    );
    Ok(())
}

fn cmd_replay(config: FinArchConfig, args: ReplayArgs, json: bool) -> anyhow::Result<()> {
    let fa = FinArch::new(config)?;
    simulate(&fa, args.rounds, 3, &mut rng(args.seed))?;

    let live = fa.balance_sheet()?;
    let replayed = fa.replay()?;
    let rows: Vec<_> = live
        .rows
        .iter()
        .map(|row| {
            let again = replayed.balances.get(&row.account).copied();
            (row, again, again == Some(row.balance))
        })
        .collect();
    let converges = rows.iter().all(|(_, _, ok)| *ok) && rows.len() == replayed.balances.len();

    if json {
        let accounts: Vec<_> = rows
            .iter()
            .map(|(row, again, ok)| {
                json!({ "account": row.account, "live": row.balance, "replayed": again, "match": ok })
            })
            .collect();
        let out = json!({
            "applied_transactions": replayed.applied_transactions,
            "converges": converges,
            "accounts": accounts,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "Replayed {} transactions",
            replayed.applied_transactions.to_string().bold()
        );
        for (row, again, ok) in &rows {
            let again = again.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
            let mark = if *ok { "✓".green() } else { "✗".red() };
            println!("  {mark} {:<14} {:>16} {:>16}", row.account.as_str(), row.balance, again);
        }
    }
    anyhow::ensure!(converges, "replay diverged from live balances");
    Ok(())
}
