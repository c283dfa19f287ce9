//! txn-viewer: 员工交易查看器命令行工具
//!
//! Usage:
//!   txn-viewer list [--pages <n>]                  List transactions page by page
//!   txn-viewer employee <id>                       List one employee's transactions
//!   txn-viewer approve <transaction-id> <bool>     Set a transaction's approval
//!   txn-viewer employees                           List employees

use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use txn_cache::{Transaction, TransactionViewer, ViewerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "list" => cmd_list(&args[2..]).await,
        "employee" => cmd_employee(&args[2..]).await,
        "approve" => cmd_approve(&args[2..]).await,
        "employees" => cmd_employees(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"txn-viewer: 员工交易查看器

USAGE:
    txn-viewer <COMMAND> [OPTIONS]

COMMANDS:
    list [--pages <n>]                 List transactions, loading <n> pages (default 1)
    employee <id>                      List one employee's transactions
    approve <transaction-id> <bool>    Set the approval flag of a transaction
    employees                          List employees
    version                            Show version information
    help                               Show this help message

OPTIONS:
    --config <path>                    Load settings from a YAML file

ENVIRONMENT:
    TXN_CACHE_ENABLED                  Enable the request cache (default true)
    TXN_CACHE_MAX_ENTRIES              Bound the cache with LRU eviction
    TXN_CACHE_TTL_SECS                 Expire cached responses
    TXN_MOCK_LATENCY_MS                Simulated backend latency (default 1000)
    TXN_PAGE_SIZE                      Transactions per page (default 5)
    RUST_LOG                           Log filter (default warn)"#
    );
}

fn cmd_version() {
    println!("txn-viewer {}", env!("CARGO_PKG_VERSION"));
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Positional arguments with `--flag value` pairs removed.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn open_viewer(args: &[String]) -> anyhow::Result<TransactionViewer> {
    let config = match flag_value(args, "--config") {
        Some(path) => ViewerConfig::from_yaml_file(PathBuf::from(path))
            .with_context(|| format!("loading config {path}"))?
            .with_env_overrides(),
        None => ViewerConfig::from_env(),
    };
    Ok(TransactionViewer::from_config(&config)?)
}

fn print_transactions(transactions: &[Transaction]) {
    for tx in transactions {
        println!(
            "[{}] {}  {:<28} {:>10.2}  {:<16} {}",
            if tx.approved { "x" } else { " " },
            tx.date,
            tx.merchant,
            tx.amount,
            tx.employee.full_name(),
            tx.id
        );
    }
}

async fn cmd_list(args: &[String]) -> anyhow::Result<()> {
    let pages = match flag_value(args, "--pages") {
        Some(n) => n
            .parse::<usize>()
            .map_err(|_| anyhow!("--pages expects a number, got {n}"))?,
        None => 1,
    };
    let viewer = open_viewer(args)?;

    viewer.load_all_transactions().await?;
    for _ in 1..pages {
        if !viewer.can_view_more() {
            break;
        }
        viewer.view_more().await?;
    }

    let transactions = viewer.transactions().unwrap_or_default();
    print_transactions(&transactions);
    println!();
    if viewer.can_view_more() {
        println!("{} transactions shown, more available", transactions.len());
    } else {
        println!("{} transactions shown", transactions.len());
    }
    Ok(())
}

async fn cmd_employee(args: &[String]) -> anyhow::Result<()> {
    let Some(id) = positional(args).first().copied() else {
        bail!("usage: txn-viewer employee <id>");
    };
    let viewer = open_viewer(args)?;
    viewer.load_transactions_by_employee(id).await?;
    print_transactions(&viewer.transactions().unwrap_or_default());
    Ok(())
}

async fn cmd_approve(args: &[String]) -> anyhow::Result<()> {
    let (id, value) = match positional(args).as_slice() {
        [id, value] => (
            id.to_string(),
            value
                .parse::<bool>()
                .map_err(|_| anyhow!("approval value must be true or false, got {value}"))?,
        ),
        _ => bail!("usage: txn-viewer approve <transaction-id> <true|false>"),
    };
    let viewer = open_viewer(args)?;

    // the transaction has to be on screen, so page through the full list
    viewer.load_all_transactions().await?;
    while !viewer
        .transactions()
        .unwrap_or_default()
        .iter()
        .any(|t| t.id == id)
        && viewer.can_view_more()
    {
        viewer.view_more().await?;
    }

    let state = viewer.set_transaction_approval(&id, value).await?;
    println!("{id}: {state:?}");
    Ok(())
}

async fn cmd_employees(args: &[String]) -> anyhow::Result<()> {
    let viewer = open_viewer(args)?;
    viewer.load_all_transactions().await?;
    for employee in viewer.employee_options().iter().skip(1) {
        println!("{}  {}", employee.id, employee.full_name());
    }
    Ok(())
}
