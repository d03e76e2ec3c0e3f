//! Loan payoff CLI
//!
//! Command-line interface for amortization schedules, basket payoffs and
//! payment sweeps

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use payoff_sim::format::money;
use payoff_sim::loan::load_loans;
use payoff_sim::sweep::{payment_range, SweepResult, SweepRunner};
use payoff_sim::{Loan, LoanTerms, MultiLoan, SimulationConfig};

/// Loan payoff schedules, avalanche baskets and payment sweeps
#[derive(Parser)]
#[command(name = "payoff", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with compounding defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Amortization schedule for one loan
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,

        /// Number of periods to print
        #[arg(long, default_value_t = 24)]
        rows: usize,

        /// Write the full schedule as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Pay off a basket of loans from a shared budget, highest rate first
    Basket {
        /// CSV with principal,rate,payment columns
        #[arg(long)]
        loans: PathBuf,

        /// Shared budget per period
        #[arg(long)]
        payment: f64,

        /// Number of periods to print
        #[arg(long, default_value_t = 24)]
        rows: usize,

        /// Write per-loan rows as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Total cost of payoff across a range of payment amounts
    Sweep(SweepArgs),
}

#[derive(Args)]
struct ConfigOverrides {
    /// Compounding events per rate period
    #[arg(long, global = true)]
    compounding: Option<u32>,

    /// Fraction of the rate period per payment
    #[arg(long, global = true)]
    period_fraction: Option<f64>,

    /// Balance ceiling for divergent schedules
    #[arg(long, global = true)]
    stop: Option<f64>,
}

#[derive(Args)]
struct LoanArgs {
    #[arg(long)]
    principal: f64,

    /// Nominal rate as a decimal, e.g. 0.05
    #[arg(long)]
    rate: f64,

    #[arg(long)]
    payment: f64,
}

#[derive(Args)]
struct SweepArgs {
    /// Sweep a basket loaded from CSV instead of a single loan
    #[arg(long, conflicts_with_all = ["principal", "rate"])]
    loans: Option<PathBuf>,

    #[arg(long, required_unless_present = "loans")]
    principal: Option<f64>,

    #[arg(long, required_unless_present = "loans")]
    rate: Option<f64>,

    /// Explicit amounts, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["low", "high", "step"])]
    amounts: Option<Vec<f64>>,

    #[arg(long, default_value_t = 100.0)]
    low: f64,

    #[arg(long, default_value_t = 1000.0)]
    high: f64,

    #[arg(long, default_value_t = 100.0)]
    step: f64,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), &cli.overrides)?;
    log::debug!("using {:?}", config);

    match cli.command {
        Commands::Schedule { loan, rows, csv } => run_schedule(&loan, &config, rows, csv.as_deref()),
        Commands::Basket { loans, payment, rows, csv } => {
            run_basket(&loans, payment, &config, rows, csv.as_deref())
        }
        Commands::Sweep(args) => run_sweep(&args, &config),
    }
}

fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<SimulationConfig> {
    let mut config = match path {
        Some(path) => SimulationConfig::from_json_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(n) = overrides.compounding {
        config.compounding_per_period = n;
    }
    if let Some(t) = overrides.period_fraction {
        config.period_fraction = t;
    }
    if let Some(stop) = overrides.stop {
        config.stop_threshold = stop;
    }
    Ok(config)
}

fn run_schedule(args: &LoanArgs, config: &SimulationConfig, rows: usize, csv: Option<&Path>) -> Result<()> {
    let mut loan = Loan::new(LoanTerms::with_config(args.principal, args.rate, args.payment, config))?;
    loan.pay_remaining()?;

    println!("{}\n", loan);
    println!("{:>6} {:>14} {:>14}", "Period", "Payment", "Balance");
    println!("{}", "-".repeat(36));
    for row in loan.schedule().iter().take(rows + 1) {
        println!("{:>6} {:>14} {:>14}", row.period, money(row.payment), money(row.balance));
    }
    if loan.number_of_payments() > rows {
        println!("... ({} more periods)", loan.number_of_payments() - rows);
    }

    if let Some(path) = csv {
        write_csv(path, &loan.schedule())?;
        println!("\nFull schedule written to: {}", path.display());
    }
    Ok(())
}

fn run_basket(
    loans_path: &Path,
    payment: f64,
    config: &SimulationConfig,
    rows: usize,
    csv: Option<&Path>,
) -> Result<()> {
    let terms = load_loans(loans_path, config)
        .with_context(|| format!("loading loans from {}", loans_path.display()))?;
    let mut basket = MultiLoan::from_terms(&terms, payment)?;
    basket.pay_remaining()?;

    println!("{}\n", basket);
    println!("{:>6} {:>14} {:>14}", "Period", "Payment", "Balance");
    println!("{}", "-".repeat(36));
    for row in basket.totals().iter().take(rows + 1) {
        println!("{:>6} {:>14} {:>14}", row.period, money(row.payment), money(row.balance));
    }
    if basket.number_of_payments() > rows {
        println!("... ({} more periods)", basket.number_of_payments() - rows);
    }

    println!("\nPer loan:");
    for (index, loan) in basket.loans().iter().enumerate() {
        let last_payment = loan.payments().iter().rposition(|&p| p > 0.0).unwrap_or(0);
        println!(
            "  #{} rate {:.4}: paid {} over {} periods",
            index,
            loan.rate(),
            money(loan.total_paid()),
            last_payment,
        );
    }

    if let Some(path) = csv {
        write_csv(path, &basket.schedule())?;
        println!("\nPer-loan schedule written to: {}", path.display());
    }
    Ok(())
}

fn run_sweep(args: &SweepArgs, config: &SimulationConfig) -> Result<()> {
    let amounts = match &args.amounts {
        Some(amounts) => amounts.clone(),
        None => payment_range(args.low, args.high, args.step)?,
    };
    let Some(&first) = amounts.first() else {
        bail!("no payment amounts to sweep");
    };

    let result = match &args.loans {
        Some(path) => {
            let terms = load_loans(path, config)
                .with_context(|| format!("loading loans from {}", path.display()))?;
            let minimum: f64 = terms.iter().map(|t| t.payment).sum();
            SweepRunner::new(MultiLoan::from_terms(&terms, minimum)?).run(&amounts)?
        }
        None => {
            let (Some(principal), Some(rate)) = (args.principal, args.rate) else {
                bail!("--principal and --rate are required without --loans");
            };
            let loan = Loan::new(LoanTerms::with_config(principal, rate, first, config))?;
            SweepRunner::new(loan).run(&amounts)?
        }
    };

    match args.format {
        OutputFormat::Table => print_sweep(&result),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for row in result.rows() {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result.rows())?),
    }
    Ok(())
}

fn print_sweep(result: &SweepResult) {
    println!("{:>12} {:>16} {:>10} {:>10}", "Amount", "Total", "Change", "Payments");
    println!("{}", "-".repeat(51));
    for row in result.rows() {
        let change = row
            .pct_change
            .map(|p| format!("{:.2}%", p * 100.0))
            .unwrap_or_default();
        println!(
            "{:>12} {:>16} {:>10} {:>10}",
            money(row.amount),
            money(row.total),
            change,
            row.n_payments,
        );
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
