//! `loan-calc` - command line front end for the loan amortization library.
//!
//! Inputs omitted on the command line fall back to the last-used values
//! remembered in the input store, then to the configured defaults.

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use loan_schedule::config::CalculatorConfig;
use loan_schedule::export::{
    export_schedule, format_with_commas, write_last_inputs_csv, write_schedule_csv,
};
use loan_schedule::store::{remember_on_success, JsonFileStore, LastInputs};
use loan_schedule::{
    round2, BoundViolation, DisplayScale, Frequency, LoanTerms, ScheduleMode, ScheduleSummary,
};

/// Fixed-payment loan calculator
#[derive(Parser)]
#[command(name = "loan-calc", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "loan-calc.toml")]
    config: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the inputs against the configured bounds
    Validate(LoanArgs),
    /// Calculate the fixed periodic payment
    Payment(LoanArgs),
    /// Print the principal/interest schedule
    Schedule(ScheduleArgs),
    /// Write the schedule to a CSV file
    Export(ExportArgs),
    /// Show the remembered inputs
    Last,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
    Csv,
}

#[derive(Args, Debug)]
struct LoanArgs {
    /// Loan amount
    #[arg(short, long)]
    principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(short, long)]
    rate: Option<Decimal>,

    /// Term in years
    #[arg(short, long)]
    years: Option<u32>,

    /// Repayment frequency (weekly, fortnightly, monthly)
    #[arg(short, long)]
    frequency: Option<Frequency>,

    /// Snap an out-of-range loan amount to the nearest bound
    #[arg(long)]
    clamp: bool,
}

#[derive(Args, Debug)]
struct ScheduleArgs {
    #[command(flatten)]
    loan: LoanArgs,

    /// Display scale (week, fortnight, month, year)
    #[arg(short, long)]
    scale: Option<DisplayScale>,

    /// Amortize per repayment and group into display periods
    #[arg(long)]
    aligned: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    schedule: ScheduleArgs,

    /// Directory to write the file into
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CalculatorConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .with_env_override();
    init_tracing(&config, cli.verbose);
    config.validate()?;

    let mut store = JsonFileStore::open(&config.store_path)
        .with_context(|| format!("opening input store {}", config.store_path.display()))?;
    let last = LastInputs::load(&store)?;
    debug!(?last, "loaded last-used inputs");

    match cli.command {
        Commands::Validate(args) => {
            let terms = config.resolve_terms(&args.requested(None), &last, args.clamp);
            let violations = terms.check_inputs(&config.bounds);
            print_validation(&terms, &violations, cli.output);
            if !violations.is_empty() {
                process::exit(1);
            }
            remember_on_success(&mut store, &terms, None, |_| Ok(()))?;
        }
        Commands::Payment(args) => {
            let terms = config.checked_terms(&args.requested(None), &last, args.clamp)?;
            let payment = remember_on_success(&mut store, &terms, None, LoanTerms::payment)?;
            print_payment(&terms, payment, cli.output);
        }
        Commands::Schedule(args) => {
            let terms = config.checked_terms(&args.loan.requested(args.scale), &last, args.loan.clamp)?;
            let scale = config.resolve_scale(args.scale, &last);
            let mode = schedule_mode(args.aligned);
            let summary = remember_on_success(&mut store, &terms, Some(scale), |t| t.summary(scale, mode))?;
            print_schedule(&terms, scale, &summary, cli.output)?;
        }
        Commands::Export(args) => {
            let loan = &args.schedule.loan;
            let terms = config.checked_terms(&loan.requested(args.schedule.scale), &last, loan.clamp)?;
            let scale = config.resolve_scale(args.schedule.scale, &last);
            let mode = schedule_mode(args.schedule.aligned);
            let path = remember_on_success(&mut store, &terms, Some(scale), |t| {
                let entries = t.schedule(scale, mode)?;
                export_schedule(&args.dir, scale, &entries, Utc::now())
            })?;
            println!("{}", path.display());
        }
        Commands::Last => print_last(&last, cli.output)?,
    }

    Ok(())
}

impl LoanArgs {
    /// The inputs given on the command line; omitted flags stay `None`.
    fn requested(&self, scale: Option<DisplayScale>) -> LastInputs {
        LastInputs {
            principal: self.principal,
            annual_rate_percent: self.rate,
            term_years: self.years,
            frequency: self.frequency,
            scale,
        }
    }
}

fn init_tracing(config: &CalculatorConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn schedule_mode(aligned: bool) -> ScheduleMode {
    if aligned {
        ScheduleMode::FrequencyAligned
    } else {
        ScheduleMode::Compatible
    }
}

fn print_validation(terms: &LoanTerms, violations: &[BoundViolation], output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            let value = json!({ "terms": terms, "valid": violations.is_empty(), "violations": violations });
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        }
        OutputFormat::Csv => {
            println!("field,message");
            for violation in violations {
                let field = match violation {
                    BoundViolation::Principal { .. } => "principal",
                    BoundViolation::InterestRate { .. } => "interest_rate",
                    BoundViolation::TermYears { .. } => "term_years",
                };
                println!("{field},\"{violation}\"");
            }
        }
        OutputFormat::Table => {
            if violations.is_empty() {
                println!(
                    "Valid: ${} at {}% over {} years",
                    format_with_commas(terms.principal),
                    terms.annual_rate_percent,
                    terms.term_years
                );
            } else {
                for violation in violations {
                    println!("{violation}");
                }
            }
        }
    }
}

fn print_payment(terms: &LoanTerms, payment: Decimal, output: OutputFormat) {
    let rounded = round2(payment);
    match output {
        OutputFormat::Json => {
            let value = json!({ "terms": terms, "payment": rounded });
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        }
        OutputFormat::Csv => {
            println!("frequency,payment");
            println!("{},{}", terms.frequency, rounded);
        }
        OutputFormat::Table => {
            println!("{} payment: ${}", capitalize(terms.frequency.as_str()), format_with_commas(rounded));
        }
    }
}

fn print_schedule(
    terms: &LoanTerms,
    scale: DisplayScale,
    summary: &ScheduleSummary,
    output: OutputFormat,
) -> Result<()> {
    match output {
        OutputFormat::Json => {
            let value = json!({ "terms": terms, "scale": scale, "schedule": summary });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            write_schedule_csv(io::stdout().lock(), &summary.entries)?;
        }
        OutputFormat::Table => {
            println!(
                "{} payment: ${}",
                capitalize(terms.frequency.as_str()),
                format_with_commas(summary.payment)
            );
            println!("{:>8} {:>14} {:>14}", scale.as_str(), "Principal", "Interest");
            for entry in &summary.entries {
                println!(
                    "{:>8} {:>14} {:>14}",
                    entry.index,
                    format_with_commas(entry.principal_portion),
                    format_with_commas(entry.interest_portion)
                );
            }
            println!(
                "{:>8} {:>14} {:>14}",
                "shown",
                format_with_commas(summary.displayed_principal),
                format_with_commas(summary.displayed_interest)
            );
            println!("Total paid:     ${}", format_with_commas(summary.total_paid));
            println!("Total interest: ${}", format_with_commas(summary.total_interest));
        }
    }
    Ok(())
}

fn print_last(last: &LastInputs, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(last)?);
        }
        OutputFormat::Csv => {
            write_last_inputs_csv(io::stdout().lock(), last)?;
        }
        OutputFormat::Table => {
            if last.is_empty() {
                println!("No remembered inputs");
                return Ok(());
            }
            let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
            println!("principal: {}", show(last.principal.map(format_with_commas)));
            println!("rate:      {}", show(last.annual_rate_percent.map(|r| format!("{r}%"))));
            println!("years:     {}", show(last.term_years.map(|y| y.to_string())));
            println!("frequency: {}", show(last.frequency.map(|f| f.to_string())));
            println!("scale:     {}", show(last.scale.map(|s| s.to_string())));
        }
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
