//! fincalc CLI
//!
//! Command-line interface for the personal-finance calculators

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fincalc::batch::{load_loan_offers, load_requests, BatchRunner};
use fincalc::form::{amount_arg, parse_count, parse_non_negative, parse_positive, rate_arg};
use fincalc::format::{format_inr, format_pct};
use fincalc::loan::{AmortizationSchedule, EmiTiming, LoanOffer, LoanTerms};
use fincalc::invest::StepUp;
use fincalc::tax::{TaxDirection, TaxKind};
use fincalc::{CalculationOutcome, CalculationRequest, CalculatorDefaults, Frequency};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fincalc", version, about = "Personal-finance calculators")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// JSON file overriding calculator defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monthly EMI for a loan
    Emi {
        #[arg(long, value_parser = amount_arg)]
        principal: f64,
        /// Annual interest rate in percent
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        months: u32,
        /// First EMI is paid at disbursal
        #[arg(long)]
        advance: bool,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Months needed to repay a loan with a given EMI
    Tenure {
        #[arg(long, value_parser = amount_arg)]
        principal: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long, value_parser = amount_arg)]
        emi: f64,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// EMI of a flat-rate loan and its reducing-balance equivalent
    FlatEmi {
        #[arg(long, value_parser = amount_arg)]
        principal: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        months: u32,
    },
    /// Interest rate implied by an EMI
    LoanRate {
        #[arg(long, value_parser = amount_arg)]
        principal: f64,
        #[arg(long, value_parser = amount_arg)]
        emi: f64,
        #[arg(long)]
        months: u32,
    },
    /// Compare loan offers given as LABEL:PRINCIPAL:RATE:MONTHS or a CSV file
    Compare {
        #[arg(long = "loan", value_parser = parse_offer)]
        loans: Vec<LoanOffer>,
        #[arg(long)]
        offers: Option<PathBuf>,
    },
    /// Monthly SIP maturity
    Sip {
        #[arg(long, value_parser = amount_arg)]
        monthly: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        years: u32,
        /// Yearly step-up in percent
        #[arg(long, conflicts_with = "step_up_amount")]
        step_up_pct: Option<f64>,
        /// Yearly step-up as a fixed amount
        #[arg(long)]
        step_up_amount: Option<f64>,
    },
    /// One-time investment growth
    Lumpsum {
        #[arg(long, value_parser = amount_arg)]
        amount: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        years: u32,
    },
    /// Recurring deposit maturity
    Rd {
        #[arg(long, value_parser = amount_arg)]
        monthly: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        months: u32,
        #[arg(long)]
        compounding: Option<Frequency>,
    },
    /// Fixed deposit maturity
    Fd {
        #[arg(long, value_parser = amount_arg)]
        principal: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        months: u32,
        #[arg(long)]
        compounding: Option<Frequency>,
    },
    /// PPF maturity with yearly statement
    Ppf {
        #[arg(long, value_parser = amount_arg)]
        yearly: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: Option<f64>,
        /// Defaults to the PPF lock-in period
        #[arg(long)]
        years: Option<u32>,
    },
    /// Add or remove GST/VAT
    Gst {
        #[arg(long, value_parser = amount_arg)]
        amount: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        /// Amount already includes tax
        #[arg(long)]
        remove: bool,
        #[arg(long, value_enum, default_value_t = KindArg::Intra)]
        kind: KindArg,
    },
    /// Simple interest
    Si {
        #[arg(long, value_parser = amount_arg)]
        principal: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        years: f64,
    },
    /// Compound interest
    Ci {
        #[arg(long, value_parser = amount_arg)]
        principal: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        years: f64,
        #[arg(long, default_value = "annually")]
        compounding: Frequency,
    },
    /// Systematic transfer plan
    Stp {
        #[arg(long, value_parser = amount_arg)]
        lumpsum: f64,
        #[arg(long, value_parser = amount_arg)]
        transfer: f64,
        #[arg(long, value_parser = rate_arg)]
        source_rate: f64,
        #[arg(long, value_parser = rate_arg)]
        target_rate: f64,
        #[arg(long)]
        months: u32,
    },
    /// Systematic withdrawal plan
    Swp {
        #[arg(long, value_parser = amount_arg)]
        investment: f64,
        #[arg(long, value_parser = amount_arg)]
        withdrawal: f64,
        #[arg(long, value_parser = rate_arg)]
        rate: f64,
        #[arg(long)]
        months: u32,
    },
    /// Evaluate a JSON file of requests (or a CSV of loan offers)
    Batch { file: PathBuf },
}

#[derive(clap::Args, Debug)]
struct ScheduleArgs {
    /// Write the amortization schedule to this CSV file
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Disbursal date (YYYY-MM-DD) used for due dates
    #[arg(long)]
    start: Option<NaiveDate>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Intra,
    Inter,
    Vat,
}

impl From<KindArg> for TaxKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Intra => TaxKind::IntraStateGst,
            KindArg::Inter => TaxKind::InterStateGst,
            KindArg::Vat => TaxKind::Vat,
        }
    }
}

fn parse_offer(raw: &str) -> Result<LoanOffer, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 4 {
        return Err(format!("expected LABEL:PRINCIPAL:RATE:MONTHS, got '{}'", raw));
    }
    let terms = LoanTerms::new(
        parse_positive("principal", parts[1]).map_err(|e| e.to_string())?,
        parse_non_negative("rate", parts[2]).map_err(|e| e.to_string())?,
        parse_count("months", parts[3]).map_err(|e| e.to_string())?,
    );
    Ok(LoanOffer { label: parts[0].to_string(), terms })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let defaults = CalculatorDefaults::load(cli.config.as_deref())
        .context("Unable to load calculator defaults")?;
    let runner = BatchRunner::with_defaults(defaults);

    let (request, schedule_args) = match cli.command {
        Command::Batch { file } => return run_batch(&runner, &file, cli.json),
        Command::Emi { principal, rate, months, advance, schedule } => (
            CalculationRequest::Emi {
                principal,
                annual_rate: rate,
                months,
                timing: if advance { EmiTiming::Advance } else { EmiTiming::Arrears },
            },
            Some(schedule),
        ),
        Command::Tenure { principal, rate, emi, schedule } => (
            CalculationRequest::Tenure { principal, annual_rate: rate, emi },
            Some(schedule),
        ),
        Command::FlatEmi { principal, rate, months } => (
            CalculationRequest::FlatRateEmi { principal, annual_rate: rate, months },
            None,
        ),
        Command::LoanRate { principal, emi, months } => {
            (CalculationRequest::LoanRate { principal, emi, months }, None)
        }
        Command::Compare { mut loans, offers } => {
            if let Some(path) = offers {
                let loaded = load_loan_offers(&path)
                    .with_context(|| format!("Unable to read loan offers from {}", path.display()))?;
                loans.extend(loaded);
            }
            (CalculationRequest::CompareLoans { loans }, None)
        }
        Command::Sip { monthly, rate, years, step_up_pct, step_up_amount } => {
            let step_up = match (step_up_pct, step_up_amount) {
                (Some(pct), _) => Some(StepUp::Percent(pct)),
                (None, Some(amount)) => Some(StepUp::Amount(amount)),
                (None, None) => None,
            };
            let request = match step_up {
                Some(step_up) => CalculationRequest::StepUpSip {
                    monthly_investment: monthly,
                    annual_return: rate,
                    years,
                    step_up,
                },
                None => CalculationRequest::Sip {
                    monthly_investment: monthly,
                    annual_return: rate,
                    years,
                },
            };
            (request, None)
        }
        Command::Lumpsum { amount, rate, years } => (
            CalculationRequest::Lumpsum { amount, annual_return: rate, years },
            None,
        ),
        Command::Rd { monthly, rate, months, compounding } => (
            CalculationRequest::Rd { monthly_deposit: monthly, annual_rate: rate, months, compounding },
            None,
        ),
        Command::Fd { principal, rate, months, compounding } => (
            CalculationRequest::Fd { principal, annual_rate: rate, months, compounding },
            None,
        ),
        Command::Ppf { yearly, rate, years } => (
            CalculationRequest::Ppf { yearly_deposit: yearly, annual_rate: rate, years },
            None,
        ),
        Command::Gst { amount, rate, remove, kind } => (
            CalculationRequest::Gst {
                amount,
                rate,
                direction: if remove { TaxDirection::Remove } else { TaxDirection::Add },
                kind: kind.into(),
            },
            None,
        ),
        Command::Si { principal, rate, years } => (
            CalculationRequest::SimpleInterest { principal, annual_rate: rate, years },
            None,
        ),
        Command::Ci { principal, rate, years, compounding } => (
            CalculationRequest::CompoundInterest { principal, annual_rate: rate, years, compounding },
            None,
        ),
        Command::Stp { lumpsum, transfer, source_rate, target_rate, months } => (
            CalculationRequest::Stp {
                lumpsum,
                monthly_transfer: transfer,
                source_annual_rate: source_rate,
                target_annual_rate: target_rate,
                months,
            },
            None,
        ),
        Command::Swp { investment, withdrawal, rate, months } => (
            CalculationRequest::Swp {
                initial_investment: investment,
                monthly_withdrawal: withdrawal,
                annual_rate: rate,
                months,
            },
            None,
        ),
    };

    let outcome = runner.run(&request)?;

    if let Some(ScheduleArgs { schedule: Some(path), start }) = schedule_args {
        let schedule = match &outcome {
            CalculationOutcome::Emi(result) => AmortizationSchedule::from_emi(result, start),
            CalculationOutcome::Tenure(result) => AmortizationSchedule::from_tenure(result, start),
            _ => bail!("No schedule available for {}", request.name()),
        };
        let file = File::create(&path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        schedule.write_csv(file)?;
        eprintln!("Schedule written to: {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn run_batch(runner: &BatchRunner, file: &Path, json: bool) -> anyhow::Result<()> {
    let is_csv = file.extension().map(|e| e.eq_ignore_ascii_case("csv")).unwrap_or(false);
    let requests = if is_csv {
        vec![CalculationRequest::CompareLoans { loans: load_loan_offers(file)? }]
    } else {
        load_requests(file).with_context(|| format!("Unable to read requests from {}", file.display()))?
    };

    let items = runner.run_batch(&requests);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!("#{} {}", item.index + 1, item.calculator);
        match (&item.outcome, &item.error) {
            (Some(outcome), _) => print_outcome(outcome),
            (None, Some(error)) => println!("  error: {}", error),
            (None, None) => {}
        }
        println!();
    }
    Ok(())
}

fn line(label: &str, value: String) {
    println!("  {:<22} {:>18}", label, value);
}

fn print_outcome(outcome: &CalculationOutcome) {
    match outcome {
        CalculationOutcome::Emi(r) => {
            line("Monthly EMI", format_inr(r.emi));
            line("Principal", format_inr(r.terms.principal));
            line("Total interest", format_inr(r.total_interest));
            line("Total payment", format_inr(r.total_payment));
        }
        CalculationOutcome::Tenure(r) => {
            let (years, months) = r.years_and_months();
            line("Tenure", format!("{}y {}m", years, months));
            line("Exact months", format!("{:.2}", r.exact_months));
            line("Last EMI", format_inr(r.last_payment));
            line("Total interest", format_inr(r.total_interest));
            line("Total payment", format_inr(r.total_payment));
        }
        CalculationOutcome::FlatRateEmi(r) => {
            line("Monthly EMI", format_inr(r.emi));
            line("Total interest", format_inr(r.total_interest));
            line("Total payment", format_inr(r.total_payment));
            line("Effective rate", format_pct(r.effective_annual_rate));
        }
        CalculationOutcome::LoanRate { annual_rate } => {
            line("Annual rate", format_pct(*annual_rate));
        }
        CalculationOutcome::CompareLoans(cmp) => {
            println!("  {:<16} {:>14} {:>18} {:>18}", "Loan", "EMI", "Interest", "Extra cost");
            println!("  {}", "-".repeat(70));
            for loan in &cmp.loans {
                println!(
                    "  {:<16} {:>14} {:>18} {:>18}",
                    loan.label,
                    format_inr(loan.result.emi),
                    format_inr(loan.result.total_interest),
                    format_inr(loan.extra_cost),
                );
            }
            line("Cheapest", cmp.cheapest_loan().label.clone());
            line("Max interest saved", format_inr(cmp.max_interest_saving()));
        }
        CalculationOutcome::Sip(r) | CalculationOutcome::Lumpsum(r) => {
            line("Invested amount", format_inr(r.total_invested));
            line("Est. returns", format_inr(r.estimated_returns));
            line("Total value", format_inr(r.maturity_value));
        }
        CalculationOutcome::StepUpSip(r) => {
            line("Invested amount", format_inr(r.total_invested));
            line("Est. returns", format_inr(r.estimated_returns));
            line("Total value", format_inr(r.maturity_value));
            line("Final instalment", format_inr(r.final_instalment));
        }
        CalculationOutcome::Rd(r) | CalculationOutcome::Fd(r) => {
            line("Total deposited", format_inr(r.total_deposited));
            line("Interest earned", format_inr(r.interest_earned));
            line("Maturity value", format_inr(r.maturity_value));
        }
        CalculationOutcome::Ppf(r) => {
            println!("  {:>4} {:>16} {:>14} {:>14} {:>16}", "Year", "Opening", "Deposit", "Interest", "Closing");
            for y in &r.statement {
                println!(
                    "  {:>4} {:>16.2} {:>14.2} {:>14.2} {:>16.2}",
                    y.year, y.opening_balance, y.deposit, y.interest, y.closing_balance
                );
            }
            line("Rate", format_pct(r.annual_rate));
            line("Total deposited", format_inr(r.total_deposited));
            line("Interest earned", format_inr(r.interest_earned));
            line("Maturity value", format_inr(r.maturity_value));
        }
        CalculationOutcome::Gst(r) => {
            line("Net amount", format_inr(r.net_amount));
            match r.kind {
                TaxKind::IntraStateGst => {
                    line("CGST", format_inr(r.split.cgst));
                    line("SGST", format_inr(r.split.sgst));
                }
                TaxKind::InterStateGst => line("IGST", format_inr(r.split.igst)),
                TaxKind::Vat => line("VAT", format_inr(r.split.vat)),
            }
            line("Total tax", format_inr(r.tax_amount));
            line("Gross amount", format_inr(r.gross_amount));
            if r.standard_slab == Some(false) {
                println!("  Note: {} is not a standard GST slab", format_pct(r.rate));
            }
        }
        CalculationOutcome::SimpleInterest(r) | CalculationOutcome::CompoundInterest(r) => {
            line("Principal", format_inr(r.principal));
            line("Interest", format_inr(r.interest));
            line("Total amount", format_inr(r.total_amount));
        }
        CalculationOutcome::Stp(r) => {
            line("Total transferred", format_inr(r.total_transferred));
            line("Source fund value", format_inr(r.final_source_value));
            line("Target fund value", format_inr(r.final_target_value));
            line("Total value", format_inr(r.total_value));
            line("Total gain", format_inr(r.total_gain));
        }
        CalculationOutcome::Swp(r) => {
            line("Total investment", format_inr(r.initial_investment));
            line("Total withdrawn", format_inr(r.total_withdrawn));
            line("Interest earned", format_inr(r.total_interest));
            line("Final value", format_inr(r.final_balance));
            if let Some(month) = r.exhausted_in_month {
                line("Corpus exhausted", format!("month {}", month));
            }
        }
    }

    if let Some(b) = outcome.breakdown() {
        line("Split", format!("{:.1}% / {:.1}%", b.base_share_pct, b.extra_share_pct));
    }
}
