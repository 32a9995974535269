use std::{io, ops::Range, path::PathBuf, process::ExitCode};

use ariadne::{Config as DiagnosticConfig, IndexType, Label, Report as Diagnostic, ReportKind, Source};
use arsenal::{
	bonus,
	config::{self, Config},
	dice::{self, roller::OsRandom, RandomBuffer, Roller},
	stats::{Averages, Report},
	weapon, Stats,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Simulates attacks with the weapons described in a simulation file and reports their average damage.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
	/// Simulation file (JSON) describing the weapons to compare
	file: PathBuf,

	/// Number of attacks to simulate per weapon, overriding the file
	#[arg(short = 'n', long)]
	iterations: Option<u64>,

	/// Seed for a reproducible (non-cryptographic) run, overriding the file
	#[arg(long)]
	seed: Option<u64>,

	/// Print the report as JSON instead of tables
	#[arg(long)]
	json: bool,
}

#[derive(thiserror::Error, Debug)]
enum Error {
	#[error(transparent)]
	Config(#[from] config::Error),

	#[error("simulation failed: {0}")]
	Dice(#[from] dice::Error),

	#[error("unable to write the report: {0}")]
	Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(io::stderr)
		.init();

	let args = Args::parse();
	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			match invalid_expression(&err) {
				Some((expr, reason, span)) => print_expression_error(expr, reason, span),
				None => eprintln!("Error: {err}"),
			}
			ExitCode::FAILURE
		}
	}
}

fn run(args: &Args) -> Result<(), Error> {
	let config = Config::load(&args.file)?;
	let mut stats = config.stats()?;
	let iterations = args.iterations.unwrap_or_else(|| config.iterations());

	let report = match args.seed.or(config.seed) {
		Some(seed) => simulate(&mut stats, &mut RandomBuffer::with_seed(seed), iterations)?,
		None => simulate(&mut stats, &mut RandomBuffer::<OsRandom>::os(), iterations)?,
	};

	if args.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		print_report(&stats, &report);
	}
	Ok(())
}

fn simulate<R: Roller>(stats: &mut Stats, roller: &mut R, iterations: u64) -> Result<Report, dice::Error> {
	stats.run(roller, iterations)?.report(roller)
}

fn print_report(stats: &Stats, report: &Report) {
	println!("ITERATIONS {}", report.iterations);
	println!("WEAPONS");

	for (name, results) in &report.weapons {
		if let Some(weapon) = stats.weapon(name) {
			println!("{weapon}");
		}

		println!("\nRESULTS MAX");
		print_averages(&results.max);
		println!("\nRESULTS AVG CRITS");
		print_averages(&results.crit_avg);
		println!("\nRESULTS AVG");
		print_averages(&results.avg);
		println!("{:<32}{:>10.2} %", "Crit Percent", results.crit_rate_percent);
		println!("=========================================================\n");
	}
}

fn print_averages(averages: &Averages) {
	for (kind, average) in averages {
		println!("{kind:<32}{average:>10.2}");
	}
}

/// Digs a dice expression error with its span out of the wrappers it may have propagated through.
fn invalid_expression(err: &Error) -> Option<(&str, &str, &Range<usize>)> {
	let dice_err = match err {
		Error::Dice(err)
		| Error::Config(config::Error::Weapon(
			weapon::Error::Damage(err) | weapon::Error::Bonus(bonus::Error::Expression(err)),
		)) => err,
		_ => return None,
	};

	match dice_err {
		dice::Error::InvalidExpression { expr, reason, span } => Some((expr, reason, span)),
		_ => None,
	}
}

fn print_expression_error(expr: &str, reason: &str, span: &Range<usize>) {
	// Spans are byte offsets into the expression text
	let printed = Diagnostic::build(ReportKind::Error, ("expression", span.clone()))
		.with_config(DiagnosticConfig::default().with_index_type(IndexType::Byte))
		.with_message("invalid dice expression")
		.with_label(Label::new(("expression", span.clone())).with_message(reason))
		.finish()
		.eprint(("expression", Source::from(expr)));

	if printed.is_err() {
		eprintln!("Error: invalid dice expression \"{expr}\": {reason}");
	}
}
