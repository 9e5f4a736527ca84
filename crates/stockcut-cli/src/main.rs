use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use stockcut_core::{CutConfig, CutPlan, DemandMode, Pattern, PatternSet, Precision, SolutionStatus};
use tracing::Level;

#[derive(Parser)]
#[command(name = "stockcut")]
#[command(about = "Solve the one-dimensional cutting stock problem with the least waste", long_about = None)]
struct Cli {
    /// Log progress to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find how many rolls to cut with each pattern
    Solve {
        #[command(flatten)]
        input: InputArgs,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// List every pattern that fits in a roll
    Patterns {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON configuration file; flags given on the command line override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// The length of the roll. E.g. -r 12.0
    #[arg(short, long, allow_negative_numbers = true)]
    roll_length: Option<f64>,
    /// The lengths of the items. E.g. -l 3.4 3.0 2.7
    #[arg(short, long, num_args = 1.., allow_negative_numbers = true)]
    lengths: Option<Vec<f64>>,
    /// The quantities of the items. E.g. -q 34 13 5
    #[arg(short, long, num_args = 1.., allow_negative_numbers = true)]
    quantities: Option<Vec<f64>>,
    /// The solver to use: milp (alias glpk) or relaxed (alias ecos)
    #[arg(short, long)]
    solver: Option<String>,
    /// Allow producing more than demanded (>= instead of ==)
    #[arg(short, long)]
    ge_required: bool,
    /// Fail if enumeration finds more patterns than this
    #[arg(long)]
    max_patterns: Option<usize>,
}

impl InputArgs {
    /// Defaults, then the config file, then command line flags
    fn load(&self) -> Result<CutConfig, String> {
        let mut config = match &self.config {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .map_err(|e| format!("Error reading file {}: {}", path.display(), e))?;
                serde_json::from_str::<CutConfig>(&source)
                    .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
            }
            None => CutConfig::default(),
        };

        if let Some(roll_length) = self.roll_length {
            config.roll_length = roll_length;
        }
        if let Some(lengths) = &self.lengths {
            config.lengths = lengths.clone();
        }
        if let Some(quantities) = &self.quantities {
            config.quantities = quantities.clone();
        }
        if let Some(name) = &self.solver {
            config = config.with_solver_name(name).map_err(|e| e.to_string())?;
        }
        if self.ge_required {
            config.mode = DemandMode::from_ge_required(true);
        }
        if let Some(limit) = self.max_patterns {
            config.max_patterns = Some(limit);
        }

        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve { input, format } => {
            let config = input.load().unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let plan = match stockcut_core::solve(&config) {
                Ok(plan) => plan,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&plan) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_report(&config, &plan);
            }

            if !plan.status.has_point() {
                std::process::exit(1);
            }
        }
        Commands::Patterns { input } => {
            let config = input.load().unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let precision = Precision::resolve(&config.lengths, config.roll_length);
            let patterns = match PatternSet::enumerate_with_limit(
                &config.lengths,
                config.roll_length,
                precision,
                config.max_patterns,
            ) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            println!("Roll length = {}", config.roll_length);
            println!("Lengths = {:?}", config.lengths);
            println!("Derived max decimal places = {}", precision);
            println!("{} patterns:", patterns.len());
            for (i, pattern) in patterns.iter().enumerate() {
                println!("{}", pattern_line(i, pattern));
            }
        }
    }
}

fn pattern_line(index: usize, pattern: &Pattern) -> String {
    format!(
        "  {:5} {:?} pieces {} waste {}",
        index,
        pattern.counts,
        pattern.pieces(),
        pattern.waste
    )
}

fn print_report(config: &CutConfig, plan: &CutPlan) {
    println!("Input data:");
    println!("lengths = {:?}", config.lengths);
    println!("Quantities = {:?}", config.quantities);
    println!("Roll length = {}", config.roll_length);
    println!("Derived max decimal places = {}", plan.precision);
    println!(
        "Lower bound for number of rolls: {}, i.e. after rounding: {}",
        plan.lower_bound.raw, plan.lower_bound.rolls
    );
    println!("Patterns enumerated: {}", plan.patterns.len());
    println!();

    println!("Status: {}", plan.status);
    match plan.status {
        SolutionStatus::Optimal | SolutionStatus::Feasible => {
            if plan.status == SolutionStatus::Feasible {
                println!("(rounded from the relaxation, optimality not proven)");
            }
            if let Some(objective) = plan.objective {
                println!("Total waste: {}", objective);
            }
            if let Some(usage) = &plan.usage {
                println!("Usage: {:?}", usage);
            }
        }
        SolutionStatus::Infeasible => {
            println!("No combination of patterns meets the demand.");
            if plan.mode == DemandMode::Exact {
                println!("Try allowing over-production with -g.");
            }
        }
        SolutionStatus::Unbounded => {
            println!("The problem has no finite optimal solution.");
        }
        SolutionStatus::Unknown => {
            println!("Rounding the relaxation did not give a feasible plan.");
        }
        SolutionStatus::Error => {
            println!("Solver encountered an error.");
            if let Some(message) = &plan.message {
                println!("  {}", message);
            }
        }
    }

    if !plan.violations.is_empty() {
        println!();
        println!("Violated constraints:");
        for v in &plan.violations {
            println!("  - {}", v.description);
        }
    }

    let used = plan.used_patterns();
    if used.is_empty() {
        return;
    }

    println!();
    println!("============================");
    println!("========= PATTERNS =========");
    println!("============================");
    println!();
    if let Some(rolls) = plan.total_rolls() {
        println!("Total number of rolls used: {}", rolls);
        println!();
    }
    for u in &used {
        println!(
            "pattern {} used {} times, waste {}, total waste {}",
            u.index, u.times, u.waste, u.total_waste
        );
        println!("this pattern is:");
        for cut in &u.cuts {
            println!("\titem with length {} used {} times", cut.length, cut.count);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcut_core::SolverKind;

    fn input_of(args: &[&str]) -> InputArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Solve { input, .. } | Commands::Patterns { input } => input,
        }
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = input_of(&["stockcut", "solve"]).load().unwrap();
        assert_eq!(config, CutConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = input_of(&[
            "stockcut", "solve", "-r", "10", "-l", "2.5", "4", "-q", "3", "1", "-s", "ECOS", "-g",
        ])
        .load()
        .unwrap();

        assert_eq!(config.roll_length, 10.0);
        assert_eq!(config.lengths, vec![2.5, 4.0]);
        assert_eq!(config.quantities, vec![3.0, 1.0]);
        assert_eq!(config.solver, SolverKind::Relaxed);
        assert_eq!(config.mode, DemandMode::AtLeast);
    }

    #[test]
    fn test_unsupported_solver() {
        let err = input_of(&["stockcut", "solve", "-s", "cbc"]).load().unwrap_err();
        assert!(err.contains("Unsupported solver"));
    }

    #[test]
    fn test_mismatched_lengths_and_quantities() {
        let err = input_of(&["stockcut", "patterns", "-l", "3", "4", "-q", "1"])
            .load()
            .unwrap_err();
        assert!(err.contains("same number of lengths and quantities"));
    }

    #[test]
    fn test_pattern_line_lists_pieces() {
        let lengths = [3.4, 3.0, 2.7];
        let set = PatternSet::enumerate(&lengths, 12.0, Precision::resolve(&lengths, 12.0)).unwrap();
        let pattern = set.iter().find(|p| p.counts == vec![1, 0, 3]).unwrap();
        assert_eq!(pattern_line(20, pattern), "     20 [1, 0, 3] pieces 4 waste 0.5");
    }

    #[test]
    fn test_negative_roll_length_reaches_validation() {
        let err = input_of(&["stockcut", "solve", "-r", "-5"]).load().unwrap_err();
        assert!(err.contains("Roll length"));
    }
}
