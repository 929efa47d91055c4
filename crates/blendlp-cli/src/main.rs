mod blend;
mod error;
mod model_file;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blendlp_solver::{PivotRule, Problem, SolutionStatus, Solver, SolverOptions};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::blend::BlendRecipe;
use crate::error::{CliError, read_json};
use crate::model_file::ModelFile;
use crate::report::ReportKind;

#[derive(Parser)]
#[command(name = "blendlp")]
#[command(about = "Least-cost blending and linear programming solver", long_about = None)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a JSON linear programming model
    Solve {
        /// The model file
        file: PathBuf,
        #[command(flatten)]
        args: SolveArgs,
    },
    /// Solve a JSON blend recipe for the least-cost mix
    Blend {
        /// The recipe file
        file: PathBuf,
        #[command(flatten)]
        args: SolveArgs,
    },
    /// Check a model or recipe file for errors
    Check {
        /// The file to check
        file: PathBuf,
        /// Treat the file as a blend recipe
        #[arg(long)]
        blend: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct SolveArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
    /// Show shadow prices and reduced costs
    #[arg(short, long)]
    analysis: bool,
    /// JSON file with solver options
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum simplex pivots
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Tolerance for floating point comparisons
    #[arg(long)]
    tolerance: Option<f64>,
    #[arg(long, value_enum)]
    pivot_rule: Option<PivotRuleArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum PivotRuleArg {
    Dantzig,
    Bland,
    Hybrid,
}

impl From<PivotRuleArg> for PivotRule {
    fn from(arg: PivotRuleArg) -> Self {
        match arg {
            PivotRuleArg::Dantzig => PivotRule::Dantzig,
            PivotRuleArg::Bland => PivotRule::Bland,
            PivotRuleArg::Hybrid => PivotRule::Hybrid,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Solve { file, args } => {
            let model: ModelFile = read_json(&file)?;
            let problem = model.to_problem()?;
            solve_and_report(&problem, &args, ReportKind::Model)
        }
        Commands::Blend { file, args } => {
            let recipe: BlendRecipe = read_json(&file)?;
            let problem = recipe.to_problem()?;
            solve_and_report(&problem, &args, ReportKind::Blend)
        }
        Commands::Check { file, blend } => {
            let problem = load_problem(&file, blend)?;
            println!("✓ {} is valid", file.display());
            println!("  {} variables", problem.num_variables());
            println!("  {} constraints", problem.num_constraints());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_problem(file: &Path, blend: bool) -> Result<Problem, CliError> {
    if blend {
        read_json::<BlendRecipe>(file)?.to_problem()
    } else {
        Ok(read_json::<ModelFile>(file)?.to_problem()?)
    }
}

fn solve_and_report(problem: &Problem, args: &SolveArgs, kind: ReportKind) -> Result<ExitCode, CliError> {
    let options = solver_options(args)?;
    tracing::debug!(?options, "Resolved solver options");

    let solution = Solver::with_options(options).solve(problem);

    match args.format {
        OutputFormat::Pretty => print!("{}", report::render_pretty(problem, &solution, kind, args.analysis)?),
        OutputFormat::Json => {
            let json = report::render_json(problem, &solution).map_err(|source| CliError::Json {
                path: "<stdout>".to_string(),
                source,
            })?;
            println!("{}", json);
        }
    }

    Ok(exit_code(solution.status()))
}

/// Options file first, then command-line overrides
fn solver_options(args: &SolveArgs) -> Result<SolverOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => read_json::<SolverOptions>(path)?,
        None => SolverOptions::default(),
    };

    if let Some(max) = args.max_iterations {
        options.max_iterations = Some(max);
    }
    if let Some(tol) = args.tolerance {
        options.tolerance = tol;
    }
    if let Some(rule) = args.pivot_rule {
        options.pivot_rule = rule.into();
    }

    if !(options.tolerance.is_finite() && options.tolerance > 0.0) {
        return Err(CliError::Options(format!(
            "tolerance must be a positive number, got {}",
            options.tolerance
        )));
    }
    Ok(options)
}

fn exit_code(status: SolutionStatus) -> ExitCode {
    if status.is_optimal() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parses_blend_command() {
        let cli = Cli::try_parse_from([
            "blendlp",
            "-v",
            "blend",
            "recipe.json",
            "--format",
            "json",
            "--pivot-rule",
            "bland",
            "--max-iterations",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Blend { file, args } => {
                assert_eq!(file, PathBuf::from("recipe.json"));
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.pivot_rule, Some(PivotRuleArg::Bland));
                assert_eq!(args.max_iterations, Some(10));
            }
            _ => panic!("expected blend command"),
        }
    }

    #[test]
    fn test_options_file_with_overrides() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, r#"{{ "max_iterations": 50, "pivot_rule": "dantzig" }}"#).unwrap();

        let args = SolveArgs {
            config: Some(config.path().to_path_buf()),
            tolerance: Some(1e-7),
            ..SolveArgs::default()
        };
        let options = solver_options(&args).unwrap();

        assert_eq!(options.max_iterations, Some(50));
        assert_eq!(options.pivot_rule, PivotRule::Dantzig);
        assert_eq!(options.tolerance, 1e-7);
    }

    #[test]
    fn test_rejects_non_positive_tolerance() {
        let args = SolveArgs {
            tolerance: Some(0.0),
            ..SolveArgs::default()
        };
        assert!(matches!(solver_options(&args), Err(CliError::Options(_))));
    }

    #[test]
    fn test_load_model_and_recipe_files() {
        let model = load_problem(Path::new("../../demos/model.json"), false).unwrap();
        let recipe = load_problem(Path::new("../../demos/blending.json"), true).unwrap();

        assert_eq!(model.num_variables(), recipe.num_variables());
        assert_eq!(model.num_constraints(), recipe.num_constraints());

        let a = Solver::new().solve(&model).objective_value().unwrap();
        let b = Solver::new().solve(&recipe).objective_value().unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_problem(Path::new("does/not/exist.json"), false).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(SolutionStatus::Optimal), ExitCode::SUCCESS);
        assert_eq!(exit_code(SolutionStatus::Infeasible), ExitCode::FAILURE);
    }
}
