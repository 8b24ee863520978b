//! The command line interface for the simulation.
use crate::input::load_model;
use crate::input::scenario::read_scenarios;
use crate::log;
use crate::model::Model;
use crate::output::metadata::write_metadata;
use crate::output::{DataWriter, create_output_directory, get_output_dir, write_sensitivity};
use crate::scenario::{ScenarioDefinition, run_scenarios};
use crate::sensitivity::{
    SensitivityCase, SensitivityParameter, calculate_statistics, default_sweep, run_sensitivity,
};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options shared by commands which write output files
#[derive(Args, Default)]
pub struct OutputOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Output options
    #[command(flatten)]
    pub output: OutputOpts,
    /// Only run the named scenario (may be given more than once)
    #[arg(long = "scenario")]
    pub scenarios: Vec<String>,
    /// Seed the capacity factor noise from entropy instead of the model's seed
    #[arg(long)]
    pub random_seed: bool,
}

/// Options for the sensitivity command
#[derive(Args, Default)]
pub struct SensitivityOpts {
    /// Output options
    #[command(flatten)]
    pub output: OutputOpts,
    /// The parameter to vary (all default parameters are varied if omitted)
    #[arg(long, requires = "values")]
    pub parameter: Option<String>,
    /// Comma-separated values for the parameter
    #[arg(long, value_delimiter = ',', requires = "parameter")]
    pub values: Vec<f64>,
    /// The year to report results for (defaults to the last simulated year)
    #[arg(long)]
    pub target_year: Option<u32>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the scenarios for a model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Run a sensitivity analysis for a model.
    Sensitivity {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other sensitivity options
        #[command(flatten)]
        opts: SensitivityOpts,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Manage example models.
    Example {
        /// The available subcommands for managing example models.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Sensitivity { model_dir, opts } => {
                handle_sensitivity_command(&model_dir, &opts, None)
            }
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ bdenergy --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Create the output folder and start logging to it.
///
/// Returns the path to the output folder.
fn prepare_output(model_path: &Path, opts: &OutputOpts, settings: &Settings) -> Result<PathBuf> {
    let output_path = match &opts.output_dir {
        Some(path) => path.clone(),
        None => get_output_dir(model_path)?,
    };

    let overwrite = create_output_directory(&output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    log::init(&settings.log_level, Some(&output_path)).context("Failed to initialise logging.")?;

    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder was overwritten");
    }

    Ok(output_path)
}

/// Keep only the named scenarios, in the order given
fn select_scenarios(
    scenarios: Vec<ScenarioDefinition>,
    names: &[String],
) -> Result<Vec<ScenarioDefinition>> {
    if names.is_empty() {
        return Ok(scenarios);
    }

    names
        .iter()
        .map(|name| {
            scenarios
                .iter()
                .find(|scenario| &*scenario.id.0 == name.as_str())
                .cloned()
                .with_context(|| {
                    format!(
                        "Unknown scenario {name}. Available scenarios are: {}",
                        scenarios.iter().map(|scenario| &scenario.id).join(", ")
                    )
                })
        })
        .collect()
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    let output_path = prepare_output(model_path, &opts.output, &settings)?;

    let mut model = load_model(model_path).context("Failed to load model.")?;
    let scenarios = read_scenarios(model_path).context("Failed to load scenarios.")?;
    let scenarios = select_scenarios(scenarios, &opts.scenarios)?;

    if opts.random_seed {
        model.parameters.seed = rand::random();
        warn!(
            "Using random seed {}; results will not be reproducible",
            model.parameters.seed
        );
        for scenario in &scenarios {
            if let Some(seed) = scenario.seed {
                warn!(
                    "Scenario {} sets its own seed ({seed}), which is used instead",
                    scenario.id
                );
            }
        }
    }

    let results = run_scenarios(&model, &scenarios)?;
    let mut writer = DataWriter::create(&output_path)?;
    for result in &results {
        writer.write_scenario(result)?;
    }
    writer.flush()?;
    write_metadata(
        &output_path,
        model_path,
        "scenarios",
        model.parameters.seed,
        &results,
    )?;

    info!("Simulation complete!");

    Ok(())
}

/// The parameters to vary and the values to try
fn sensitivity_cases(opts: &SensitivityOpts) -> Result<Vec<SensitivityCase>> {
    let Some(name) = &opts.parameter else {
        return Ok(default_sweep());
    };

    let parameter = SensitivityParameter::from_name(name)?;
    ensure!(!opts.values.is_empty(), "No values given for {parameter}");

    Ok(vec![SensitivityCase {
        parameter,
        values: opts.values.clone(),
    }])
}

/// Handle the `sensitivity` command.
pub fn handle_sensitivity_command(
    model_path: &Path,
    opts: &SensitivityOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let cases = sensitivity_cases(opts)?;
    let settings = load_settings(settings)?;
    let output_path = prepare_output(model_path, &opts.output, &settings)?;

    let model = load_model(model_path).context("Failed to load model.")?;
    let target_year = opts.target_year.unwrap_or(model.parameters.end_year);

    let rows = run_sensitivity(&model, &cases, target_year)?;
    let statistics = calculate_statistics(&rows);
    write_sensitivity(&output_path, &rows, &statistics)?;
    write_metadata(
        &output_path,
        model_path,
        "sensitivity",
        model.parameters.seed,
        &[],
    )?;

    info!("Sensitivity analysis complete!");

    Ok(())
}

/// Load a model and its scenarios, checking that every scenario can be applied
fn validate_model(model_path: &Path) -> Result<Model> {
    let model = load_model(model_path)?;
    for scenario in read_scenarios(model_path)? {
        scenario.apply(&model)?;
    }

    Ok(model)
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // We won't save log files when running the validate command
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    validate_model(model_path).context("Failed to validate model.")?;
    info!("Model validation successful!");

    Ok(())
}
