use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use surveyclean::{run_survey, ErrorStrategy, PipelineConfig, SurveyConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SummaryFormat {
    #[value(name = "text", help = "Aligned text table")]
    Text,
    #[value(name = "json", help = "JSON object")]
    Json,
}

#[derive(Parser)]
#[command(name = "surveyclean")]
#[command(about = "Clean a household survey extract: select, filter, impute and decode columns")]
#[command(version)]
struct Args {
    /// YAML configuration file (built-in survey defaults when omitted)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Raw input file (overrides paths.raw)
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Where to write the selected columns (overrides paths.selected)
    #[arg(long = "selected-output")]
    selected_output: Option<PathBuf>,

    /// Where to write the cleaned table (overrides paths.cleaned)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Minimum age to keep (inclusive)
    #[arg(long)]
    min_age: Option<f64>,

    /// Fail on first stage error instead of skipping the stage
    #[arg(long)]
    fail_fast: bool,

    /// Debug mode - show processing details
    #[arg(long)]
    debug: bool,

    /// Print the missing-value summary of the cleaned table to stdout
    #[arg(long, value_name = "FORMAT")]
    summary: Option<SummaryFormat>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    fn survey_config(&self) -> Result<SurveyConfig> {
        let mut config = match &self.config {
            Some(path) => SurveyConfig::from_path(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => SurveyConfig::default(),
        };
        if let Some(input) = &self.input {
            config.paths.raw = input.clone();
        }
        if let Some(selected) = &self.selected_output {
            config.paths.selected = selected.clone();
        }
        if let Some(output) = &self.output {
            config.paths.cleaned = output.clone();
        }
        if let Some(min_age) = self.min_age {
            config.min_age = min_age;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let survey = args.survey_config()?;

    if args.dump_config {
        print!("{}", survey.to_yaml()?);
        return Ok(());
    }

    let config = PipelineConfig {
        error_strategy: if args.fail_fast {
            ErrorStrategy::FailFast
        } else {
            ErrorStrategy::Skip
        },
        debug: args.debug,
    };

    let run = run_survey(&survey, &config).context("Cleaning failed")?;

    if let Some(format) = args.summary {
        match (format, &run.missing) {
            (SummaryFormat::Text, Some(missing)) => println!("{}", missing),
            (SummaryFormat::Json, Some(missing)) => {
                println!("{}", serde_json::to_string_pretty(missing)?)
            }
            (_, None) => eprintln!("No missing-value summary available"),
        }
    }

    if args.debug {
        eprintln!("Final statistics:");
        eprintln!("  Rows loaded: {}", run.rows_loaded);
        eprintln!("  Rows selected: {}", run.rows_selected);
        eprintln!("  Rows written: {}", run.rows_written);
        eprintln!("  Stage warnings: {}", run.summary.warnings);
        eprintln!("  Stage errors: {}", run.summary.errors);
        eprintln!("  Processing time: {:?}", run.summary.processing_time);
    }

    Ok(())
}
