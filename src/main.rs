//! Wall ML Prediction - command line entry point
//!
//! Predicts wall building responses for a single feature vector or for every
//! row of a CSV table.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wall_ml_prediction::{
    config::{AppConfig, LoggingConfig},
    dataset, FeatureVector, ModelKind, OutputVariable, Predictor,
};

#[derive(Parser)]
#[command(name = "wall-ml-predict", version, about = "Predict PFA_max and rDR_max of structural wall buildings")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the exported models and scalers
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Output variable to predict (repeatable): PFA_max, rDR_max
    #[arg(short = 'v', long = "variable", global = true)]
    variables: Vec<OutputVariable>,

    /// Model to predict with (repeatable): RF, ANN
    #[arg(short = 'm', long = "model", global = true)]
    models: Vec<ModelKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict a single feature vector
    Individual(FeatureArgs),
    /// Predict every row of a CSV file with columns WI,T1,H_Tcr,Ar,ALR_G,AI,Sa,Sv
    Batch {
        /// Input CSV file
        #[arg(long)]
        input: PathBuf,
        /// Output CSV file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FeatureArgs {
    /// Wall index
    #[arg(long)]
    wi: f64,
    /// Fundamental period
    #[arg(long)]
    t1: f64,
    /// Stiffness index
    #[arg(long)]
    h_tcr: f64,
    /// Mean wall aspect ratio
    #[arg(long)]
    ar: f64,
    /// Average axial load ratio for gravity loads
    #[arg(long)]
    alr_g: f64,
    /// Arias intensity
    #[arg(long)]
    ai: f64,
    /// Spectral acceleration
    #[arg(long)]
    sa: f64,
    /// Spectral velocity
    #[arg(long)]
    sv: f64,
}

impl From<&FeatureArgs> for FeatureVector {
    fn from(args: &FeatureArgs) -> Self {
        FeatureVector::new(
            args.wi, args.t1, args.h_tcr, args.ar, args.alr_g, args.ai, args.sa, args.sv,
        )
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path, true)?,
        None => AppConfig::load()?,
    };
    if let Some(models_dir) = cli.models_dir {
        config.artifacts.models_dir = models_dir;
    }

    init_logging(&config.logging)?;

    let variables = if cli.variables.is_empty() {
        config.prediction.variables.clone()
    } else {
        cli.variables
    };
    let models = if cli.models.is_empty() {
        config.prediction.models.clone()
    } else {
        cli.models
    };

    info!(
        models_dir = %config.artifacts.models_dir.display(),
        variables = ?variables,
        models = ?models,
        "Starting wall response prediction"
    );

    let predictor = Predictor::from_config(&config);

    match cli.command {
        Command::Individual(args) => {
            let features = FeatureVector::from(&args);
            let prediction = predictor.predict_individual(&features, &variables, &models)?;
            print!("{prediction}");
        }
        Command::Batch { input, output } => {
            let table = dataset::read_feature_table(&input)?;
            let prediction = predictor.predict_batch(&table, &variables, &models)?;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    dataset::write_predictions(file, &prediction)?;
                    info!(rows = prediction.n_rows(), path = %path.display(), "Predictions written");
                }
                None => dataset::write_predictions(std::io::stdout().lock(), &prediction)?,
            }
        }
    }

    Ok(())
}
