//! CLI interface for anemia-predictor

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, Overrides};
use crate::model::ModelArtifacts;
use crate::prediction::{Diagnosis, Gender, Prediction, PredictionForm, PredictionInput, Predictor};
use crate::store::{self, RecordStore};

#[derive(Parser)]
#[command(name = "anemia-predictor")]
#[command(about = "Anemia prediction web service backed by a pre-trained logistic regression model", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (default: platform config directory)
    #[arg(short, long, global = true, env = "ANEMIA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default when no command given)
    Serve {
        /// Host to bind to
        #[arg(long, env = "ANEMIA_HOST")]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long, env = "ANEMIA_PORT")]
        port: Option<u16>,
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Create the database and prediction table if missing
    InitDb {
        /// Path to the SQLite database file
        #[arg(long, env = "ANEMIA_DATABASE")]
        database: Option<PathBuf>,
    },
    /// Run a single prediction from the command line
    Predict {
        /// Gender ("Male" encodes as 0, anything else as 1)
        #[arg(long)]
        gender: String,
        /// Hemoglobin (g/dL)
        #[arg(long)]
        hemoglobin: f64,
        /// Mean corpuscular hemoglobin (pg)
        #[arg(long)]
        mch: f64,
        /// Mean corpuscular hemoglobin concentration (g/dL)
        #[arg(long)]
        mchc: f64,
        /// Mean corpuscular volume (fL)
        #[arg(long)]
        mcv: f64,
        /// Persist the prediction to the record store
        #[arg(long)]
        save: bool,
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Show recent prediction records
    Records {
        /// Maximum records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Path to the SQLite database file
        #[arg(long, env = "ANEMIA_DATABASE")]
        database: Option<PathBuf>,
    },
    /// Show or initialize configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct PathArgs {
    /// Path to the SQLite database file
    #[arg(long, env = "ANEMIA_DATABASE")]
    database: Option<PathBuf>,
    /// Path to the scaler artifact
    #[arg(long, env = "ANEMIA_SCALER")]
    scaler: Option<PathBuf>,
    /// Path to the classifier artifact
    #[arg(long, env = "ANEMIA_MODEL")]
    model: Option<PathBuf>,
}

impl PathArgs {
    fn overrides(self) -> Overrides {
        Overrides {
            database_path: self.database,
            scaler_path: self.scaler,
            model_path: self.model,
            ..Default::default()
        }
    }
}

/// Parse arguments and run the selected command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        None => crate::server::start(config).await,
        Some(Commands::Serve { host, port, paths }) => {
            config.apply(Overrides {
                host,
                port,
                ..paths.overrides()
            });
            crate::server::start(config).await
        }
        Some(Commands::InitDb { database }) => {
            config.apply(Overrides {
                database_path: database,
                ..Default::default()
            });
            let path = &config.storage.database_path;
            let outcome = store::bootstrap(path)?;
            println!("{}: {}", path.display(), outcome);
            Ok(())
        }
        Some(Commands::Predict { gender, hemoglobin, mch, mchc, mcv, save, paths }) => {
            config.apply(paths.overrides());
            let form = PredictionForm {
                gender: Some(gender),
                hemoglobin: Some(hemoglobin.to_string()),
                mch: Some(mch.to_string()),
                mchc: Some(mchc.to_string()),
                mcv: Some(mcv.to_string()),
            };
            let input = form.validate()?;
            predict_once(&config, &input, save).await
        }
        Some(Commands::Records { limit, database }) => {
            config.apply(Overrides {
                database_path: database,
                ..Default::default()
            });
            show_records(&config, limit).await
        }
        Some(Commands::Config { show, init }) => {
            if init {
                let path = match cli.config.as_deref() {
                    Some(path) => path.to_path_buf(),
                    None => crate::config::config_path()?,
                };
                Config::default().save(&path)?;
                println!("Wrote default configuration to {}", path.display());
            }
            if show || !init {
                print!("{}", config.to_toml()?);
            }
            Ok(())
        }
    }
}

async fn predict_once(config: &Config, input: &PredictionInput, save: bool) -> Result<()> {
    let artifacts = ModelArtifacts::load(&config.model.scaler_path, &config.model.model_path)
        .context("Failed to load model artifacts")?;

    if !save {
        let prediction = Prediction::compute(&artifacts, input);
        println!("{}", prediction.diagnosis.result_text());
        println!("Probability of anemia: {:.3}", prediction.probability);
        return Ok(());
    }

    let store = RecordStore::open(&config.storage.database_path)?;
    let predictor = Predictor::new(artifacts, store);

    let outcome = predictor.predict_and_record(input).await?;
    println!("{}", outcome.prediction.diagnosis.result_text());
    println!("Probability of anemia: {:.3}", outcome.prediction.probability);
    println!("Saved as record {}", outcome.id);

    Ok(())
}

async fn show_records(config: &Config, limit: usize) -> Result<()> {
    let store = RecordStore::open(&config.storage.database_path)?;
    let stats = store.stats().await?;
    let records = store.recent(limit).await?;

    println!(
        "{} record(s), {} with anemia ({})",
        stats.total_records,
        stats.anemia_records,
        store.path().display()
    );

    if records.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:>6}  {:<12} {:>10} {:>7} {:>7} {:>7}  {}",
        "id", "gender", "hemoglobin", "mch", "mchc", "mcv", "result"
    );
    for record in records {
        let gender = Gender::from_code(record.gender).label();
        let result = Diagnosis::from_label(record.result);
        println!(
            "{:>6}  {:<12} {:>10.2} {:>7.2} {:>7.2} {:>7.2}  {}",
            record.id, gender, record.hemoglobin, record.mch, record.mchc, record.mcv, result
        );
    }

    Ok(())
}
