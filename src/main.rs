//! Football score prediction CLI
//!
//! Builds features from league history, trains a small neural network by
//! backpropagation, and predicts final scores.

use clap::{Parser, Subcommand};
use betbot::{Config, Result};

#[derive(Parser)]
#[command(name = "betbot")]
#[command(about = "Football score prediction with a hand-rolled neural network", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Build the training CSV from match history
    Features {
        /// Match history file (JSON), defaults to the configured path
        #[arg(long)]
        matches: Option<String>,
        /// Output CSV, defaults to the configured path
        #[arg(long)]
        output: Option<String>,
    },
    /// Train the network on the training CSV
    Train {
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Override learning rate
        #[arg(long)]
        lr: Option<f64>,
        /// Continue from saved weights
        #[arg(long)]
        resume: bool,
    },
    /// Report error and score accuracy of the saved weights over the whole CSV
    Evaluate,
    /// Show the league table of a season
    Table {
        season: u32,
        /// Table after this matchday, defaults to the last one
        #[arg(long)]
        matchday: Option<u32>,
    },
    /// Predict the final score of a fixture
    Predict {
        /// Home team id
        home: i64,
        /// Away team id
        away: i64,
        #[arg(long)]
        season: u32,
        #[arg(long)]
        matchday: u32,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Features { matches, output } => commands::features(&config, matches, output),
        Commands::Train { epochs, lr, resume } => commands::train(&config, epochs, lr, resume),
        Commands::Evaluate => commands::evaluate(&config),
        Commands::Table { season, matchday } => commands::table(&config, season, matchday),
        Commands::Predict {
            home,
            away,
            season,
            matchday,
            format,
        } => commands::predict(&config, home, away, season, matchday, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use betbot::data::{load_matches, load_training_csv, season_matches, seasons, write_training_csv};
    use betbot::features::{calculate_tables, generate_training_data, standings, OutputVector};
    use betbot::model::Network;
    use betbot::predict::Predictor;
    use betbot::training::format_error;
    use betbot::{BetbotError, TeamId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_rng(config: &Config) -> StdRng {
        match config.training.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Network with the configured topology and saved weights
    fn load_trained(config: &Config) -> Result<Network> {
        let path = &config.data.weights_path;
        if !std::path::Path::new(path).exists() {
            return Err(BetbotError::NoModel(path.clone()));
        }
        let mut network = Network::new(&config.model.layers, None)?;
        network.load_weights(path)?;
        Ok(network)
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Put match history in {}", config.data.matches_path);
        println!("  3. Run 'betbot features' then 'betbot train'");

        Ok(())
    }

    pub fn features(config: &Config, matches: Option<String>, output: Option<String>) -> Result<()> {
        let matches_path = matches.unwrap_or_else(|| config.data.matches_path.clone());
        let output_path = output.unwrap_or_else(|| config.data.training_csv.clone());

        let records = load_matches(&matches_path)?;
        let examples = generate_training_data(&records, config.training.history_window);
        write_training_csv(&output_path, &examples)?;

        println!(
            "Wrote {} examples from {} matches to {}",
            examples.len(),
            records.len(),
            output_path
        );
        Ok(())
    }

    pub fn train(config: &Config, epochs: Option<usize>, lr: Option<f64>, resume: bool) -> Result<()> {
        let epochs = epochs.unwrap_or(config.training.epochs);
        let learning_rate = lr.unwrap_or(config.training.learning_rate);
        let mut rng = make_rng(config);

        let examples = load_training_csv(&config.data.training_csv, OutputVector::DIM)?;
        if examples.is_empty() {
            return Err(BetbotError::Parse(format!(
                "No training examples in {}",
                config.data.training_csv
            )));
        }

        let init = config.model.weight_init();
        let mut network = if resume {
            Network::load_or_random(&config.model.layers, init, &config.data.weights_path, &mut rng)?
        } else {
            Network::random(&config.model.layers, init, &mut rng)?
        };

        println!("Training on {} examples", examples.len());
        println!("  Epochs:        {}", epochs);
        println!("  Learning rate: {}", learning_rate);
        println!("  Parameters:    {}", network.weights().parameter_count());

        let run = network.train_with_rng(&examples, learning_rate, epochs, &mut rng)?;
        let test_metrics = network.score_metrics(&run.split.test)?;

        println!("\nSaving weights to {}...", config.data.weights_path);
        network.save_model(&config.data.weights_path)?;

        println!("\nTraining complete!");
        println!(
            "  Split:          {} train / {} validation / {} test",
            run.split.train.len(),
            run.split.validation.len(),
            run.split.test.len()
        );
        match (run.history.best_epoch, run.history.best_val_error) {
            (Some(epoch), Some(error)) => {
                println!("  Best epoch:     {}", epoch + 1);
                println!("  Best val error: {:.4}", error);
            }
            _ => println!("  Best val error: undefined"),
        }
        println!("  Test error:     {}", format_error(run.history.test_error));
        println!("  Test scores:    {}", test_metrics);

        Ok(())
    }

    pub fn evaluate(config: &Config) -> Result<()> {
        let network = load_trained(config)?;
        let examples = load_training_csv(&config.data.training_csv, OutputVector::DIM)?;

        let error = network.mean_error(&examples)?;
        let metrics = network.score_metrics(&examples)?;

        println!("Evaluation over {}", config.data.training_csv);
        println!("───────────────────────────────");
        println!("  Mean error: {}", format_error(error));
        println!("  Scores:     {}", metrics);

        Ok(())
    }

    pub fn table(config: &Config, season: u32, matchday: Option<u32>) -> Result<()> {
        let records = load_matches(&config.data.matches_path)?;
        let tables = calculate_tables(&season_matches(&records, season));

        let found = match matchday {
            Some(md) => tables.range(..=md).next_back(),
            None => tables.iter().next_back(),
        };
        let (matchday, table) = match found {
            Some(found) => found,
            None => {
                println!("No matches for season {}", season);
                let available: Vec<String> = seasons(&records).iter().map(|s| s.to_string()).collect();
                if !available.is_empty() {
                    println!("Available seasons: {}", available.join(", "));
                }
                return Ok(());
            }
        };

        println!("Season {} after matchday {}", season, matchday);
        println!("{:>3}  {:<10} {:>3} {:>4} {:>4} {:>4} {:>4}", "#", "Team", "P", "GF", "GA", "GD", "Pts");
        for (rank, entry) in standings(table).iter().enumerate() {
            println!(
                "{:>3}  {:<10} {:>3} {:>4} {:>4} {:>4} {:>4}",
                rank + 1,
                entry.team.to_string(),
                entry.played,
                entry.stats.goals_for,
                entry.stats.goals_against,
                entry.stats.goal_difference(),
                entry.stats.points
            );
        }

        Ok(())
    }

    pub fn predict(
        config: &Config,
        home: i64,
        away: i64,
        season: u32,
        matchday: u32,
        format: OutputFormat,
    ) -> Result<()> {
        let network = load_trained(config)?;
        let records = load_matches(&config.data.matches_path)?;
        let predictor = Predictor::from_matches(network, &records, config.training.history_window)?;

        let prediction = predictor.predict(TeamId(home), TeamId(away), season, matchday)?;

        match format {
            OutputFormat::Table => {
                println!("{} vs {}", prediction.home_team, prediction.away_team);
                println!("───────────────────────────────");
                println!("  Season {}, matchday {}", season, matchday);
                println!(
                    "  Expected goals: {:.2} - {:.2}",
                    prediction.home_expected, prediction.away_expected
                );
                println!("  Predicted score: {}", prediction.score);
                println!("  Tendency:        {}", prediction.score.outcome());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            }
        }

        Ok(())
    }
}
