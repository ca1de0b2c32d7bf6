//! Story starter generator CLI.
//!
//! Reads `spark.toml` (or `--config`), validates the selection given on the
//! command line, and prints generated starters. Failures map onto the stable
//! codes in [`spark::exit_codes`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use spark::action::{ActionError, run_action};
use spark::core::export::{EXPORT_FILE_NAME, export_markdown};
use spark::core::selection::{RawSelection, Selection, SelectionOptions};
use spark::core::types::{GenerationResult, GenerationStrategy, StoryStarter};
use spark::exit_codes;
use spark::flow::StoryStarterFlow;
use spark::io::config::{DEFAULT_CONFIG_PATH, SparkConfig, load_config, write_config};
use spark::io::generator::GeminiGenerator;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "spark",
    version,
    about = "Generate story starters from a mood, genre, archetype and setting"
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// List the available moods, genres, archetypes and settings.
    Options {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Generate story starters.
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    #[arg(long)]
    mood: String,

    #[arg(long)]
    genre: String,

    /// Character archetype, e.g. "reluctant hero".
    #[arg(long)]
    archetype: String,

    #[arg(long)]
    setting: String,

    /// Number of starters (1-5). Defaults to the configured value.
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// Override the configured generation strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Also write the starters as markdown to this path.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Batched,
    PerStarter,
}

impl From<StrategyArg> for GenerationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Batched => GenerationStrategy::Batched,
            StrategyArg::PerStarter => GenerationStrategy::PerStarter,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    spark::logging::init();
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Options { json } => cmd_options(&cli.config, json),
        Command::Generate(args) => cmd_generate(&cli.config, args).await,
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &SparkConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_options(config_path: &Path, json: bool) -> Result<i32> {
    let options = selection_options(&load_config(config_path)?);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&options).context("serialize options")?
        );
        return Ok(exit_codes::OK);
    }
    println!("moods:      {}", options.moods.join(", "));
    println!("genres:     {}", options.genres.join(", "));
    println!("archetypes: {}", options.character_archetypes.join(", "));
    println!("settings:   {}", options.settings.join(", "));
    println!(
        "starters:   {}-{} (default {})",
        options.min_starters, options.max_starters, options.default_starters
    );
    Ok(exit_codes::OK)
}

/// Options as this configuration will apply them.
fn selection_options(config: &SparkConfig) -> SelectionOptions {
    SelectionOptions::with_default(config.default_count().unwrap_or_default())
}

async fn cmd_generate(config_path: &Path, args: GenerateArgs) -> Result<i32> {
    let config = load_config(config_path)?;
    let strategy = args.strategy.map(Into::into).unwrap_or(config.strategy);
    let raw = RawSelection {
        mood: args.mood,
        genre: args.genre,
        character_archetype: args.archetype,
        setting: args.setting,
        number_of_starters: Some(
            args.count
                .unwrap_or(i64::from(config.number_of_starters_default)),
        ),
    };

    // Reject bad input before touching the backend, so a missing API key
    // never masks it.
    let outcome = match Selection::parse(&raw) {
        Err(reason) => {
            debug!(%reason, "rejected selection");
            Err(ActionError::InvalidInput)
        }
        Ok(_) => {
            let generator = GeminiGenerator::from_env(&config.model)?;
            let flow = StoryStarterFlow::new(strategy)?;
            info!(?strategy, model = %config.model.model, "generating story starters");
            run_action(&generator, &flow, &raw).await
        }
    };
    let code = match &outcome {
        Ok(_) => exit_codes::OK,
        Err(err) => err.exit_code(),
    };

    if let (Ok(stories), Some(path)) = (&outcome, &args.export) {
        write_export(path, stories)?;
    }

    let result = GenerationResult::from(outcome);
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("serialize result")?
        );
    } else {
        print_result(&result);
    }
    Ok(code)
}

fn print_result(result: &GenerationResult) {
    if let Some(error) = &result.error {
        eprintln!("{error}");
    }
    for (index, starter) in result.stories.iter().flatten().enumerate() {
        if index > 0 {
            println!();
        }
        println!("Story #{}: {}", index + 1, starter.title);
        println!("{}", starter.story);
    }
}

/// Write markdown to `path`; a directory path gets the default file name.
fn write_export(path: &Path, stories: &[StoryStarter]) -> Result<()> {
    let target = if path.is_dir() {
        path.join(EXPORT_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let mut body = export_markdown(stories);
    body.push('\n');
    fs::write(&target, body).with_context(|| format!("write {}", target.display()))?;
    info!(path = %target.display(), "exported markdown");
    Ok(())
}
