use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use wayfinder_api::{DiffRequest, WayfinderApi};
use wayfinder_core::{DecisionEvaluation, SelectorConfig, DEFAULT_BASE_PATH};

const CLI_CONTRACT_VERSION: &str = "cli.v1";

#[derive(Debug, Parser)]
#[command(name = "wf")]
#[command(about = "Wayfinder content-intelligence CLI")]
struct Cli {
    #[arg(long, default_value = "./content/catalog.json")]
    catalog: PathBuf,

    #[arg(long, default_value = DEFAULT_BASE_PATH)]
    base_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Related-link descriptors for a topic page
    Related(RelatedArgs),
    /// Every eligible candidate with its score, before the link cap
    Rank(TopicArgs),
    /// Score breakdown for one source/candidate pair
    Score(ScoreArgs),
    Tags(TopicArgs),
    /// Meaningful differences between two decision evaluations
    Diff(DiffArgs),
    Posts(TopicArgs),
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    Validate,
}

#[derive(Debug, Args)]
struct TopicArgs {
    #[arg(long)]
    topic: String,
}

#[derive(Debug, Args)]
struct RelatedArgs {
    #[arg(long)]
    topic: String,
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
struct ScoreArgs {
    #[arg(long)]
    source: String,
    #[arg(long)]
    candidate: String,
}

#[derive(Debug, Args)]
struct DiffArgs {
    #[arg(long)]
    a: PathBuf,
    #[arg(long)]
    b: PathBuf,
    #[arg(long)]
    topic_a: String,
    #[arg(long)]
    topic_b: String,
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            Value::Object(object)
        }
        other => serde_json::json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let value = serde_json::to_value(value).context("failed to serialize response")?;
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value))?);
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = SelectorConfig { base_path: cli.base_path.clone(), ..SelectorConfig::default() };
    let api = WayfinderApi::from_path(&cli.catalog)?.with_selector_config(config);

    match cli.command {
        Command::Related(args) => emit_json(&api.related(&args.topic, args.limit)),
        Command::Rank(args) => emit_json(&api.ranked(&args.topic)),
        Command::Score(args) => emit_json(&api.explain_score(&args.source, &args.candidate)?),
        Command::Tags(args) => emit_json(&api.tags(&args.topic)?),
        Command::Diff(args) => run_diff(&api, args),
        Command::Posts(args) => emit_json(&api.posts_for_topic(&args.topic)),
        Command::Catalog { command } => run_catalog(&api, &command),
    }
}

fn run_diff(api: &WayfinderApi, args: DiffArgs) -> Result<()> {
    let request = DiffRequest {
        evaluation_a: read_evaluation(&args.a)?,
        evaluation_b: read_evaluation(&args.b)?,
        topic_a: args.topic_a,
        topic_b: args.topic_b,
    };
    emit_json(&api.diff(&request)?)
}

fn run_catalog(api: &WayfinderApi, command: &CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::Validate => {
            let response = api.validate_catalog();
            emit_json(&response)?;
            if !response.catalog.accepted {
                return Err(anyhow!("catalog validation failed"));
            }
            Ok(())
        }
    }
}

fn read_evaluation(path: &Path) -> Result<DecisionEvaluation> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("failed to read evaluation {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| {
        format!("{} is neither a decision output nor a refusal", path.display())
    })
}
