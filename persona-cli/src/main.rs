//! PERSONA command-line entry point
//!
//! Reads survey files, runs the pipeline, and prints JSON to stdout. Logs go
//! to stderr so output can be piped.

mod commands;
mod error;
mod input;

use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use persona_compiler::RuleBook;
use persona_core::{DomainLexicon, PipelineConfig};
use persona_pipeline::PersonaPipeline;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "persona", version, about = "Compile workplace survey answers into behavioral specifications")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "PERSONA_JSON_LOGS")]
    json_logs: bool,

    /// Pipeline settings TOML. Falls back to PERSONA_* variables.
    #[arg(long, global = true, env = "PERSONA_CONFIG")]
    config: Option<PathBuf>,

    /// Domain table TOML replacing the built-in lexicon.
    #[arg(long, global = true)]
    domains: Option<PathBuf>,

    /// Rule table TOML replacing the built-in rules.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate one response file into a profile.
    Profile { responses: PathBuf },

    /// Compile one response file into a specification.
    Compile {
        responses: PathBuf,
        #[arg(long, default_value = "general")]
        domain: String,
        #[arg(long)]
        demographics: Option<PathBuf>,
        /// Print only the specification text.
        #[arg(long)]
        text: bool,
    },

    /// Discover archetypes in a population file.
    Cluster {
        population: PathBuf,
        #[arg(long, default_value = "general")]
        domain: String,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compare a respondent with self-assessment answers.
    Validate {
        responses: PathBuf,
        /// JSON object or `ID: score` lines.
        #[arg(long)]
        answers: PathBuf,
    },

    /// Compile a respondent and interview it through a chat-completions endpoint.
    Interview {
        responses: PathBuf,
        #[arg(long, default_value = "general")]
        domain: String,
        #[arg(long)]
        demographics: Option<PathBuf>,
        #[arg(long, env = "PERSONA_MODEL", default_value = "gpt-4o-mini")]
        model: String,
        #[arg(long, env = "PERSONA_API_BASE")]
        base_url: Option<String>,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,
        #[arg(long, default_value_t = 60)]
        requests_per_minute: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.json_logs) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(json: bool) -> CliResult<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("persona=info,warn"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| CliError::Logging(e.to_string()))
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Command::Cluster { seed: Some(seed), .. } = &cli.command {
        config.seed = Some(*seed);
    }
    let pipeline = build_pipeline(config, cli.domains.as_deref(), cli.rules.as_deref())?;

    let output = match &cli.command {
        Command::Profile { responses } => commands::profile(&pipeline, responses)?,
        Command::Compile {
            responses,
            domain,
            demographics,
            text,
        } => {
            let output = commands::compile(&pipeline, responses, domain, demographics.as_deref())?;
            if *text {
                let text = output["subject"]["specification"]["text"].as_str().unwrap_or_default();
                println!("{}", text);
                return Ok(());
            }
            output
        }
        Command::Cluster { population, domain, .. } => commands::cluster(&pipeline, population, domain)?,
        Command::Validate { responses, answers } => commands::validate(&pipeline, responses, answers)?,
        Command::Interview {
            responses,
            domain,
            demographics,
            model,
            base_url,
            api_key,
            requests_per_minute,
        } => {
            let endpoint = commands::Endpoint {
                api_key: api_key.as_str(),
                model: model.as_str(),
                base_url: base_url.as_deref(),
                requests_per_minute: *requests_per_minute,
            };
            commands::interview(&pipeline, responses, domain, demographics.as_deref(), endpoint).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::from_toml_str(&input::read_text(path)?)?),
        None => Ok(PipelineConfig::from_env()),
    }
}

fn build_pipeline(config: PipelineConfig, domains: Option<&Path>, rules: Option<&Path>) -> CliResult<PersonaPipeline> {
    let lexicon = match domains {
        Some(path) => DomainLexicon::from_toml_str(&input::read_text(path)?)?,
        None => DomainLexicon::builtin(),
    };
    let rules = match rules {
        Some(path) => RuleBook::from_toml_str(&input::read_text(path)?)?,
        None => RuleBook::builtin(),
    };
    tracing::debug!(domains = ?lexicon.domain_names(), rules = rules.len(), "Pipeline assembled");
    Ok(PersonaPipeline::new(config, lexicon, rules)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cluster_seed_parses() {
        let cli = Cli::try_parse_from(["persona", "cluster", "people.json", "--seed", "42", "--domain", "eng"]).unwrap();
        match cli.command {
            Command::Cluster { seed, domain, .. } => {
                assert_eq!(seed, Some(42));
                assert_eq!(domain, "eng");
            }
            _ => panic!("expected the cluster command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["persona", "profile", "answers.json", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
    }

    #[test]
    fn test_missing_config_file_is_read_error() {
        let err = load_config(Some(Path::new("/nonexistent/persona.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
