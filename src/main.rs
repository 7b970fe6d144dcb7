use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};

use condition_rs::condition::{Condition, Record};
use condition_rs::config::ServerConfig;
use condition_rs::rules::{RuleRegistry, RuleSet, RuleSetLoader};
use condition_rs::server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a condition against a record
    Eval {
        /// The condition expression
        #[arg(short, long)]
        expr: String,

        /// Record as inline JSON
        #[arg(short, long, conflicts_with = "file")]
        record: Option<String>,

        /// Record read from a JSON file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Compile a condition and report every syntax error
    Check {
        /// The condition expression
        #[arg(short, long)]
        expr: String,
    },
    /// Evaluate every rule of a rule file against a record
    Rules {
        /// Path to the rule file (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Record as inline JSON
        #[arg(short, long)]
        record: String,
    },
    /// Run the HTTP service
    Serve {
        /// Port to listen on (overrides CONDITION_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides CONDITION_HOST)
        #[arg(long)]
        host: Option<std::net::IpAddr>,

        /// Rule file to preload (overrides CONDITION_RULES)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn parse_record(json: &str) -> anyhow::Result<Record> {
    serde_json::from_str(json)
        .context("Record must be a JSON object of strings, numbers, booleans or flat arrays")
}

fn load_rule_set(path: &Path) -> anyhow::Result<RuleSet> {
    let def = RuleSetLoader::new()
        .load(path)
        .with_context(|| format!("Failed to load rules from {}", path.display()))?;
    Ok(RuleSet::compile(&def)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Eval { expr, record, file } => {
            let record = match (record, file) {
                (Some(json), _) => parse_record(&json)?,
                (None, Some(path)) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    parse_record(&json)?
                }
                (None, None) => Record::new(),
            };

            let condition = Condition::compile(&expr)?;
            let result = condition.evaluate(&record)?;
            println!("{}", result);
        }
        Commands::Check { expr } => match Condition::compile(&expr) {
            Ok(condition) => println!("{}", condition),
            Err(e) => {
                for error in e.syntax_errors() {
                    eprintln!("{}", error);
                }
                bail!("{} syntax error(s)", e.syntax_errors().len());
            }
        },
        Commands::Rules { file, record } => {
            let set = load_rule_set(&file)?;
            let record = parse_record(&record)?;

            for outcome in set.evaluate(&record) {
                match outcome.result {
                    Ok(matched) => println!("{}: {}", outcome.rule, matched),
                    Err(e) => println!("{}: error: {}", outcome.rule, e),
                }
            }
        }
        Commands::Serve { port, host, rules } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if rules.is_some() {
                config.rules_file = rules;
            }

            let registry = RuleRegistry::new();
            if let Some(path) = &config.rules_file {
                let set = load_rule_set(path)?;
                registry.load_rule_set(&set).await;
            }

            server::serve(&config, registry).await?;
        }
    }

    Ok(())
}
