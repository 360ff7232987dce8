use anyhow::{bail, Result};
use application::definition_service::{self, DefinitionService};
use application::resources::Resources;
use application::retrieval_service::{self, RetrievalService};
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::models::{Definition, FormattedResult, QueryOutcome};
use serde::Serialize;
use shared::telemetry::Telemetry;
use std::sync::Arc;

/// Medication lookup over a drug vector index.
#[derive(Parser, Debug)]
#[command(name = "medmate")]
#[command(about = "Look up drug metadata and definitions by medication name", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up medications by name; separate several names with commas
    Query {
        /// Medication name(s), e.g. "atorvastatin, lisinopril"
        #[arg(required = true)]
        text: Vec<String>,

        /// Maximum number of semantic matches per name
        #[arg(short = 'k', long, default_value_t = retrieval_service::DEFAULT_TOP_K)]
        top_k: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print a readable definition for each medication name
    Define {
        #[arg(required = true)]
        names: Vec<String>,

        /// Number of semantic candidates fetched per name
        #[arg(short = 'k', long, default_value_t = definition_service::DEFAULT_TOP_K)]
        top_k: usize,

        #[arg(long)]
        json: bool,
    },
}

/// One entry of a `query` run: the sub-query plus its outcome.
#[derive(Debug, Serialize)]
pub struct QueryReport<'a> {
    pub query: &'a str,
    pub mode: &'static str,
    pub results: &'a [FormattedResult],
}

/// Split comma-separated input into individual queries.
pub fn split_queries(text: &str) -> Result<Vec<String>> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Query is empty.");
    }
    let queries: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(String::from)
        .collect();
    if queries.is_empty() {
        bail!("Query is empty.");
    }
    Ok(queries)
}

pub struct CliApp {
    retrieval: RetrievalService,
    definitions: DefinitionService,
}

impl CliApp {
    pub fn new(resources: Arc<Resources>) -> Self {
        Self {
            retrieval: RetrievalService::new(resources.clone()),
            definitions: DefinitionService::new(resources),
        }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        let telemetry = Telemetry::new();
        match command {
            Command::Query { text, top_k, json } => {
                self.handle_query(&text.join(" "), top_k, json).await?
            }
            Command::Define { names, top_k, json } => {
                self.handle_define(&names, top_k, json).await?
            }
        }
        tracing::debug!(elapsed_ms = telemetry.elapsed().as_millis() as u64, "command finished");
        Ok(())
    }

    async fn handle_query(&self, text: &str, top_k: usize, json: bool) -> Result<()> {
        let queries = split_queries(text)?;
        let mut outcomes: Vec<(String, QueryOutcome)> = Vec::with_capacity(queries.len());
        for query in queries {
            let outcome = self.retrieval.retrieve(&query, top_k).await?;
            outcomes.push((query, outcome));
        }

        if json {
            let reports: Vec<QueryReport<'_>> = outcomes
                .iter()
                .map(|(query, outcome)| QueryReport {
                    query,
                    mode: outcome.mode(),
                    results: outcome.results(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "results": reports }))?);
            return Ok(());
        }

        for (query, outcome) in &outcomes {
            print_outcome(query, outcome);
        }
        Ok(())
    }

    async fn handle_define(&self, names: &[String], top_k: usize, json: bool) -> Result<()> {
        let definitions = self.definitions.get_definitions(names, top_k).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&definitions)?);
            return Ok(());
        }
        for definition in &definitions {
            print_definition(definition);
        }
        Ok(())
    }
}

fn print_outcome(query: &str, outcome: &QueryOutcome) {
    let mode = match outcome {
        QueryOutcome::Exact(_) => "exact".green(),
        QueryOutcome::Semantic(_) => "semantic".yellow(),
    };
    println!("{} [{}]", query.bold(), mode);
    if outcome.results().is_empty() {
        println!("  {}", "no matches".dimmed());
    }
    for row in outcome.results() {
        println!("  {}", format_row(row));
    }
}

fn format_row(row: &FormattedResult) -> String {
    let score = row
        .score
        .map(|s| format!("{s:.3}  "))
        .unwrap_or_default();
    format!(
        "{}{} ({})  alcohol: {}  pregnancy: {}  csa: {}",
        score, row.generic_name, row.drug_class, row.alcohol, row.pregnancy, row.csa
    )
}

fn print_definition(definition: &Definition) {
    println!("{}", definition.name.bold());
    for line in definition.definition.lines() {
        println!("  {line}");
    }
    println!();
}
