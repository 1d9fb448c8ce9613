//! Subcommand handlers. Each returns the JSON document to print.

use crate::error::CliResult;
use crate::input::{load_demographics, load_population, load_responses, read_text};
use persona_core::{RawResponseSet, RespondentRecord};
use persona_llm::providers::{OpenAiClient, OpenAiCompatibleGenerator};
use persona_llm::UsageTracker;
use persona_pipeline::{PersonaPipeline, SelfValidation};
use persona_validation::parse_self_assessment;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

pub fn profile(pipeline: &PersonaPipeline, responses: &Path) -> CliResult<Value> {
    let profile = pipeline.profile(&load_responses(responses)?)?;
    Ok(json!({
        "fingerprint": profile.fingerprint(),
        "profile": profile,
    }))
}

pub fn compile(
    pipeline: &PersonaPipeline,
    responses: &Path,
    domain: &str,
    demographics: Option<&Path>,
) -> CliResult<Value> {
    let subject = pipeline.compile_subject(
        &load_responses(responses)?,
        domain,
        &load_demographics(demographics)?,
    )?;
    Ok(json!({
        "fingerprint": subject.specification.fingerprint(),
        "subject": subject,
    }))
}

pub fn cluster(pipeline: &PersonaPipeline, population: &Path, domain: &str) -> CliResult<Value> {
    let records = load_population(population)?;
    let mut respondents = Vec::with_capacity(records.len());
    for record in records {
        let profile = pipeline.profile(&RawResponseSet::from_json(&record.responses)?)?;
        respondents.push(RespondentRecord::new(record.id, profile).with_demographics(record.demographics));
    }

    let mut rng = pipeline.random_source();
    let archetypes = pipeline.archetypes(&respondents, domain, &mut rng)?;
    Ok(json!({
        "respondents": respondents.len(),
        "seed": pipeline.config().seed,
        "archetypes": archetypes,
    }))
}

/// Compare a respondent with answers given as JSON or `ID: score` lines.
pub fn validate(pipeline: &PersonaPipeline, responses: &Path, answers: &Path) -> CliResult<Value> {
    let profile = pipeline.profile(&load_responses(responses)?)?;
    let text = read_text(answers)?;
    let assessed = parse_self_assessment(&text, pipeline.catalog()).map_err(persona_core::PersonaError::from)?;
    let result = pipeline.validate(&profile, &assessed)?;
    Ok(serde_json::to_value(result)?)
}

/// Connection settings for the `interview` subcommand.
pub struct Endpoint<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
    pub base_url: Option<&'a str>,
    pub requests_per_minute: u32,
}

impl std::fmt::Debug for Endpoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Compile a subject and interview the result through a chat endpoint.
pub async fn interview(
    pipeline: &PersonaPipeline,
    responses: &Path,
    domain: &str,
    demographics: Option<&Path>,
    endpoint: Endpoint<'_>,
) -> CliResult<Value> {
    let subject = pipeline.compile_subject(
        &load_responses(responses)?,
        domain,
        &load_demographics(demographics)?,
    )?;

    let mut client = OpenAiClient::new(endpoint.api_key, endpoint.requests_per_minute);
    if let Some(base_url) = endpoint.base_url {
        client = client.with_base_url(base_url);
    }
    let generator = OpenAiCompatibleGenerator::with_client(client, endpoint.model);
    let usage = Arc::new(UsageTracker::new());

    let outcome = SelfValidation::new(Arc::new(generator), usage.clone())
        .run(pipeline, &subject.profile, &subject.specification)
        .await?;

    tracing::info!(passed = outcome.passed(), usage = ?usage, "Interview finished");
    Ok(json!({
        "fingerprint": subject.specification.fingerprint(),
        "applied_rules": subject.specification.applied_rules,
        "outcome": outcome,
    }))
}
