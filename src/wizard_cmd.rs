//! `playbook wizard` commands: show the step sidebar, drive the wizard from
//! an answers file, and list the services it created.
//!
//! An answers file holds one partial record per step, in camelCase, exactly
//! as a step view would emit it:
//!
//! ```json
//! { "steps": [
//!     { "serviceName": "support_search", "warehouse": "COMPUTE_WH" },
//!     { "dataSourceType": "stage", "stagePath": "@DOCS_STAGE", "selectedFiles": ["documents/report_2024.pdf"] },
//!     { "pipelineType": "visual" },
//!     { "indexingWarehouse": "COMPUTE_WH" }
//! ] }
//! ```

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use playbook_core::controller::{Advance, Navigator, WizardController};
use playbook_core::record::{DataSourceType, RecordPatch, WizardRecord};
use playbook_core::steps::{descriptors, Step};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Config;
use crate::storage::{load_json, save_json, FileStore, KeyValueStore, SERVICES_KEY};

/// What the landing page shows for a created service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub service_name: String,
    pub database: String,
    pub schema: String,
    pub warehouse: String,
    pub data_source_type: Option<DataSourceType>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub selected_table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_type: Option<String>,
    pub target_lag: String,
    pub embedding_model: String,
    pub metadata_count: usize,
    pub created_at: DateTime<Utc>,
}

impl ServiceSummary {
    pub fn from_record(record: &WizardRecord) -> Self {
        Self {
            service_name: record.service_name.clone(),
            database: record.database.clone(),
            schema: record.schema.clone(),
            warehouse: record.warehouse.clone(),
            data_source_type: record.data_source_type,
            stage_path: record.stage_path.clone(),
            selected_table: record.selected_table.clone(),
            pipeline_type: record.pipeline_type.map(|p| p.to_string()),
            target_lag: record.target_lag.clone(),
            embedding_model: record.embedding_model.clone(),
            metadata_count: record.include_metadata.len(),
            created_at: Utc::now(),
        }
    }

    fn print(&self) {
        println!("Search service created: {}", self.service_name);
        println!("    database: {}", self.database);
        println!("    schema: {}", self.schema);
        println!("    warehouse: {}", self.warehouse);
        if let Some(source) = self.data_source_type {
            println!("    source: {}", source);
        }
        if !self.stage_path.is_empty() {
            println!("    stagePath: {}", self.stage_path);
        }
        if !self.selected_table.is_empty() {
            println!("    table: {}", self.selected_table);
        }
        if let Some(pipeline) = &self.pipeline_type {
            println!("    pipelineType: {}", pipeline);
        }
        println!("    targetLag: {}", self.target_lag);
        println!("    embeddingModel: {}", self.embedding_model);
        println!("    metadataCount: {}", self.metadata_count);
    }
}

pub fn saved_services(store: &dyn KeyValueStore) -> Result<Vec<ServiceSummary>> {
    Ok(load_json(store, SERVICES_KEY)?.unwrap_or_default())
}

/// Persists each created service under `playbook-services`.
pub struct StoreNavigator<'a> {
    store: &'a dyn KeyValueStore,
    created: Option<ServiceSummary>,
    error: Option<anyhow::Error>,
}

impl<'a> StoreNavigator<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            created: None,
            error: None,
        }
    }

    fn save(&self, summary: &ServiceSummary) -> Result<()> {
        let mut services = saved_services(self.store)?;
        services.retain(|s| s.service_name != summary.service_name);
        services.push(summary.clone());
        save_json(self.store, SERVICES_KEY, &services)
    }
}

impl Navigator for StoreNavigator<'_> {
    fn service_created(&mut self, record: &WizardRecord) {
        let summary = ServiceSummary::from_record(record);
        if let Err(e) = self.save(&summary) {
            tracing::error!("failed to save service {}: {:#}", summary.service_name, e);
            self.error = Some(e);
        }
        self.created = Some(summary);
    }
}

#[derive(Debug, Deserialize)]
pub struct Answers {
    pub steps: Vec<serde_json::Value>,
}

pub fn load_answers(path: &Path) -> Result<Answers> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse answers file: {}", path.display()))
}

/// Feed each answer to the current step and advance. Returns the created
/// service, or an error naming the step that could not be completed.
pub fn drive(
    wizard: &mut WizardController<StoreNavigator<'_>>,
    answers: &Answers,
    show_views: bool,
) -> Result<ServiceSummary> {
    for (i, answer) in answers.steps.iter().enumerate() {
        let patch = RecordPatch::from_json(answer.clone())
            .with_context(|| format!("answer #{} is not a valid step update", i + 1))?;
        wizard.update(patch);

        let number = wizard.current_step();
        let title = wizard.step().map(|s| s.title()).unwrap_or("(no step)");
        if show_views {
            println!("{}", wizard.view().render(wizard.record()));
            println!();
        }

        let label = wizard.next_label();
        match wizard.next() {
            Advance::Moved { to } => {
                println!("Step {} {} done -> {} (step {})", number, title, label, to);
            }
            Advance::Completed => {
                let navigator = wizard.navigator_mut();
                if let Some(e) = navigator.error.take() {
                    return Err(e);
                }
                return navigator
                    .created
                    .clone()
                    .context("wizard completed without a service");
            }
            Advance::Blocked => {
                bail!(
                    "Step {} ({}) is incomplete: missing {}",
                    number,
                    title,
                    wizard.missing_fields().join(", ")
                );
            }
        }
    }

    bail!(
        "Answers ran out at step {} ({}) before the service was created",
        wizard.current_step(),
        wizard.step().map(|s| s.title()).unwrap_or("(no step)")
    )
}

pub fn run_wizard(config: &Config, answers_path: &Path, show_views: bool) -> Result<()> {
    let answers = load_answers(answers_path)?;
    let store = FileStore::new(&config.storage.dir);
    let mut wizard = WizardController::new(
        config.wizard.record_defaults(),
        StoreNavigator::new(&store),
    );

    let summary = drive(&mut wizard, &answers, show_views)?;
    println!();
    summary.print();
    Ok(())
}

pub fn run_steps(
    config: &Config,
    source: Option<DataSourceType>,
    current: usize,
    json: bool,
) -> Result<()> {
    let rows = descriptors(current, source);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        let mark = if row.is_completed {
            "[x]"
        } else if row.number == current {
            "[>]"
        } else {
            "[ ]"
        };
        println!("{} {}. {}", mark, row.number, row.title);
    }
    if source.is_none() {
        println!();
        println!("Choose a data source at step 2 to see the remaining steps.");
    }
    if Step::at(current, source).is_none() {
        println!();
        println!("{}", playbook_core::view::PLACEHOLDER_MESSAGE);
    }
    println!();
    println!(
        "New services default to {}.{} with target lag {}.",
        config.wizard.database, config.wizard.schema, config.wizard.target_lag
    );
    Ok(())
}

pub fn run_services(config: &Config) -> Result<()> {
    let store = FileStore::new(&config.storage.dir);
    let services = saved_services(&store)?;
    if services.is_empty() {
        println!("No services created yet.");
        return Ok(());
    }
    for (i, s) in services.iter().enumerate() {
        let source = s
            .data_source_type
            .map(|d| d.as_str())
            .unwrap_or("unknown");
        println!("{}. {} ({})", i + 1, s.service_name, source);
        println!("    location: {}.{}", s.database, s.schema);
        println!("    embeddingModel: {}", s.embedding_model);
        println!("    created: {}", s.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
