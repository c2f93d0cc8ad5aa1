//! Step views: which panel is shown for a step, what it derives from the
//! record while shown, and how it renders as text.

use crate::actions;
use crate::catalog;
use crate::record::{DataSourceType, PipelineType, RecordPatch, WizardRecord};
use crate::steps::{StageStep, Step, TableStep};
use crate::target_lag::TargetLag;

/// Shown when no view exists for the current position.
pub const PLACEHOLDER_MESSAGE: &str = "Please select a data source type to continue.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepView {
    NewService,
    SelectData,
    ChoosePipeline,
    SelectSearchColumns,
    SelectAttributes,
    SelectReturnColumns,
    ConfigureIndexing(DataSourceType),
    Placeholder,
}

impl From<Step> for StepView {
    fn from(step: Step) -> Self {
        match step {
            Step::NewService => StepView::NewService,
            Step::SelectData => StepView::SelectData,
            Step::Stage(StageStep::ChoosePipeline) => StepView::ChoosePipeline,
            Step::Stage(StageStep::ConfigureIndexing) => {
                StepView::ConfigureIndexing(DataSourceType::Stage)
            }
            Step::Table(TableStep::SelectSearchColumns) => StepView::SelectSearchColumns,
            Step::Table(TableStep::SelectAttributes) => StepView::SelectAttributes,
            Step::Table(TableStep::SelectReturnColumns) => StepView::SelectReturnColumns,
            Step::Table(TableStep::ConfigureIndexing) => {
                StepView::ConfigureIndexing(DataSourceType::Table)
            }
        }
    }
}

/// Select the view for a step position. Positions past the active branch
/// (or past step 2 with no branch) get the placeholder.
pub fn dispatch(step: usize, source: Option<DataSourceType>) -> StepView {
    Step::at(step, source).map_or(StepView::Placeholder, StepView::from)
}

impl StepView {
    /// Derived updates applied once when the view is entered.
    pub fn on_enter(&self, record: &WizardRecord) -> Option<RecordPatch> {
        match self {
            StepView::SelectReturnColumns => Some(
                RecordPatch::new().return_columns(actions::preselected_return_columns(record)),
            ),
            StepView::ConfigureIndexing(DataSourceType::Stage) => {
                let mut patch = RecordPatch::new().include_metadata(catalog::stage_metadata_names());
                if let Some(forced) = self.on_change(record) {
                    patch.indexing = forced.indexing;
                }
                Some(patch)
            }
            _ => self.on_change(record),
        }
    }

    /// Derived updates re-applied whenever the record changes while the view
    /// is shown. Returns `None` when the record already satisfies the view.
    pub fn on_change(&self, record: &WizardRecord) -> Option<RecordPatch> {
        match self {
            StepView::ConfigureIndexing(_)
                if record.pipeline_type == Some(PipelineType::Visual)
                    && record.embedding_model != catalog::VISUAL_EMBEDDING_MODEL =>
            {
                Some(RecordPatch::new().embedding_model(catalog::VISUAL_EMBEDDING_MODEL))
            }
            _ => None,
        }
    }

    /// Page heading.
    pub fn heading(&self) -> &'static str {
        match self {
            StepView::NewService => "New Cortex Search service",
            StepView::SelectData => "Select data",
            StepView::ChoosePipeline => "Choose processing pipeline",
            StepView::SelectSearchColumns => "Select search columns",
            StepView::SelectAttributes => "Select attributes",
            StepView::SelectReturnColumns => "Select columns to return",
            StepView::ConfigureIndexing(_) => "Configure indexing",
            StepView::Placeholder => "",
        }
    }

    /// Render the panel as plain text.
    pub fn render(&self, record: &WizardRecord) -> String {
        let mut lines: Vec<String> = Vec::new();
        if !self.heading().is_empty() {
            lines.push(self.heading().to_string());
            lines.push("=".repeat(self.heading().len()));
        }

        match self {
            StepView::NewService => {
                lines.push(field("Service name", &record.service_name));
                lines.push(field("Database", &record.database));
                lines.push(field("Schema", &record.schema));
                lines.push(field("Warehouse", &record.warehouse));
                lines.push(choices("Warehouses", catalog::WAREHOUSES, &[record.warehouse.as_str()]));
            }
            StepView::SelectData => {
                let source = record
                    .data_source_type
                    .map(|s| s.as_str())
                    .unwrap_or("");
                lines.push(field("Source type", source));
                match record.data_source_type {
                    Some(DataSourceType::Table) => {
                        lines.push(choices("Tables", catalog::TABLES, &[record.selected_table.as_str()]));
                    }
                    Some(DataSourceType::Stage) => {
                        lines.push(choices("Stages", catalog::STAGES, &[record.stage_path.as_str()]));
                        lines.push("Files:".to_string());
                        for path in catalog::all_stage_files() {
                            let mark = checkbox(record.selected_files.contains(&path));
                            lines.push(format!("  {} {}", mark, path));
                        }
                        lines.push(field(
                            "Incremental updates",
                            on_off(record.enable_incremental_updates),
                        ));
                    }
                    None => lines.push("  Choose table or stage.".to_string()),
                }
            }
            StepView::ChoosePipeline => {
                let current = record.pipeline_type;
                lines.push(format!(
                    "  {} visual  Visual & Complex Documents: reports with charts, diagrams, images, and complex layouts.",
                    radio(current == Some(PipelineType::Visual))
                ));
                lines.push(format!(
                    "  {} text    Text-Heavy & Lightweight: contracts, legal documents, or long articles.",
                    radio(current == Some(PipelineType::Text))
                ));
                if current.is_some() {
                    lines.push(field("Generated table database", &record.generated_table_database));
                    lines.push(field("Generated table schema", &record.generated_table_schema));
                }
            }
            StepView::SelectSearchColumns => {
                lines.push(field("Table", &record.selected_table));
                for column in catalog::TABLE_COLUMNS {
                    let selected = record.search_columns.iter().find(|c| c.name == *column);
                    let detail = match selected {
                        Some(c) => format!(
                            "  text:{} vector:{}",
                            on_off(c.is_text),
                            on_off(c.is_vector)
                        ),
                        None => String::new(),
                    };
                    lines.push(format!(
                        "  {} {}{}",
                        checkbox(selected.is_some()),
                        column,
                        detail
                    ));
                }
            }
            StepView::SelectAttributes => {
                for column in catalog::TABLE_COLUMNS {
                    let selected = record.attribute_columns.iter().any(|c| c == column);
                    lines.push(format!("  {} {}", checkbox(selected), column));
                }
            }
            StepView::SelectReturnColumns => {
                for column in catalog::TABLE_COLUMNS {
                    let selected = record.return_columns.iter().any(|c| c == column);
                    let lock = if actions::is_required_return_column(record, column) {
                        " (required)"
                    } else {
                        ""
                    };
                    lines.push(format!("  {} {}{}", checkbox(selected), column, lock));
                }
            }
            StepView::ConfigureIndexing(source) => {
                let lag = TargetLag::parse_lenient(&record.target_lag);
                lines.push(field("Target lag", &lag.to_string()));
                lines.push(choices(
                    "Embedding model",
                    catalog::EMBEDDING_MODELS,
                    &[record.embedding_model.as_str()],
                ));
                lines.push(choices(
                    "Warehouse",
                    catalog::WAREHOUSES,
                    &[record.indexing_warehouse.as_str()],
                ));
                if *source == DataSourceType::Stage {
                    let schema = match record.pipeline_type {
                        Some(PipelineType::Visual) => catalog::VISUAL_SCHEMA,
                        _ => catalog::TEXT_SCHEMA,
                    };
                    lines.push("Generated schema:".to_string());
                    for column in schema {
                        lines.push(format!("  {:<16} {:<10} {}", column.name, column.data_type, column.description));
                    }
                    lines.push(format!(
                        "Metadata columns: {}",
                        record.include_metadata.join(", ")
                    ));
                }
            }
            StepView::Placeholder => lines.push(PLACEHOLDER_MESSAGE.to_string()),
        }

        lines.join("\n")
    }
}

fn field(label: &str, value: &str) -> String {
    let value = if value.is_empty() { "-" } else { value };
    format!("  {}: {}", label, value)
}

fn choices(label: &str, options: &[&str], selected: &[&str]) -> String {
    let rendered: Vec<String> = options
        .iter()
        .map(|o| {
            if selected.contains(o) {
                format!("[{}]", o)
            } else {
                o.to_string()
            }
        })
        .collect();
    format!("  {} options: {}", label, rendered.join("  "))
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn radio(checked: bool) -> &'static str {
    if checked {
        "(*)"
    } else {
        "( )"
    }
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
