//! Per-step readiness rules.
//!
//! A step is ready when every field it owns is populated. The last step of
//! either branch is Configure indexing, so the indexing fields act as the
//! final gate before the service is created. Positions with no step (an
//! unknown number, or a branch that has not been chosen) are never ready.

use crate::record::{DataSourceType, WizardRecord};
use crate::steps::{StageStep, Step, TableStep};

/// Whether the step at `current_step` lets the user move on.
pub fn can_advance(current_step: usize, record: &WizardRecord) -> bool {
    match Step::at(current_step, record.data_source_type) {
        Some(step) => missing_fields(step, record).is_empty(),
        None => false,
    }
}

/// Names of the fields still blocking `step`, in display order.
pub fn missing_fields(step: Step, record: &WizardRecord) -> Vec<&'static str> {
    let mut missing = Vec::new();
    let mut require = |name: &'static str, ok: bool| {
        if !ok {
            missing.push(name);
        }
    };

    match step {
        Step::NewService => {
            require("serviceName", !record.service_name.is_empty());
            require("database", !record.database.is_empty());
            require("schema", !record.schema.is_empty());
            require("warehouse", !record.warehouse.is_empty());
        }
        Step::SelectData => match record.data_source_type {
            Some(DataSourceType::Table) => {
                require("selectedTable", !record.selected_table.is_empty())
            }
            Some(DataSourceType::Stage) => {
                require("selectedFiles", !record.selected_files.is_empty())
            }
            None => require("dataSourceType", false),
        },
        Step::Stage(StageStep::ChoosePipeline) => {
            require("pipelineType", record.pipeline_type.is_some());
        }
        Step::Table(TableStep::SelectSearchColumns) => {
            require("searchColumns", !record.search_columns.is_empty());
        }
        Step::Table(TableStep::SelectAttributes) => {
            require("attributeColumns", !record.attribute_columns.is_empty());
        }
        Step::Table(TableStep::SelectReturnColumns) => {
            require("returnColumns", !record.return_columns.is_empty());
        }
        Step::Stage(StageStep::ConfigureIndexing) | Step::Table(TableStep::ConfigureIndexing) => {
            require("targetLag", !record.target_lag.is_empty());
            require("embeddingModel", !record.embedding_model.is_empty());
            require("indexingWarehouse", !record.indexing_warehouse.is_empty());
        }
    }
    missing
}
