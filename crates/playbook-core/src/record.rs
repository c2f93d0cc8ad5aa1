//! The wizard record and its partial-update patch.
//!
//! [`WizardRecord`] is the single source of truth for an in-progress search
//! service configuration. It is only ever mutated through
//! [`WizardRecord::apply`], a shallow merge of a [`RecordPatch`]: named
//! fields are replaced wholesale, every other field is left untouched.
//!
//! Both types serialize with the camelCase field names used by the
//! prototype's JSON answer files and persisted services, so a patch can be
//! read straight from a partial object:
//!
//! ```rust
//! use playbook_core::record::{RecordPatch, WizardRecord};
//!
//! let mut record = WizardRecord::default();
//! let patch: RecordPatch = serde_json::from_str(r#"{"serviceName": "S"}"#).unwrap();
//! record.apply(patch);
//! assert_eq!(record.service_name, "S");
//! assert_eq!(record.schema, "TEST");
//! ```

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the indexed data comes from. Selecting it decides the whole
/// downstream step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    Table,
    Stage,
}

impl DataSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceType::Table => "table",
            DataSourceType::Stage => "stage",
        }
    }
}

impl fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSourceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(DataSourceType::Table),
            "stage" => Ok(DataSourceType::Stage),
            other => bail!("Unknown data source type: '{}'. Must be table or stage.", other),
        }
    }
}

/// Document processing pipeline for stage (PDF) sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineType {
    /// Page images embedded with a multimodal model.
    Visual,
    /// Extracted text split into semantic chunks.
    Text,
}

impl PipelineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineType::Visual => "visual",
            PipelineType::Text => "text",
        }
    }
}

impl fmt::Display for PipelineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "visual" => Ok(PipelineType::Visual),
            "text" => Ok(PipelineType::Text),
            other => bail!("Unknown pipeline type: '{}'. Must be visual or text.", other),
        }
    }
}

/// A table column indexed for search, with the retrieval techniques
/// enabled for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchColumn {
    pub name: String,
    pub is_text: bool,
    pub is_vector: bool,
}

impl SearchColumn {
    /// A newly selected column searches by text only.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_text: true,
            is_vector: false,
        }
    }
}

/// Values a fresh record starts from. Loaded from `[wizard]` in the
/// application config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefaults {
    pub database: String,
    pub schema: String,
    pub target_lag: String,
    pub embedding_model: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            database: "ADEY_TEST_DB.TEST".to_string(),
            schema: "TEST".to_string(),
            target_lag: "1 hour".to_string(),
            embedding_model: "snowflake-arctic-embed-m-v1.5".to_string(),
        }
    }
}

/// The accumulated configuration being built across wizard steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardRecord {
    // New service
    pub service_name: String,
    pub database: String,
    pub schema: String,
    pub warehouse: String,

    // Select data
    pub data_source_type: Option<DataSourceType>,
    pub stage_path: String,
    pub selected_table: String,
    pub selected_files: Vec<String>,
    pub enable_incremental_updates: bool,

    // Stage branch
    pub pipeline_type: Option<PipelineType>,
    pub advanced_dual_vector: bool,
    pub advanced_heading_chunk: bool,
    pub generated_table_database: String,
    pub generated_table_schema: String,
    pub include_metadata: Vec<String>,

    // Table branch
    pub search_columns: Vec<SearchColumn>,
    pub attribute_columns: Vec<String>,
    pub return_columns: Vec<String>,

    // Configure indexing
    pub target_lag: String,
    pub embedding_model: String,
    pub indexing_warehouse: String,
}

impl WizardRecord {
    pub fn new(defaults: &RecordDefaults) -> Self {
        Self {
            service_name: String::new(),
            database: defaults.database.clone(),
            schema: defaults.schema.clone(),
            warehouse: String::new(),
            data_source_type: None,
            stage_path: String::new(),
            selected_table: String::new(),
            selected_files: Vec::new(),
            enable_incremental_updates: false,
            pipeline_type: None,
            advanced_dual_vector: false,
            advanced_heading_chunk: false,
            generated_table_database: String::new(),
            generated_table_schema: String::new(),
            include_metadata: Vec::new(),
            search_columns: Vec::new(),
            attribute_columns: Vec::new(),
            return_columns: Vec::new(),
            target_lag: defaults.target_lag.clone(),
            embedding_model: defaults.embedding_model.clone(),
            indexing_warehouse: String::new(),
        }
    }

    /// Shallow-merge `patch` into the record.
    ///
    /// Every field present in the patch replaces the current value; absent
    /// fields are left untouched. No validation happens here: readiness is
    /// decided per step by [`crate::validate::can_advance`]. Set-valued
    /// fields keep their first occurrence of each entry.
    pub fn apply(&mut self, patch: RecordPatch) {
        let RecordPatch {
            service,
            source,
            pipeline,
            columns,
            indexing,
        } = patch;

        if let Some(v) = service.service_name {
            self.service_name = v;
        }
        if let Some(v) = service.database {
            self.database = v;
        }
        if let Some(v) = service.schema {
            self.schema = v;
        }
        if let Some(v) = service.warehouse {
            self.warehouse = v;
        }

        if let Some(v) = source.data_source_type {
            self.data_source_type = Some(v);
        }
        if let Some(v) = source.stage_path {
            self.stage_path = v;
        }
        if let Some(v) = source.selected_table {
            self.selected_table = v;
        }
        if let Some(v) = source.selected_files {
            self.selected_files = dedup(v);
        }
        if let Some(v) = source.enable_incremental_updates {
            self.enable_incremental_updates = v;
        }

        if let Some(v) = pipeline.pipeline_type {
            self.pipeline_type = Some(v);
        }
        if let Some(v) = pipeline.advanced_dual_vector {
            self.advanced_dual_vector = v;
        }
        if let Some(v) = pipeline.advanced_heading_chunk {
            self.advanced_heading_chunk = v;
        }
        if let Some(v) = pipeline.generated_table_database {
            self.generated_table_database = v;
        }
        if let Some(v) = pipeline.generated_table_schema {
            self.generated_table_schema = v;
        }
        if let Some(v) = pipeline.include_metadata {
            self.include_metadata = v;
        }

        if let Some(v) = columns.search_columns {
            self.search_columns = v;
        }
        if let Some(v) = columns.attribute_columns {
            self.attribute_columns = dedup(v);
        }
        if let Some(v) = columns.return_columns {
            self.return_columns = dedup(v);
        }

        if let Some(v) = indexing.target_lag {
            self.target_lag = v;
        }
        if let Some(v) = indexing.embedding_model {
            self.embedding_model = v;
        }
        if let Some(v) = indexing.indexing_warehouse {
            self.indexing_warehouse = v;
        }
    }

    /// Names of the selected search columns, in selection order.
    pub fn search_column_names(&self) -> Vec<&str> {
        self.search_columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Default for WizardRecord {
    fn default() -> Self {
        Self::new(&RecordDefaults::default())
    }
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

// ============ Patch ============

/// A partial record. Fields are grouped by the step that owns them, but the
/// JSON form is a single flat camelCase object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(flatten)]
    pub service: ServicePatch,
    #[serde(flatten)]
    pub source: SourcePatch,
    #[serde(flatten)]
    pub pipeline: PipelinePatch,
    #[serde(flatten)]
    pub columns: ColumnsPatch,
    #[serde(flatten)]
    pub indexing: IndexingPatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourcePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_type: Option<DataSourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_incremental_updates: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelinePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_type: Option<PipelineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_dual_vector: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_heading_chunk: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_table_database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_table_schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_metadata: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_columns: Option<Vec<SearchColumn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_lag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing_warehouse: Option<String>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch from a partial camelCase JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn service_name(mut self, v: impl Into<String>) -> Self {
        self.service.service_name = Some(v.into());
        self
    }

    pub fn database(mut self, v: impl Into<String>) -> Self {
        self.service.database = Some(v.into());
        self
    }

    pub fn schema(mut self, v: impl Into<String>) -> Self {
        self.service.schema = Some(v.into());
        self
    }

    pub fn warehouse(mut self, v: impl Into<String>) -> Self {
        self.service.warehouse = Some(v.into());
        self
    }

    pub fn data_source_type(mut self, v: DataSourceType) -> Self {
        self.source.data_source_type = Some(v);
        self
    }

    pub fn stage_path(mut self, v: impl Into<String>) -> Self {
        self.source.stage_path = Some(v.into());
        self
    }

    pub fn selected_table(mut self, v: impl Into<String>) -> Self {
        self.source.selected_table = Some(v.into());
        self
    }

    pub fn selected_files<I, S>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source.selected_files = Some(v.into_iter().map(Into::into).collect());
        self
    }

    pub fn enable_incremental_updates(mut self, v: bool) -> Self {
        self.source.enable_incremental_updates = Some(v);
        self
    }

    pub fn pipeline_type(mut self, v: PipelineType) -> Self {
        self.pipeline.pipeline_type = Some(v);
        self
    }

    pub fn generated_table_database(mut self, v: impl Into<String>) -> Self {
        self.pipeline.generated_table_database = Some(v.into());
        self
    }

    pub fn generated_table_schema(mut self, v: impl Into<String>) -> Self {
        self.pipeline.generated_table_schema = Some(v.into());
        self
    }

    pub fn include_metadata(mut self, v: Vec<String>) -> Self {
        self.pipeline.include_metadata = Some(v);
        self
    }

    pub fn search_columns(mut self, v: Vec<SearchColumn>) -> Self {
        self.columns.search_columns = Some(v);
        self
    }

    pub fn attribute_columns<I, S>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.attribute_columns = Some(v.into_iter().map(Into::into).collect());
        self
    }

    pub fn return_columns<I, S>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.return_columns = Some(v.into_iter().map(Into::into).collect());
        self
    }

    pub fn target_lag(mut self, v: impl Into<String>) -> Self {
        self.indexing.target_lag = Some(v.into());
        self
    }

    pub fn embedding_model(mut self, v: impl Into<String>) -> Self {
        self.indexing.embedding_model = Some(v.into());
        self
    }

    pub fn indexing_warehouse(mut self, v: impl Into<String>) -> Self {
        self.indexing.indexing_warehouse = Some(v.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let record = WizardRecord::default();
        assert_eq!(record.database, "ADEY_TEST_DB.TEST");
        assert_eq!(record.schema, "TEST");
        assert_eq!(record.target_lag, "1 hour");
        assert_eq!(record.embedding_model, "snowflake-arctic-embed-m-v1.5");
        assert!(record.service_name.is_empty());
        assert!(record.data_source_type.is_none());
        assert!(record.pipeline_type.is_none());
    }

    #[test]
    fn test_shallow_merge_keeps_unrelated_fields() {
        let mut record = WizardRecord::default();
        record.apply(RecordPatch::new().embedding_model("x"));
        record.apply(RecordPatch::new().service_name("y"));
        assert_eq!(record.embedding_model, "x");
        assert_eq!(record.service_name, "y");
    }

    #[test]
    fn test_merge_replaces_collections_wholesale() {
        let mut record = WizardRecord::default();
        record.apply(RecordPatch::new().attribute_columns(["A", "B"]));
        record.apply(RecordPatch::new().attribute_columns(["C"]));
        assert_eq!(record.attribute_columns, vec!["C"]);
    }

    #[test]
    fn test_set_fields_are_deduplicated() {
        let mut record = WizardRecord::default();
        record.apply(RecordPatch::new().selected_files(["a.pdf", "b.pdf", "a.pdf"]));
        assert_eq!(record.selected_files, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_patch_from_partial_json() {
        let patch = RecordPatch::from_json(json!({
            "dataSourceType": "table",
            "selectedTable": "T",
            "searchColumns": [{"name": "C", "isText": true, "isVector": false}]
        }))
        .unwrap();
        assert_eq!(patch.source.data_source_type, Some(DataSourceType::Table));
        assert_eq!(patch.source.selected_table.as_deref(), Some("T"));
        assert_eq!(patch.columns.search_columns.as_ref().map(Vec::len), Some(1));
        assert!(patch.service.service_name.is_none());
    }

    #[test]
    fn test_patch_rejects_bad_enum_value() {
        let err = RecordPatch::from_json(json!({"dataSourceType": "lake"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut record = WizardRecord::default();
        let before = record.clone();
        assert!(RecordPatch::new().is_empty());
        record.apply(RecordPatch::new());
        assert_eq!(record, before);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = WizardRecord::default();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["serviceName"], "");
        assert_eq!(value["dataSourceType"], serde_json::Value::Null);
        assert_eq!(value["targetLag"], "1 hour");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(
            "stage".parse::<DataSourceType>().unwrap(),
            DataSourceType::Stage
        );
        assert_eq!("text".parse::<PipelineType>().unwrap(), PipelineType::Text);
        assert!("folder".parse::<DataSourceType>().is_err());
    }
}
