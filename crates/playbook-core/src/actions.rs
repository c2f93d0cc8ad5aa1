//! Step controls.
//!
//! Each function computes the patch a control submits when the user acts on
//! it, given the current record. The caller feeds the patch to
//! [`crate::controller::WizardController::update`].

use crate::catalog;
use crate::record::{DataSourceType, RecordPatch, SearchColumn, WizardRecord};
use crate::target_lag::{LagUnit, TargetLag};

/// Switch the data source type. Choosing stage clears the selected table.
pub fn choose_source_type(source: DataSourceType) -> RecordPatch {
    let patch = RecordPatch::new().data_source_type(source);
    match source {
        DataSourceType::Stage => patch.selected_table(""),
        DataSourceType::Table => patch,
    }
}

/// Add a stage file to the selection, or remove it if already selected.
pub fn toggle_file(record: &WizardRecord, path: &str) -> RecordPatch {
    RecordPatch::new().selected_files(toggled(&record.selected_files, path))
}

/// Add a search column (text search only) or remove it.
pub fn toggle_search_column(record: &WizardRecord, name: &str) -> RecordPatch {
    let mut columns = record.search_columns.clone();
    if let Some(i) = columns.iter().position(|c| c.name == name) {
        columns.remove(i);
    } else {
        columns.push(SearchColumn::text(name));
    }
    RecordPatch::new().search_columns(columns)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Text,
    Vector,
}

/// Flip one retrieval technique on a selected search column. A column always
/// keeps at least one technique: turning off the last one turns the other on.
/// Returns `None` when the column is not selected.
pub fn toggle_search_type(
    record: &WizardRecord,
    name: &str,
    search_type: SearchType,
) -> Option<RecordPatch> {
    let mut columns = record.search_columns.clone();
    let column = columns.iter_mut().find(|c| c.name == name)?;
    match search_type {
        SearchType::Text => column.is_text = !column.is_text,
        SearchType::Vector => column.is_vector = !column.is_vector,
    }
    if !column.is_text && !column.is_vector {
        match search_type {
            SearchType::Text => column.is_vector = true,
            SearchType::Vector => column.is_text = true,
        }
    }
    Some(RecordPatch::new().search_columns(columns))
}

pub fn toggle_attribute(record: &WizardRecord, name: &str) -> RecordPatch {
    RecordPatch::new().attribute_columns(toggled(&record.attribute_columns, name))
}

/// Columns that are searched or used as attributes are always returned.
pub fn is_required_return_column(record: &WizardRecord, name: &str) -> bool {
    record.search_columns.iter().any(|c| c.name == name)
        || record.attribute_columns.iter().any(|c| c == name)
}

/// Toggle a return column. Required columns are locked and yield `None`.
pub fn toggle_return_column(record: &WizardRecord, name: &str) -> Option<RecordPatch> {
    if is_required_return_column(record, name) {
        return None;
    }
    Some(RecordPatch::new().return_columns(toggled(&record.return_columns, name)))
}

pub fn select_all_return_columns() -> RecordPatch {
    RecordPatch::new().return_columns(catalog::TABLE_COLUMNS.iter().copied())
}

pub fn clear_return_columns() -> RecordPatch {
    RecordPatch::new().return_columns(Vec::<String>::new())
}

/// The return columns preselected when the return-column step opens: search
/// columns first, then attributes, without duplicates.
pub fn preselected_return_columns(record: &WizardRecord) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let names = record
        .search_columns
        .iter()
        .map(|c| &c.name)
        .chain(record.attribute_columns.iter());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

pub fn set_target_lag_value(record: &WizardRecord, input: &str) -> RecordPatch {
    let lag = TargetLag::parse_lenient(&record.target_lag).with_value_input(input);
    RecordPatch::new().target_lag(lag.to_string())
}

pub fn set_target_lag_unit(record: &WizardRecord, unit: LagUnit) -> RecordPatch {
    let lag = TargetLag::parse_lenient(&record.target_lag).with_unit(unit);
    RecordPatch::new().target_lag(lag.to_string())
}

fn toggled(current: &[String], value: &str) -> Vec<String> {
    if current.iter().any(|v| v == value) {
        current.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut out = current.to_vec();
        out.push(value.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choosing_stage_clears_table() {
        let mut record = WizardRecord::default();
        record.apply(RecordPatch::new().selected_table("CSS_SCRAPE"));
        record.apply(choose_source_type(DataSourceType::Stage));
        assert_eq!(record.selected_table, "");
        assert_eq!(record.data_source_type, Some(DataSourceType::Stage));
    }

    #[test]
    fn test_toggle_file() {
        let mut record = WizardRecord::default();
        record.apply(toggle_file(&record, "readme.pdf"));
        record.apply(toggle_file(&record, "documents/guide.pdf"));
        assert_eq!(record.selected_files, vec!["readme.pdf", "documents/guide.pdf"]);
        record.apply(toggle_file(&record, "readme.pdf"));
        assert_eq!(record.selected_files, vec!["documents/guide.pdf"]);
    }

    #[test]
    fn test_new_search_column_defaults_to_text() {
        let mut record = WizardRecord::default();
        record.apply(toggle_search_column(&record, "CONTENT"));
        assert_eq!(record.search_columns, vec![SearchColumn::text("CONTENT")]);
        record.apply(toggle_search_column(&record, "CONTENT"));
        assert!(record.search_columns.is_empty());
    }

    #[test]
    fn test_search_type_never_both_off() {
        let mut record = WizardRecord::default();
        record.apply(toggle_search_column(&record, "CONTENT"));

        let patch = toggle_search_type(&record, "CONTENT", SearchType::Text).unwrap();
        record.apply(patch);
        let col = &record.search_columns[0];
        assert!(!col.is_text);
        assert!(col.is_vector);

        let patch = toggle_search_type(&record, "CONTENT", SearchType::Vector).unwrap();
        record.apply(patch);
        let col = &record.search_columns[0];
        assert!(col.is_text);
        assert!(!col.is_vector);
    }

    #[test]
    fn test_search_type_on_unselected_column() {
        let record = WizardRecord::default();
        assert!(toggle_search_type(&record, "TITLE", SearchType::Vector).is_none());
    }

    #[test]
    fn test_required_return_columns_are_locked() {
        let mut record = WizardRecord::default();
        record.apply(
            RecordPatch::new()
                .search_columns(vec![SearchColumn::text("CONTENT")])
                .attribute_columns(["CATEGORY"])
                .return_columns(["CONTENT", "CATEGORY"]),
        );
        assert!(toggle_return_column(&record, "CONTENT").is_none());
        assert!(toggle_return_column(&record, "CATEGORY").is_none());

        record.apply(toggle_return_column(&record, "TITLE").unwrap());
        assert_eq!(record.return_columns, vec!["CONTENT", "CATEGORY", "TITLE"]);
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut record = WizardRecord::default();
        record.apply(select_all_return_columns());
        assert_eq!(record.return_columns.len(), catalog::TABLE_COLUMNS.len());
        record.apply(clear_return_columns());
        assert!(record.return_columns.is_empty());
    }

    #[test]
    fn test_preselection_is_ordered_union() {
        let mut record = WizardRecord::default();
        record.apply(
            RecordPatch::new()
                .search_columns(vec![SearchColumn::text("TITLE"), SearchColumn::text("CONTENT")])
                .attribute_columns(["CATEGORY", "TITLE"]),
        );
        assert_eq!(
            preselected_return_columns(&record),
            vec!["TITLE", "CONTENT", "CATEGORY"]
        );
    }

    #[test]
    fn test_target_lag_controls() {
        let mut record = WizardRecord::default();
        record.apply(set_target_lag_value(&record, "6"));
        assert_eq!(record.target_lag, "6 hours");
        record.apply(set_target_lag_unit(&record, LagUnit::Day));
        assert_eq!(record.target_lag, "6 days");
        record.apply(set_target_lag_value(&record, "abc"));
        assert_eq!(record.target_lag, "1 day");
    }
}
