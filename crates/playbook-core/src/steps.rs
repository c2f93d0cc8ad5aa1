//! The visible step sequence.
//!
//! The wizard always opens with two fixed steps. Choosing a data source type
//! on step 2 appends one of two branches:
//!
//! | # | table | stage |
//! |---|-------|-------|
//! | 1 | New service | New service |
//! | 2 | Select data | Select data |
//! | 3 | Select search columns | Choose processing pipeline |
//! | 4 | Select attributes | Configure indexing |
//! | 5 | Select columns to return | |
//! | 6 | Configure indexing | |
//!
//! Step numbers are 1-based everywhere.

use serde::Serialize;

use crate::record::DataSourceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    NewService,
    SelectData,
    Stage(StageStep),
    Table(TableStep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageStep {
    ChoosePipeline,
    ConfigureIndexing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableStep {
    SelectSearchColumns,
    SelectAttributes,
    SelectReturnColumns,
    ConfigureIndexing,
}

const UNSET_STEPS: &[Step] = &[Step::NewService, Step::SelectData];

const STAGE_STEPS: &[Step] = &[
    Step::NewService,
    Step::SelectData,
    Step::Stage(StageStep::ChoosePipeline),
    Step::Stage(StageStep::ConfigureIndexing),
];

const TABLE_STEPS: &[Step] = &[
    Step::NewService,
    Step::SelectData,
    Step::Table(TableStep::SelectSearchColumns),
    Step::Table(TableStep::SelectAttributes),
    Step::Table(TableStep::SelectReturnColumns),
    Step::Table(TableStep::ConfigureIndexing),
];

/// The full ordered step sequence for a data source type.
pub fn sequence(source: Option<DataSourceType>) -> &'static [Step] {
    match source {
        None => UNSET_STEPS,
        Some(DataSourceType::Stage) => STAGE_STEPS,
        Some(DataSourceType::Table) => TABLE_STEPS,
    }
}

/// Number of the last visible step.
pub fn last_step(source: Option<DataSourceType>) -> usize {
    sequence(source).len()
}

impl Step {
    /// The step shown at 1-based position `number`, if any.
    pub fn at(number: usize, source: Option<DataSourceType>) -> Option<Step> {
        number
            .checked_sub(1)
            .and_then(|i| sequence(source).get(i))
            .copied()
    }

    pub fn id(&self) -> &'static str {
        match self {
            Step::NewService => "new-service",
            Step::SelectData => "select-data",
            Step::Stage(StageStep::ChoosePipeline) => "choose-pipeline",
            Step::Table(TableStep::SelectSearchColumns) => "select-search-columns",
            Step::Table(TableStep::SelectAttributes) => "select-attributes",
            Step::Table(TableStep::SelectReturnColumns) => "select-return-columns",
            Step::Stage(StageStep::ConfigureIndexing)
            | Step::Table(TableStep::ConfigureIndexing) => "configure-indexing",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::NewService => "New service",
            Step::SelectData => "Select data",
            Step::Stage(StageStep::ChoosePipeline) => "Choose processing pipeline",
            Step::Table(TableStep::SelectSearchColumns) => "Select search columns",
            Step::Table(TableStep::SelectAttributes) => "Select attributes",
            Step::Table(TableStep::SelectReturnColumns) => "Select columns to return",
            Step::Stage(StageStep::ConfigureIndexing)
            | Step::Table(TableStep::ConfigureIndexing) => "Configure indexing",
        }
    }
}

/// A row of the step sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDescriptor {
    pub number: usize,
    pub id: &'static str,
    pub title: &'static str,
    pub is_completed: bool,
}

/// Describe every visible step relative to `current_step`.
pub fn descriptors(current_step: usize, source: Option<DataSourceType>) -> Vec<StepDescriptor> {
    sequence(source)
        .iter()
        .enumerate()
        .map(|(i, step)| StepDescriptor {
            number: i + 1,
            id: step.id(),
            title: step.title(),
            is_completed: i + 1 < current_step,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(source: Option<DataSourceType>) -> Vec<&'static str> {
        descriptors(1, source).iter().map(|d| d.title).collect()
    }

    #[test]
    fn test_unset_shows_fixed_steps_only() {
        assert_eq!(titles(None), vec!["New service", "Select data"]);
    }

    #[test]
    fn test_stage_branch() {
        assert_eq!(
            titles(Some(DataSourceType::Stage)),
            vec![
                "New service",
                "Select data",
                "Choose processing pipeline",
                "Configure indexing"
            ]
        );
    }

    #[test]
    fn test_table_branch() {
        assert_eq!(
            titles(Some(DataSourceType::Table)),
            vec![
                "New service",
                "Select data",
                "Select search columns",
                "Select attributes",
                "Select columns to return",
                "Configure indexing"
            ]
        );
    }

    #[test]
    fn test_ids() {
        let ids: Vec<&str> = descriptors(1, Some(DataSourceType::Table))
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "new-service",
                "select-data",
                "select-search-columns",
                "select-attributes",
                "select-return-columns",
                "configure-indexing"
            ]
        );
    }

    #[test]
    fn test_is_completed_tracks_current_step() {
        for source in [None, Some(DataSourceType::Table), Some(DataSourceType::Stage)] {
            for current in 1..=7 {
                for d in descriptors(current, source) {
                    assert_eq!(d.is_completed, d.number < current);
                }
            }
        }
    }

    #[test]
    fn test_step_at_out_of_range() {
        assert_eq!(Step::at(0, None), None);
        assert_eq!(Step::at(3, None), None);
        assert_eq!(Step::at(5, Some(DataSourceType::Stage)), None);
        assert_eq!(
            Step::at(6, Some(DataSourceType::Table)),
            Some(Step::Table(TableStep::ConfigureIndexing))
        );
    }
}
