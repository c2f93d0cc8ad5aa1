//! The wizard controller.
//!
//! [`WizardController`] owns the record and the current step number and is
//! the only thing that moves between steps. Everything it shows is derived
//! from those two values: the step sidebar, readiness, button labels, and the
//! step view. Leaving the wizard (on completion or cancel) goes through an
//! injected [`Navigator`].
//!
//! ```rust
//! use playbook_core::controller::{Advance, RecordingNavigator, WizardController};
//! use playbook_core::record::{RecordDefaults, RecordPatch};
//!
//! let mut wizard = WizardController::new(RecordDefaults::default(), RecordingNavigator::default());
//! assert_eq!(wizard.next(), Advance::Blocked);
//! wizard.update(RecordPatch::new().service_name("S").warehouse("W"));
//! assert_eq!(wizard.next(), Advance::Moved { to: 2 });
//! ```

use crate::record::{DataSourceType, RecordDefaults, RecordPatch, WizardRecord};
use crate::steps::{self, Step, StepDescriptor};
use crate::validate;
use crate::view::{self, StepView};

/// Label of the advance control on the last step.
pub const CREATE_LABEL: &str = "Create Search Service";

/// Where the wizard goes when it is left.
pub trait Navigator {
    /// Called once when the last step is submitted, with the finished record.
    fn service_created(&mut self, record: &WizardRecord);

    /// Called when the user leaves the wizard without finishing.
    fn cancelled(&mut self) {}
}

/// A navigator that remembers what happened. Useful for tests and for
/// callers that inspect the outcome after driving the wizard.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingNavigator {
    pub created: Vec<WizardRecord>,
    pub cancelled: usize,
}

impl Navigator for RecordingNavigator {
    fn service_created(&mut self, record: &WizardRecord) {
        self.created.push(record.clone());
    }

    fn cancelled(&mut self) {
        self.cancelled += 1;
    }
}

/// Outcome of [`WizardController::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { to: usize },
    Completed,
    Blocked,
}

pub struct WizardController<N: Navigator> {
    current_step: usize,
    record: WizardRecord,
    defaults: RecordDefaults,
    navigator: N,
    completed: bool,
}

impl<N: Navigator> WizardController<N> {
    pub fn new(defaults: RecordDefaults, navigator: N) -> Self {
        let record = WizardRecord::new(&defaults);
        let mut controller = Self {
            current_step: 1,
            record,
            defaults,
            navigator,
            completed: false,
        };
        controller.enter_view();
        controller
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step(&self) -> Option<Step> {
        Step::at(self.current_step, self.record.data_source_type)
    }

    pub fn record(&self) -> &WizardRecord {
        &self.record
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }

    /// True once the record has been handed to the navigator. Navigation
    /// and updates are ignored until [`restart`](Self::restart).
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn source(&self) -> Option<DataSourceType> {
        self.record.data_source_type
    }

    /// The visible steps, marked completed when before the current one.
    pub fn steps(&self) -> Vec<StepDescriptor> {
        steps::descriptors(self.current_step, self.source())
    }

    pub fn can_advance(&self) -> bool {
        validate::can_advance(self.current_step, &self.record)
    }

    /// Fields still blocking the current step.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self.step() {
            Some(step) => validate::missing_fields(step, &self.record),
            None => Vec::new(),
        }
    }

    pub fn is_last_step(&self) -> bool {
        self.source().is_some() && self.current_step == steps::last_step(self.source())
    }

    pub fn next_label(&self) -> String {
        if self.is_last_step() {
            return CREATE_LABEL.to_string();
        }
        match Step::at(self.current_step + 1, self.source()) {
            Some(next) => format!("Next: {}", next.title()),
            None => "Next".to_string(),
        }
    }

    pub fn previous_label(&self) -> Option<String> {
        if self.current_step <= 1 {
            return None;
        }
        Some(match Step::at(self.current_step - 1, self.source()) {
            Some(prev) => format!("Previous: {}", prev.title()),
            None => "Previous".to_string(),
        })
    }

    pub fn view(&self) -> StepView {
        view::dispatch(self.current_step, self.source())
    }

    /// Move forward, or hand the record to the navigator on the last step.
    /// Does nothing while the current step is incomplete or after completion.
    pub fn next(&mut self) -> Advance {
        if self.completed || !self.can_advance() {
            return Advance::Blocked;
        }
        if self.is_last_step() {
            self.completed = true;
            self.navigator.service_created(&self.record);
            return Advance::Completed;
        }
        self.current_step += 1;
        self.enter_view();
        Advance::Moved {
            to: self.current_step,
        }
    }

    /// Move back one step. Returns false on the first step.
    pub fn previous(&mut self) -> bool {
        if self.completed || self.current_step <= 1 {
            return false;
        }
        self.current_step -= 1;
        self.enter_view();
        true
    }

    /// Jump to an already visited step. Forward jumps are ignored.
    pub fn go_to_step(&mut self, n: usize) -> bool {
        if self.completed || n < 1 || n > self.current_step {
            return false;
        }
        if n != self.current_step {
            self.current_step = n;
            self.enter_view();
        }
        true
    }

    /// Leave the wizard without finishing. The current step is unchanged.
    pub fn cancel(&mut self) {
        self.navigator.cancelled();
    }

    /// Shallow-merge `patch` into the record.
    ///
    /// The data source type decides which steps exist, so a change to it is
    /// dropped once the wizard is past the Select data step.
    pub fn update(&mut self, mut patch: RecordPatch) {
        if self.completed {
            return;
        }
        if self.current_step > 2 {
            if let Some(requested) = patch.source.data_source_type {
                if Some(requested) != self.source() {
                    patch.source.data_source_type = None;
                }
            }
        }
        self.record.apply(patch);
        if let Some(derived) = self.view().on_change(&self.record) {
            self.record.apply(derived);
        }
    }

    /// Discard everything and start again from step 1 with fresh defaults.
    pub fn restart(&mut self) {
        self.record = WizardRecord::new(&self.defaults);
        self.current_step = 1;
        self.completed = false;
        self.enter_view();
    }

    fn enter_view(&mut self) {
        if let Some(derived) = self.view().on_enter(&self.record) {
            self.record.apply(derived);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PipelineType, SearchColumn};

    fn wizard() -> WizardController<RecordingNavigator> {
        WizardController::new(RecordDefaults::default(), RecordingNavigator::default())
    }

    fn past_step_one(w: &mut WizardController<RecordingNavigator>) {
        w.update(RecordPatch::new().service_name("S").warehouse("W"));
        assert_eq!(w.next(), Advance::Moved { to: 2 });
    }

    #[test]
    fn test_blocked_next_is_noop() {
        let mut w = wizard();
        assert!(!w.can_advance());
        assert_eq!(w.next(), Advance::Blocked);
        assert_eq!(w.current_step(), 1);
    }

    #[test]
    fn test_labels() {
        let mut w = wizard();
        assert_eq!(w.next_label(), "Next: Select data");
        assert_eq!(w.previous_label(), None);

        past_step_one(&mut w);
        assert_eq!(w.next_label(), "Next");
        assert_eq!(w.previous_label().as_deref(), Some("Previous: New service"));

        w.update(RecordPatch::new().data_source_type(DataSourceType::Table));
        assert_eq!(w.next_label(), "Next: Select search columns");

        w.update(RecordPatch::new().data_source_type(DataSourceType::Stage));
        assert_eq!(w.next_label(), "Next: Choose processing pipeline");
    }

    #[test]
    fn test_previous_on_first_step() {
        let mut w = wizard();
        assert!(!w.previous());
        assert_eq!(w.current_step(), 1);
    }

    #[test]
    fn test_go_to_step_bounds() {
        let mut w = wizard();
        past_step_one(&mut w);
        assert!(!w.go_to_step(3));
        assert!(!w.go_to_step(0));
        assert_eq!(w.current_step(), 2);
        assert!(w.go_to_step(1));
        assert_eq!(w.current_step(), 1);
    }

    #[test]
    fn test_source_type_frozen_after_step_two() {
        let mut w = wizard();
        past_step_one(&mut w);
        w.update(
            RecordPatch::new()
                .data_source_type(DataSourceType::Table)
                .selected_table("CSS_SCRAPE"),
        );
        w.next();
        assert_eq!(w.current_step(), 3);

        w.update(
            RecordPatch::new()
                .data_source_type(DataSourceType::Stage)
                .search_columns(vec![SearchColumn::text("CONTENT")]),
        );
        assert_eq!(w.record().data_source_type, Some(DataSourceType::Table));
        assert_eq!(w.record().search_columns.len(), 1);
        assert_eq!(w.steps().len(), 6);
    }

    #[test]
    fn test_source_type_free_on_step_two() {
        let mut w = wizard();
        past_step_one(&mut w);
        w.update(RecordPatch::new().data_source_type(DataSourceType::Table));
        w.update(RecordPatch::new().data_source_type(DataSourceType::Stage));
        assert_eq!(w.record().data_source_type, Some(DataSourceType::Stage));
        assert_eq!(w.steps().len(), 4);
    }

    #[test]
    fn test_cancel_keeps_step() {
        let mut w = wizard();
        past_step_one(&mut w);
        w.cancel();
        assert_eq!(w.current_step(), 2);
        assert_eq!(w.navigator().cancelled, 1);
        assert!(w.navigator().created.is_empty());
    }

    #[test]
    fn test_visual_forcing_reapplied_on_update() {
        let mut w = wizard();
        past_step_one(&mut w);
        w.update(
            RecordPatch::new()
                .data_source_type(DataSourceType::Stage)
                .selected_files(["readme.pdf"]),
        );
        w.next();
        w.update(RecordPatch::new().pipeline_type(PipelineType::Visual));
        w.next();
        assert_eq!(w.current_step(), 4);
        assert_eq!(w.record().embedding_model, "voyage-multimodal-3");

        w.update(RecordPatch::new().embedding_model("e5-base-v2"));
        assert_eq!(w.record().embedding_model, "voyage-multimodal-3");
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut w = wizard();
        past_step_one(&mut w);
        w.update(RecordPatch::new().data_source_type(DataSourceType::Table));
        w.restart();
        assert_eq!(w.current_step(), 1);
        assert_eq!(w.record(), &WizardRecord::default());
    }
}
