//! # Playbook Core
//!
//! The search-service setup wizard and its mock search, free of I/O.
//!
//! This crate holds everything that can be decided without a file system,
//! a network, or a clock: the wizard record, the branching step sequence,
//! per-step readiness, step views and their derived updates, the static step
//! catalog, and the playground's filter builder and mock result sets.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`record`] | Wizard record and partial-update patch |
//! | [`steps`] | Visible step sequence and sidebar descriptors |
//! | [`validate`] | Per-step readiness |
//! | [`controller`] | Step navigation and completion handoff |
//! | [`view`] | Step dispatch, derived updates, text rendering |
//! | [`actions`] | Patches produced by step controls |
//! | [`catalog`] | Mock tables, stages, columns, models |
//! | [`target_lag`] | Refresh interval parsing and formatting |
//! | [`filter`] | Playground filter builder |
//! | [`search`] | Mock search and playground result sets |

pub mod actions;
pub mod catalog;
pub mod controller;
pub mod filter;
pub mod record;
pub mod search;
pub mod steps;
pub mod target_lag;
pub mod validate;
pub mod view;

pub use controller::{Advance, Navigator, WizardController};
pub use record::{DataSourceType, PipelineType, RecordDefaults, RecordPatch, WizardRecord};
