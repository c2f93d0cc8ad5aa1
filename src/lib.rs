//! # Playbook
//!
//! Tooling around a clickable prototype of the Cortex Search service setup
//! wizard: drive the wizard from the command line, query mock search
//! services in the results playground, collect reviewer comments and file
//! them as GitHub issues, and scaffold new prototypes.
//!
//! The wizard itself (record, step graph, validation, views) and the mock
//! search live in the I/O-free `playbook-core` crate. This crate adds
//! configuration, storage, the GitHub OAuth relay, and the CLI commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   ┌────────────────┐   ┌─────────────┐
//! │ playbook-core  │──▶│  CLI commands  │──▶│  FileStore   │
//! │ wizard/search  │   │ wizard/search/ │   │ <key>.json   │
//! └────────────────┘   │ comments       │   └─────────────┘
//!                      └───────┬────────┘
//!                              │ code
//!                              ▼
//!                      ┌────────────────┐   ┌─────────────┐
//!                      │  relay server  │──▶│   GitHub    │
//!                      │ /api/github-*  │   │ OAuth + API │
//!                      └────────────────┘   └─────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`storage`] | Key/value persistence of JSON blobs |
//! | [`comments`] | Pinned comment threads |
//! | [`github`] | OAuth token exchange and issue publishing |
//! | [`server`] | OAuth relay and playground HTTP server |
//! | [`playground`] | Side-by-side mock search |
//! | [`wizard_cmd`] | Wizard commands and created-service summaries |
//! | [`feedback`] | Comment and GitHub session commands |
//! | [`scaffold`] | Prototype scaffolding |

pub mod comments;
pub mod config;
pub mod feedback;
pub mod github;
pub mod playground;
pub mod scaffold;
pub mod server;
pub mod storage;
pub mod wizard_cmd;
