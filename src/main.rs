//! # Playbook CLI (`playbook`)
//!
//! Command-line companion to the search-service setup prototype.
//!
//! ## Usage
//!
//! ```bash
//! playbook --config ./config/playbook.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `playbook wizard steps` | Show the step sidebar for a data source |
//! | `playbook wizard run --answers <file>` | Drive the wizard and create a service |
//! | `playbook wizard services` | List created services |
//! | `playbook search "<query>"` | Query mock services in the playground |
//! | `playbook comments <action>` | Manage pinned review comments |
//! | `playbook github <action>` | Sign in and choose where feedback is filed |
//! | `playbook serve` | Start the OAuth relay server |
//! | `playbook create-prototype <name>` | Copy this prototype into `../<name>` |
//! | `playbook templates` | List prototype templates |
//!
//! ## Examples
//!
//! ```bash
//! # Walk the stage branch from an answers file
//! playbook wizard run --answers ./answers/stage.json
//!
//! # Compare both playground services with a filter
//! playbook search "billing" --service CHAT_CUSTOMER_TEST_CSS_A \
//!     --service CHAT_CUSTOMER_TEST_CSS_B --filter "CATEGORY:@eq:Billing"
//!
//! # Start a new prototype from the data explorer template
//! playbook create-prototype data-browser data-explorer
//! ```
//!
//! The config file is optional: without one, built-in defaults apply.

use clap::{Parser, Subcommand};
use playbook::{config, feedback, playground, scaffold, server, wizard_cmd};
use playbook_core::record::DataSourceType;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "playbook",
    about = "Playbook: search-service wizard prototype tooling",
    version,
    long_about = "Drive the Cortex Search setup wizard from the command line, query mock \
    services in the results playground, collect prototype feedback as GitHub issues, \
    and scaffold new prototypes."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/playbook.toml`. Built-in defaults are used
    /// when the file does not exist.
    #[arg(long, global = true, default_value = "./config/playbook.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with the service setup wizard.
    Wizard {
        #[command(subcommand)]
        action: WizardAction,
    },

    /// Query mock search services.
    ///
    /// Pass `--service` more than once to compare services side by side.
    Search {
        /// Case-insensitive substring matched against result content.
        #[arg(default_value = "")]
        query: String,

        /// Service to query (repeatable).
        #[arg(long = "service")]
        services: Vec<String>,

        /// Query the product catalog variant `A` or `B` instead of a service.
        #[arg(long, conflicts_with = "services")]
        variant: Option<String>,

        /// Maximum number of results per service.
        #[arg(long)]
        limit: Option<usize>,

        /// Columns to display for each result (repeatable).
        #[arg(long = "column")]
        columns: Vec<String>,

        /// Filter as `COLUMN:@op:value`; prefix with `!` to negate. Ops:
        /// `@eq`, `@contains`, `@gte`, `@lte`.
        #[arg(long = "filter", allow_hyphen_values = true)]
        filters: Vec<String>,

        /// Combine filters with `@or` instead of `@and`.
        #[arg(long)]
        or: bool,

        /// Show the score breakdown for each result.
        #[arg(long)]
        explain: bool,

        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,
    },

    /// Manage prototype review comments.
    Comments {
        #[command(subcommand)]
        action: CommentsAction,
    },

    /// Manage the GitHub session used to publish feedback.
    Github {
        #[command(subcommand)]
        action: GithubAction,
    },

    /// Start the OAuth relay server.
    ///
    /// Binds to `[server].bind`. Reads the client secret from the
    /// environment variable named by `[github].client_secret_env`.
    Serve,

    /// Copy the current prototype into a sibling directory.
    CreatePrototype {
        /// Name of the new prototype directory (created as `../<name>`).
        name: String,

        /// Template to specialise the copy for.
        #[arg(default_value = scaffold::DEFAULT_TEMPLATE)]
        template: String,
    },

    /// List prototype templates.
    Templates,
}

#[derive(Subcommand)]
enum WizardAction {
    /// Show the visible steps and which are completed.
    Steps {
        /// Data source chosen at step 2: `table` or `stage`.
        #[arg(long)]
        source: Option<DataSourceType>,

        /// Current step number.
        #[arg(long, default_value_t = 1)]
        current: usize,

        #[arg(long)]
        json: bool,
    },

    /// Drive the wizard with one answer per step.
    Run {
        /// JSON file of the form `{"steps": [{...}, ...]}`.
        #[arg(long)]
        answers: PathBuf,

        /// Print each step view before advancing.
        #[arg(long)]
        show_views: bool,
    },

    /// List services created by the wizard.
    Services,
}

#[derive(Subcommand)]
enum CommentsAction {
    /// List comments, optionally for one page.
    List {
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Pin a new comment to a page position.
    Add {
        #[arg(long)]
        page: String,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
        #[arg(long)]
        text: String,
        /// Human-readable description of where on the page.
        #[arg(long)]
        context: Option<String>,
    },
    /// Replace a comment's text.
    Edit {
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Reply to a comment. Mirrored to GitHub when the comment is published.
    Reply {
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Delete a comment.
    Delete { id: String },
    /// File a comment as a GitHub issue.
    Publish { id: String },
}

#[derive(Subcommand)]
enum GithubAction {
    /// Sign in. Without `--code`, prints the authorize URL.
    Login {
        /// Authorization code returned to the redirect URI.
        #[arg(long)]
        code: Option<String>,

        /// Relay server base URL. Defaults to `http://<server.bind>`.
        #[arg(long)]
        relay: Option<String>,

        #[arg(long, default_value = "http://localhost:5173")]
        redirect_uri: String,
    },
    /// Forget the signed-in session.
    Logout,
    /// Show who is signed in and where feedback goes.
    Status,
    /// Choose the repository feedback is filed against.
    Configure {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        repo: String,
        /// Personal access token used when not signed in.
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't need config
    if let Commands::Templates = cli.command {
        scaffold::run_templates();
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Wizard { action } => match action {
            WizardAction::Steps {
                source,
                current,
                json,
            } => {
                wizard_cmd::run_steps(&cfg, source, current, json)?;
            }
            WizardAction::Run {
                answers,
                show_views,
            } => {
                wizard_cmd::run_wizard(&cfg, &answers, show_views)?;
            }
            WizardAction::Services => {
                wizard_cmd::run_services(&cfg)?;
            }
        },
        Commands::Search {
            query,
            services,
            variant,
            limit,
            columns,
            filters,
            or,
            explain,
            json,
        } => {
            let args = playground::SearchArgs {
                query,
                services,
                variant,
                limit,
                columns,
                filters,
                logical: if or { "@or" } else { "@and" }.to_string(),
                explain,
                json,
            };
            playground::run_search(&cfg, args).await?;
        }
        Commands::Comments { action } => match action {
            CommentsAction::List { page, json } => {
                feedback::run_list(&cfg, page.as_deref(), json)?;
            }
            CommentsAction::Add {
                page,
                x,
                y,
                text,
                context,
            } => {
                feedback::run_add(
                    &cfg,
                    feedback::AddArgs {
                        page,
                        x,
                        y,
                        text,
                        context,
                    },
                )?;
            }
            CommentsAction::Edit { id, text } => {
                feedback::run_edit(&cfg, &id, &text)?;
            }
            CommentsAction::Reply { id, text } => {
                feedback::run_reply(&cfg, &id, &text).await?;
            }
            CommentsAction::Delete { id } => {
                feedback::run_delete(&cfg, &id)?;
            }
            CommentsAction::Publish { id } => {
                feedback::run_publish(&cfg, &id).await?;
            }
        },
        Commands::Github { action } => match action {
            GithubAction::Login {
                code,
                relay,
                redirect_uri,
            } => {
                feedback::run_login(&cfg, code.as_deref(), relay.as_deref(), &redirect_uri)
                    .await?;
            }
            GithubAction::Logout => {
                feedback::run_logout(&cfg)?;
            }
            GithubAction::Status => {
                feedback::run_status(&cfg)?;
            }
            GithubAction::Configure { owner, repo, token } => {
                feedback::run_configure(&cfg, &owner, &repo, token.as_deref())?;
            }
        },
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::CreatePrototype { name, template } => {
            scaffold::run_create_prototype(&cfg, &name, Some(template.as_str()))?;
        }
        Commands::Templates => {}
    }

    Ok(())
}
