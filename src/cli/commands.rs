use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

const VERSION: &str = env!("GIT_VERSION");

#[derive(Parser)]
#[command(
    name = "tasktree",
    version = VERSION,
    about = "Hierarchical task manager with time-boxed shareable snapshots",
    after_help = "\
NOTE:
  Data lives in the platform config dir (override with TASKTREE_DATA_DIR).
  Run `tasktree init` before any other command.

EXIT CODES:
  0  Success
  1  Error (storage, validation, unknown task, cycle, etc.)
  2  No data (share token unknown or expired)

BEHAVIOR NOTES:
  `task delete` removes the task together with its whole subtree.
  `task toggle` flips exactly one task; completion never cascades.
  `prioritize on` reorders and labels the entire collection; `prioritize off`
  clears the labels but does not restore the previous ordering.
  `import` appends verbatim: importing the same export twice duplicates tasks.
  Shares expire 7 days after creation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn as_bool(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the tasktree data store
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Turn urgency-based prioritization of the collection on or off
    Prioritize {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Persisted view filters shaping `task list`
    #[command(subcommand)]
    View(ViewCommands),

    /// Time-boxed shareable snapshots
    #[command(subcommand)]
    Share(ShareCommands),

    /// Export the full task list as a JSON document
    Export {
        /// Write to this file (or into this directory under a timestamped
        /// name) instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Append tasks from a JSON export (stdin when no file is given)
    Import {
        file: Option<PathBuf>,
    },

    /// Collection statistics
    Stats,

    /// Application settings
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task (or a subtask, with --parent)
    Add {
        /// Task title
        title: String,

        /// Due date: YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: String,

        #[arg(long)]
        description: Option<String>,

        /// Parent task id; makes this a subtask
        #[arg(long)]
        parent: Option<String>,

        /// Tag label; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List tasks as a tree, with the persisted filters applied
    List,

    /// Show task details
    Show {
        id: String,
    },

    /// Update fields of an existing task
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Due date: YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: Option<String>,
        /// Reparent under this task id
        #[arg(long)]
        parent: Option<String>,
    },

    /// Flip a task's completed flag
    Toggle {
        id: String,
    },

    /// Delete a task and its entire subtree
    Delete {
        id: String,
    },

    /// List a task's subtasks (direct children, or the whole subtree)
    Subtasks {
        id: String,
        /// Include transitive descendants, parent before children
        #[arg(long)]
        all: bool,
    },

    /// Generate template-derived subtasks for a task
    #[command(after_help = "\
NOTE:
  Deterministic simulated assistance: the template is picked by substring
  match on the title (project / write, article / develop, code / default)
  and generated subtasks are due 1, 2, ... days out.")]
    Suggest {
        id: String,
        /// Number of subtasks to generate
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=5))]
        depth: u8,
        /// Generate from this text instead of the task's own title
        #[arg(long)]
        title: Option<String>,
    },

    /// Manage task tags
    #[command(subcommand)]
    Tag(TagCommands),

    /// Record a file attachment on a task
    Attach {
        id: String,
        path: PathBuf,
    },

    /// Remove a recorded attachment by name
    Detach {
        id: String,
        name: String,
    },

    /// Delete every task
    Clear,
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Add a tag to a task (duplicates are ignored)
    Add {
        id: String,
        tag: String,
    },
    /// Remove a tag from a task
    Remove {
        id: String,
        tag: String,
    },
}

#[derive(Subcommand)]
pub enum ViewCommands {
    /// Hide or show completed tasks in list views
    HideCompleted {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Replace the selected-tags filter (no tags clears it)
    Tags {
        tags: Vec<String>,
    },
    /// Set the search filter (no argument clears it)
    Search {
        query: Option<String>,
    },
    /// Show the persisted filters
    Show,
}

#[derive(Subcommand)]
pub enum ShareCommands {
    /// Snapshot a task and its subtree into a share token
    Create {
        id: String,
    },
    /// Fetch a shared snapshot by token
    Show {
        token: String,
    },
    /// Append a shared snapshot's tasks into this collection
    Import {
        token: String,
    },
    /// Delete every expired share record
    Cleanup,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Toggle minimalist mode
    Minimalist {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Show current settings
    Show,
}
