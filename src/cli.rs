use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// git-panel: a small terminal panel for git status, staging, commits and branches
#[derive(Parser, Debug)]
#[command(
    name = "git-panel",
    about,
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// repository root (defaults to the repository containing the current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// config file (defaults to <config dir>/git-panel/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// interactive panel (default)
    Panel,

    /// list changed files
    Status {
        /// print entries as json
        #[arg(long)]
        json: bool,
    },

    /// stage one path
    Stage { path: String },

    /// unstage one path
    Unstage { path: String },

    /// stage every change, including untracked and deleted files
    StageAll,

    /// show the diff for one path
    Diff { path: String },

    /// commit staged changes ($EDITOR is opened when no message is given)
    Commit {
        #[arg(short, long)]
        message: Option<String>,
    },

    /// push to the selected remote/branch
    Push(RemoteArgs),

    /// pull from the selected remote/branch
    Pull(RemoteArgs),

    /// check out a local branch
    Checkout { branch: String },

    /// list remotes and local branches
    Branches {
        /// print metadata as json
        #[arg(long)]
        json: bool,
    },

    /// launch the configured gui tool
    Gui,
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct RemoteArgs {
    /// remote name (defaults to the first remote)
    #[arg(long)]
    pub remote: Option<String>,

    /// local branch name (defaults to the current branch)
    #[arg(long)]
    pub branch: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
