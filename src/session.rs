use crate::constants::{DEFAULT_GUI_COMMAND, DEFAULT_REMOTE};
use crate::executor::{CommandExecutor, OperationResult, display_command};
use crate::metadata::{self, RepositoryMetadata};
use crate::status::{self, FileStatusEntry};
use crate::warnings::is_benign;
use crate::{info, warning};
use std::path::{Path, PathBuf};

/// where status rows and diffs get shown
pub trait DisplaySurface {
    fn show_entries(&mut self, entries: &[FileStatusEntry]);

    fn show_diff(&mut self, title: &str, text: &str);
}

/// result of one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// the failure description is in `Session::last_error`
    Failed,
    /// blocked before any command ran, with a notice for the user
    Refused(String),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub default_remote: String,
    /// argv of the external gui tool, program first
    pub gui_command: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_remote: DEFAULT_REMOTE.to_string(),
            gui_command: DEFAULT_GUI_COMMAND
                .split_whitespace()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// state of one open panel: repository root, status rows, selection and the last error
///
/// every action runs at most one mutating git command, blocking until it exits,
/// then refreshes whatever it may have made stale.
pub struct Session<E: CommandExecutor> {
    executor: E,
    options: SessionOptions,
    root: PathBuf,
    pub entries: Vec<FileStatusEntry>,
    pub metadata: RepositoryMetadata,
    /// most recent failure, overwritten by every action
    pub last_error: Option<String>,
    pub commit_message: String,
}

impl<E: CommandExecutor> Session<E> {
    pub fn new(executor: E, options: SessionOptions) -> Self {
        Self {
            executor,
            options,
            root: PathBuf::new(),
            entries: Vec::new(),
            metadata: RepositoryMetadata::default(),
            last_error: None,
            commit_message: String::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(test)]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// point the session at a repository root and load everything fresh
    pub fn set_repository(&mut self, root: impl Into<PathBuf>) -> Outcome {
        self.root = root.into();
        self.entries.clear();
        self.metadata = RepositoryMetadata::default();
        self.reload_metadata();
        self.refresh_status()
    }

    pub fn refresh_status(&mut self) -> Outcome {
        self.last_error = None;
        match self.load_status() {
            Ok(entries) => {
                self.entries = entries;
                Outcome::Succeeded
            }
            Err(e) => {
                self.entries.clear();
                self.last_error = Some(e);
                Outcome::Failed
            }
        }
    }

    pub fn reload_metadata(&mut self) {
        self.metadata = metadata::reload(
            &self.executor,
            &self.root,
            &self.metadata,
            &self.options.default_remote,
        );
    }

    pub fn select_remote(&mut self, index: usize) {
        self.metadata.select_remote(index);
    }

    pub fn select_branch(&mut self, index: usize) {
        self.metadata.select_branch(index);
    }

    /// select a local branch by name, returns false if there is no such branch
    pub fn select_branch_named(&mut self, name: &str) -> bool {
        match self.metadata.local_branches.iter().position(|b| b == name) {
            Some(index) => {
                self.metadata.select_branch(index);
                true
            }
            None => false,
        }
    }

    /// select a remote by name, returns false if there is no such remote
    pub fn select_remote_named(&mut self, name: &str) -> bool {
        match self.metadata.remotes.iter().position(|r| r == name) {
            Some(index) => {
                self.metadata.select_remote(index);
                true
            }
            None => false,
        }
    }

    pub fn render(&self, surface: &mut dyn DisplaySurface) {
        surface.show_entries(&self.entries);
    }

    pub fn stage(&mut self, path: &str) -> Outcome {
        let outcome = self.run_in_repo(path_args(&["add"], path));
        self.follow_up(outcome, false)
    }

    pub fn unstage(&mut self, path: &str) -> Outcome {
        let outcome = self.run_in_repo(path_args(&["reset", "-q"], path));
        self.follow_up(outcome, false)
    }

    pub fn stage_all(&mut self) -> Outcome {
        let outcome = self.run_in_repo(to_args(&["add", "-A"]));
        self.follow_up(outcome, false)
    }

    pub fn commit(&mut self) -> Outcome {
        if self.commit_message.trim().is_empty() {
            return Outcome::Refused("commit message is empty".to_string());
        }

        let args = to_args(&["commit", "-m", self.commit_message.as_str()]);
        let outcome = self.run_in_repo(args);
        if outcome == Outcome::Succeeded {
            self.commit_message.clear();
        }
        self.follow_up(outcome, true)
    }

    pub fn push(&mut self) -> Outcome {
        let args = remote_args(
            "push",
            &self.metadata.push_remote,
            &self.metadata.push_branch,
        );
        self.run_in_repo(args)
    }

    pub fn pull(&mut self) -> Outcome {
        let args = remote_args(
            "pull",
            &self.metadata.push_remote,
            &self.metadata.push_branch,
        );
        let outcome = self.run_in_repo(args);
        self.follow_up(outcome, true)
    }

    /// check out the selected branch; status and metadata are reloaded either way
    pub fn checkout(&mut self) -> Outcome {
        let outcome = match self.metadata.selected_branch().map(ToString::to_string) {
            Some(branch) => self.run_in_repo(to_args(&["checkout", branch.as_str()])),
            None => {
                self.last_error = Some(
                    self.require_repository()
                        .err()
                        .unwrap_or_else(|| "no branch selected to check out".to_string()),
                );
                Outcome::Failed
            }
        };
        self.follow_up(outcome, true)
    }

    /// show the diff for one path; failures only land in `last_error`
    ///
    /// a path changed in both the index and the work tree shows the staged diff
    /// followed by the unstaged one
    pub fn diff(&mut self, path: &str, surface: &mut dyn DisplaySurface) -> Outcome {
        let entry = self
            .entries
            .iter()
            .find(|e| e.target_path() == path || e.path == path);
        // staged changes need --cached to show anything
        let staged = entry.is_some_and(FileStatusEntry::is_staged);
        let unstaged = !staged || entry.is_some_and(|e| !e.work_tree_state.is_whitespace());

        let mut commands = Vec::new();
        if staged {
            commands.push(path_args(&["diff", "--cached"], path));
        }
        if unstaged {
            commands.push(path_args(&["diff"], path));
        }

        self.last_error = None;
        if let Err(e) = self.require_repository() {
            self.entries.clear();
            self.last_error = Some(e);
            return Outcome::Failed;
        }

        let mut text = String::new();
        for args in &commands {
            let result = self.executor.execute(args, &self.root);
            if !result.success() {
                let message = failure_message(args, &result);
                warning!("diff unavailable: {}", message);
                self.last_error = Some(message);
                return Outcome::Failed;
            }
            text.push_str(&result.stdout);
        }

        let title = match (staged, unstaged) {
            (true, true) => format!("{path} (staged and unstaged)"),
            (true, false) => format!("{path} (staged)"),
            _ => path.to_string(),
        };
        surface.show_diff(&title, &text);
        Outcome::Succeeded
    }

    /// launch the external gui tool without waiting for it
    pub fn open_gui(&mut self) -> Outcome {
        self.last_error = None;
        if let Err(e) = self.require_repository() {
            self.entries.clear();
            self.last_error = Some(e);
            return Outcome::Failed;
        }

        match self
            .executor
            .execute_detached(&self.options.gui_command, &self.root)
        {
            Ok(()) => Outcome::Succeeded,
            Err(e) => {
                self.last_error = Some(e);
                Outcome::Failed
            }
        }
    }

    fn load_status(&self) -> Result<Vec<FileStatusEntry>, String> {
        self.require_repository()?;

        let args = to_args(&["status", "--porcelain"]);
        let result = self.executor.execute(&args, &self.root);
        if result.success() {
            Ok(status::parse(&result.stdout))
        } else {
            Err(failure_message(&args, &result))
        }
    }

    fn require_repository(&self) -> Result<(), String> {
        if metadata::has_control_dir(&self.root) {
            Ok(())
        } else if self.root.as_os_str().is_empty() {
            Err("no repository selected".to_string())
        } else {
            Err(format!("not a git repository: {}", self.root.display()))
        }
    }

    /// run one command against the repository and record the outcome in `last_error`
    fn run_in_repo(&mut self, args: Vec<String>) -> Outcome {
        self.last_error = None;
        if let Err(e) = self.require_repository() {
            self.entries.clear();
            self.last_error = Some(e);
            return Outcome::Failed;
        }

        let result = self.executor.execute(&args, &self.root);
        if !result.success() {
            self.last_error = Some(failure_message(&args, &result));
            return Outcome::Failed;
        }

        // git reports progress and line ending notices on stderr even on success
        let stderr = result.stderr.trim();
        if is_benign(stderr) {
            info!("{}", stderr);
        } else if !stderr.is_empty() {
            warning!("{}", stderr);
        }
        Outcome::Succeeded
    }

    /// refresh after an action, keeping the action's own error if it failed
    fn follow_up(&mut self, outcome: Outcome, with_metadata: bool) -> Outcome {
        match self.load_status() {
            Ok(entries) => self.entries = entries,
            Err(e) => {
                self.entries.clear();
                if outcome == Outcome::Succeeded {
                    self.last_error = Some(e);
                }
            }
        }
        if with_metadata {
            self.reload_metadata();
        }
        outcome
    }
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

/// `<base> -- <path>`, the separator keeps paths like "-x" from reading as options
pub fn path_args(base: &[&str], path: &str) -> Vec<String> {
    let mut args = to_args(base);
    args.push("--".to_string());
    args.push(path.to_string());
    args
}

/// `<verb> [<remote> [<branch>]]`, letting git use the tracking branch when unset
pub fn remote_args(verb: &str, remote: &str, branch: &str) -> Vec<String> {
    let mut args = vec![verb.to_string()];
    if !remote.is_empty() {
        args.push(remote.to_string());
        if !branch.is_empty() {
            args.push(branch.to_string());
        }
    }
    args
}

/// user-facing description of a failed command
fn failure_message(args: &[String], result: &OperationResult) -> String {
    let stderr = result.stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = result.stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    format!(
        "{} exited with code {}",
        display_command("git", args),
        result.exit_code
    )
}

#[cfg(test)]
mod tests;
