use crate::constants::CONTROL_DIR;
use crate::executor::CommandExecutor;
use serde::Serialize;
use std::path::Path;

/// remotes, local branches and the user's push/pull/checkout selection
///
/// after `reconcile` the selected indices always point into the lists, and
/// `push_remote`/`push_branch` are empty only when the matching list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryMetadata {
    pub remotes: Vec<String>,
    pub local_branches: Vec<String>,
    /// empty when HEAD is detached or unknown
    pub current_branch: String,
    pub selected_remote_index: usize,
    pub selected_branch_index: usize,
    pub push_remote: String,
    pub push_branch: String,
}

impl RepositoryMetadata {
    pub fn select_remote(&mut self, index: usize) {
        match clamp_index(index, self.remotes.len()) {
            Some(i) => {
                self.selected_remote_index = i;
                self.push_remote.clone_from(&self.remotes[i]);
            }
            None => {
                self.selected_remote_index = 0;
                self.push_remote.clear();
            }
        }
    }

    pub fn select_branch(&mut self, index: usize) {
        match clamp_index(index, self.local_branches.len()) {
            Some(i) => {
                self.selected_branch_index = i;
                self.push_branch.clone_from(&self.local_branches[i]);
            }
            None => {
                self.selected_branch_index = 0;
                self.push_branch.clear();
            }
        }
    }

    /// branch at the (clamped) selected index
    pub fn selected_branch(&self) -> Option<&str> {
        clamp_index(self.selected_branch_index, self.local_branches.len())
            .map(|i| self.local_branches[i].as_str())
    }
}

/// clamp into `[0, len - 1]`, or None for an empty list
pub fn clamp_index(index: usize, len: usize) -> Option<usize> {
    if len == 0 { None } else { Some(index.min(len - 1)) }
}

/// check the root has a git control directory (a file for linked worktrees)
pub fn has_control_dir(root: &Path) -> bool {
    !root.as_os_str().is_empty() && root.join(CONTROL_DIR).exists()
}

/// query remotes, branches and HEAD, then reconcile with the prior selection
///
/// a missing root is not an error, it just yields empty metadata
pub fn reload(
    executor: &dyn CommandExecutor,
    root: &Path,
    prior: &RepositoryMetadata,
    default_remote: &str,
) -> RepositoryMetadata {
    if !has_control_dir(root) {
        return RepositoryMetadata::default();
    }

    let remotes = query(executor, root, &["remote"])
        .map(|out| parse_remotes(&out))
        .unwrap_or_default();
    let branches = query(executor, root, &["branch", "--list", "--no-color"])
        .map(|out| parse_branches(&out))
        .unwrap_or_default();
    // fails when HEAD is detached
    let current = query(executor, root, &["symbolic-ref", "--quiet", "--short", "HEAD"])
        .map(|out| out.trim().to_string())
        .unwrap_or_default();

    reconcile(
        remotes,
        branches,
        current,
        &prior.push_remote,
        &prior.push_branch,
        default_remote,
    )
}

/// stdout of a read-only query, or None if it failed
fn query(executor: &dyn CommandExecutor, root: &Path, args: &[&str]) -> Option<String> {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    let result = executor.execute(&args, root);
    result.success().then_some(result.stdout)
}

/// combine query results with the previously chosen remote/branch
pub fn reconcile(
    mut remotes: Vec<String>,
    mut local_branches: Vec<String>,
    current_branch: String,
    prior_remote: &str,
    prior_branch: &str,
    default_remote: &str,
) -> RepositoryMetadata {
    // no remotes configured yet, offer the usual default
    if remotes.is_empty() {
        remotes.push(default_remote.to_string());
    }

    // HEAD names a branch the listing didn't give us (eg unborn branch)
    if local_branches.is_empty() && !current_branch.is_empty() {
        local_branches.push(current_branch.clone());
    }

    let remote_index = remotes
        .iter()
        .position(|r| r == prior_remote)
        .unwrap_or(0);

    let branch_index = local_branches
        .iter()
        .position(|b| b == prior_branch)
        .or_else(|| local_branches.iter().position(|b| *b == current_branch))
        .unwrap_or(0);

    let mut metadata = RepositoryMetadata {
        remotes,
        local_branches,
        current_branch,
        ..RepositoryMetadata::default()
    };
    metadata.select_remote(remote_index);
    metadata.select_branch(branch_index);
    metadata
}

/// `git remote` output, one name per line
pub fn parse_remotes(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// `git branch` output, stripping the current (`*`) and other-worktree (`+`) markers
pub fn parse_branches(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix(['*', '+']).unwrap_or(line).trim()
        })
        // skip "(HEAD detached at 1a2b3c)" and similar
        .filter(|name| !name.is_empty() && !name.starts_with('('))
        .map(ToString::to_string)
        .collect()
}
