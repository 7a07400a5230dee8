use super::*;
use crate::constants::GIT_PROGRAM;
use crate::executor::GitCli;
use git2::Repository;
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;

/// executor that records calls and answers from a script of (args prefix, result)
#[derive(Default)]
struct ScriptedExecutor {
    responses: Vec<(String, OperationResult)>,
    calls: RefCell<Vec<Vec<String>>>,
    detached: RefCell<Vec<Vec<String>>>,
    detached_error: Option<String>,
}

impl ScriptedExecutor {
    fn respond(mut self, prefix: &str, stdout: &str, stderr: &str, exit_code: i32) -> Self {
        self.responses.push((
            prefix.to_string(),
            OperationResult {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code,
            },
        ));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|args| args.join(" ")).collect()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&self, args: &[String], _dir: &Path) -> OperationResult {
        let line = args.join(" ");
        self.calls.borrow_mut().push(args.to_vec());
        self.responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default()
    }

    fn execute_detached(&self, command: &[String], _dir: &Path) -> Result<(), String> {
        self.detached.borrow_mut().push(command.to_vec());
        match &self.detached_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct RecordingSurface {
    entries: Vec<FileStatusEntry>,
    diffs: Vec<(String, String)>,
}

impl DisplaySurface for RecordingSurface {
    fn show_entries(&mut self, entries: &[FileStatusEntry]) {
        self.entries = entries.to_vec();
    }

    fn show_diff(&mut self, title: &str, text: &str) {
        self.diffs.push((title.to_string(), text.to_string()));
    }
}

/// helper to create a directory that looks like a repository to the session
fn fake_repo_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join(".git")).unwrap();
    temp_dir
}

/// helper to build a scripted session pointed at a fake repository
fn scripted_session(executor: ScriptedExecutor) -> (TempDir, Session<ScriptedExecutor>) {
    let temp_dir = fake_repo_dir();
    let mut session = Session::new(executor, SessionOptions::default());
    session.set_repository(temp_dir.path());
    session.executor().calls.borrow_mut().clear();
    (temp_dir, session)
}

fn default_script() -> ScriptedExecutor {
    ScriptedExecutor::default()
        .respond("remote", "origin\nupstream\n", "", 0)
        .respond("branch", "  develop\n* main\n", "", 0)
        .respond("symbolic-ref", "main\n", "", 0)
        .respond("status", "M  src/a.cs\n?? src/new.cs\n", "", 0)
}

#[test]
fn test_set_repository_loads_status_and_metadata() {
    let (_temp_dir, session) = scripted_session(default_script());

    assert_eq!(session.entries.len(), 2);
    assert_eq!(session.entries[0].path, "src/a.cs");
    assert!(session.entries[0].is_staged());
    assert_eq!(session.entries[1].combined_code(), "??");
    assert_eq!(session.metadata.remotes, vec!["origin", "upstream"]);
    assert_eq!(session.metadata.current_branch, "main");
    assert_eq!(session.metadata.push_remote, "origin");
    assert_eq!(session.metadata.push_branch, "main");
    assert_eq!(session.metadata.selected_branch_index, 1);
    assert_eq!(session.last_error, None);
}

#[test]
fn test_render_shows_entries() {
    let (_temp_dir, session) = scripted_session(default_script());
    let mut surface = RecordingSurface::default();

    session.render(&mut surface);

    assert_eq!(surface.entries, session.entries);
}

#[test]
fn test_commit_with_blank_message_is_refused() {
    let (_temp_dir, mut session) = scripted_session(default_script());
    session.commit_message = "   \n\t".to_string();

    let outcome = session.commit();

    assert!(matches!(outcome, Outcome::Refused(_)));
    assert!(session.executor().calls().is_empty());
    assert_eq!(session.last_error, None);
    assert_eq!(session.commit_message, "   \n\t");
}

#[test]
fn test_commit_success_clears_message_and_reloads() {
    let (_temp_dir, mut session) = scripted_session(default_script());
    session.commit_message = "add player controller".to_string();

    let outcome = session.commit();

    assert_eq!(outcome, Outcome::Succeeded);
    assert!(session.commit_message.is_empty());
    let calls = session.executor().calls();
    assert_eq!(calls[0], "commit -m add player controller");
    assert!(calls.iter().any(|c| c.starts_with("status")));
    assert!(calls.iter().any(|c| c.starts_with("remote")));
    assert!(calls.iter().any(|c| c.starts_with("symbolic-ref")));
}

#[test]
fn test_commit_failure_keeps_message() {
    let script = default_script().respond("commit", "", "nothing added to commit\n", 1);
    let (_temp_dir, mut session) = scripted_session(script);
    session.commit_message = "wip".to_string();

    let outcome = session.commit();

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(session.commit_message, "wip");
    assert_eq!(
        session.last_error.as_deref(),
        Some("nothing added to commit")
    );
}

#[test]
fn test_benign_stderr_is_not_an_error() {
    let script = default_script().respond(
        "add",
        "",
        "warning: LF will be replaced by CRLF in src/a.cs.\nThe file will have its original line endings in your working directory\n",
        0,
    );
    let (_temp_dir, mut session) = scripted_session(script);

    let outcome = session.stage("src/a.cs");

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(session.last_error, None);
}

#[test]
fn test_failure_without_output_names_the_command() {
    let script = default_script().respond("add", "", "", 128);
    let (_temp_dir, mut session) = scripted_session(script);

    session.stage("src/a.cs");

    let error = session.last_error.clone().unwrap();
    assert!(error.contains("git add -- src/a.cs"), "error: {error}");
    assert!(error.contains("128"));
}

#[test]
fn test_stage_failure_still_refreshes_status() {
    let script = default_script().respond(
        "add",
        "",
        "fatal: pathspec 'nope' did not match any files",
        128,
    );
    let (_temp_dir, mut session) = scripted_session(script);

    let outcome = session.stage("nope");

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(
        session.executor().calls(),
        vec!["add -- nope", "status --porcelain"]
    );
    assert!(session.last_error.as_deref().unwrap().contains("pathspec"));
    assert_eq!(session.entries.len(), 2);
}

#[test]
fn test_stage_unstage_and_stage_all_arguments() {
    let (_temp_dir, mut session) = scripted_session(default_script());

    session.stage("Assets/My Scene.unity");
    session.unstage("-odd-name.txt");
    session.stage_all();

    let calls = session.executor().calls.borrow().clone();
    assert_eq!(calls[0], vec!["add", "--", "Assets/My Scene.unity"]);
    assert_eq!(calls[2], vec!["reset", "-q", "--", "-odd-name.txt"]);
    assert_eq!(calls[4], vec!["add", "-A"]);
}

#[test]
fn test_last_error_is_overwritten_by_next_action() {
    let script = default_script().respond("add -- bad", "", "fatal: bad path", 128);
    let (_temp_dir, mut session) = scripted_session(script);

    session.stage("bad");
    assert!(session.last_error.is_some());

    session.stage("good");
    assert_eq!(session.last_error, None);
}

#[test]
fn test_push_and_pull_arguments() {
    assert_eq!(remote_args("push", "origin", "").join(" "), "push origin");
    assert_eq!(
        remote_args("push", "origin", "feature/x").join(" "),
        "push origin feature/x"
    );
    assert_eq!(remote_args("push", "", "").join(" "), "push");
    // a branch alone can't be passed without a remote
    assert_eq!(remote_args("pull", "", "main").join(" "), "pull");
}

#[test]
fn test_push_uses_selection() {
    let (_temp_dir, mut session) = scripted_session(default_script());
    session.select_remote(1);
    session.select_branch(0);

    let outcome = session.push();

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(session.executor().calls(), vec!["push upstream develop"]);
}

#[test]
fn test_push_progress_on_stderr_is_success() {
    let script = default_script().respond(
        "push",
        "",
        "To example.com:game.git\n   1a2b3c4..5d6e7f8  main -> main\n",
        0,
    );
    let (_temp_dir, mut session) = scripted_session(script);

    assert_eq!(session.push(), Outcome::Succeeded);
    assert_eq!(session.last_error, None);
}

#[test]
fn test_pull_failure_reports_error_and_reloads() {
    let script = default_script().respond("pull", "", "fatal: couldn't find remote ref main", 1);
    let (_temp_dir, mut session) = scripted_session(script);

    let outcome = session.pull();

    assert_eq!(outcome, Outcome::Failed);
    assert!(session.last_error.as_deref().unwrap().contains("remote ref"));
    let calls = session.executor().calls();
    assert_eq!(calls[0], "pull origin main");
    assert!(calls.iter().any(|c| c.starts_with("branch")));
}

#[test]
fn test_checkout_uses_selected_branch_and_reloads_on_failure() {
    let script = default_script().respond(
        "checkout",
        "",
        "error: Your local changes would be overwritten by checkout",
        1,
    );
    let (_temp_dir, mut session) = scripted_session(script);
    session.select_branch(0);

    let outcome = session.checkout();

    assert_eq!(outcome, Outcome::Failed);
    let calls = session.executor().calls();
    assert_eq!(calls[0], "checkout develop");
    assert!(calls.iter().any(|c| c.starts_with("status")));
    assert!(calls.iter().any(|c| c.starts_with("symbolic-ref")));
    assert!(session.last_error.as_deref().unwrap().contains("overwritten"));
    // selection survives the reload
    assert_eq!(session.metadata.push_branch, "develop");
}

#[test]
fn test_checkout_without_branches() {
    let script = ScriptedExecutor::default()
        .respond("symbolic-ref", "", "", 1)
        .respond("status", "", "", 0);
    let (_temp_dir, mut session) = scripted_session(script);

    let outcome = session.checkout();

    assert_eq!(outcome, Outcome::Failed);
    assert!(!session.executor().calls().iter().any(|c| c.starts_with("checkout")));
    assert!(session.last_error.is_some());
}

#[test]
fn test_select_by_name() {
    let (_temp_dir, mut session) = scripted_session(default_script());

    assert!(session.select_branch_named("develop"));
    assert_eq!(session.metadata.selected_branch_index, 0);
    assert!(!session.select_branch_named("missing"));
    assert_eq!(session.metadata.push_branch, "develop");

    assert!(session.select_remote_named("upstream"));
    assert_eq!(session.metadata.push_remote, "upstream");
    assert!(!session.select_remote_named("nope"));
}

#[test]
fn test_diff_shows_text_on_surface() {
    let script = default_script().respond("diff", "@@ -1 +1 @@\n-a\n+b\n", "", 0);
    let (_temp_dir, mut session) = scripted_session(script);
    let mut surface = RecordingSurface::default();

    let staged = session.diff("src/a.cs", &mut surface);
    let unstaged = session.diff("src/new.cs", &mut surface);

    assert_eq!(staged, Outcome::Succeeded);
    assert_eq!(unstaged, Outcome::Succeeded);
    assert_eq!(
        session.executor().calls(),
        vec!["diff --cached -- src/a.cs", "diff -- src/new.cs"]
    );
    assert_eq!(surface.diffs.len(), 2);
    assert_eq!(surface.diffs[0].0, "src/a.cs (staged)");
    assert!(surface.diffs[0].1.contains("+b"));
}

#[test]
fn test_diff_failure_is_advisory() {
    let script = default_script().respond("diff", "", "fatal: bad revision", 128);
    let (_temp_dir, mut session) = scripted_session(script);
    let mut surface = RecordingSurface::default();

    let outcome = session.diff("src/a.cs", &mut surface);

    assert_eq!(outcome, Outcome::Failed);
    assert!(surface.diffs.is_empty());
    assert_eq!(session.last_error.as_deref(), Some("fatal: bad revision"));
    // status rows are left alone
    assert_eq!(session.entries.len(), 2);
}

#[test]
fn test_diff_of_staged_and_modified_entry_shows_both() {
    let script = ScriptedExecutor::default()
        .respond("status", "MM src/a.cs\n", "", 0)
        .respond("diff --cached", "-one\n+two\n", "", 0)
        .respond("diff", "-two\n+three\n", "", 0);
    let (_temp_dir, mut session) = scripted_session(script);
    let mut surface = RecordingSurface::default();

    assert_eq!(session.diff("src/a.cs", &mut surface), Outcome::Succeeded);

    assert_eq!(
        session.executor().calls(),
        vec!["diff --cached -- src/a.cs", "diff -- src/a.cs"]
    );
    let (title, text) = &surface.diffs[0];
    assert_eq!(title, "src/a.cs (staged and unstaged)");
    assert_eq!(text, "-one\n+two\n-two\n+three\n");
}

#[test]
fn test_open_gui_is_detached() {
    let (_temp_dir, mut session) = scripted_session(default_script());

    assert_eq!(session.open_gui(), Outcome::Succeeded);
    assert_eq!(
        session.executor().detached.borrow().clone(),
        vec![vec!["git".to_string(), "gui".to_string()]]
    );
    assert!(session.executor().calls().is_empty());
}

#[test]
fn test_open_gui_failure_sets_error() {
    let script = ScriptedExecutor {
        detached_error: Some("failed to launch git gui".to_string()),
        ..default_script()
    };
    let (_temp_dir, mut session) = scripted_session(script);

    assert_eq!(session.open_gui(), Outcome::Failed);
    assert_eq!(
        session.last_error.as_deref(),
        Some("failed to launch git gui")
    );
}

#[test]
fn test_absent_repository_reports_error_and_clears_rows() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(default_script(), SessionOptions::default());

    let outcome = session.set_repository(temp_dir.path());
    assert_eq!(outcome, Outcome::Failed);
    assert!(session.entries.is_empty());
    assert!(session.metadata.remotes.is_empty());
    assert!(session.metadata.local_branches.is_empty());
    assert!(
        session
            .last_error
            .as_deref()
            .unwrap()
            .starts_with("not a git repository")
    );

    session.entries = status::parse("M  stale.txt");
    assert_eq!(session.stage("stale.txt"), Outcome::Failed);
    assert!(session.entries.is_empty());
    assert!(session.executor().calls().is_empty());
}

#[test]
fn test_diff_and_gui_without_repository_clear_rows() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(default_script(), SessionOptions::default());
    session.set_repository(temp_dir.path());
    let mut surface = RecordingSurface::default();

    session.entries = status::parse("M  stale.txt");
    assert_eq!(session.diff("stale.txt", &mut surface), Outcome::Failed);
    assert!(session.entries.is_empty());
    assert!(surface.diffs.is_empty());

    session.entries = status::parse("M  stale.txt");
    assert_eq!(session.open_gui(), Outcome::Failed);
    assert!(session.entries.is_empty());
    assert!(session.executor().detached.borrow().is_empty());
    assert!(
        session
            .last_error
            .as_deref()
            .unwrap()
            .starts_with("not a git repository")
    );
}

#[test]
fn test_no_repository_selected() {
    let mut session = Session::new(default_script(), SessionOptions::default());

    assert_eq!(session.refresh_status(), Outcome::Failed);
    assert_eq!(
        session.last_error.as_deref(),
        Some("no repository selected")
    );
}

// tests below run the real git binary against repositories created with git2

/// helper to initialise a test git repository
fn setup_test_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();

    // configure git user for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
    config.set_bool("commit.gpgsign", false).unwrap();

    (temp_dir, repo)
}

/// helper to create a file with content
fn create_file(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

/// helper to commit all changes
fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = repo.signature().unwrap();

    let parent_commit = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent_commit.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap();
}

fn git_session(root: &Path) -> Session<GitCli> {
    let mut session = Session::new(GitCli::new(GIT_PROGRAM), SessionOptions::default());
    session.set_repository(root);
    session
}

#[test]
fn test_real_stage_and_unstage() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();

    create_file(&repo_path.join("readme.txt"), "hello");
    commit_all(&repo, "initial commit");
    create_file(&repo_path.join("readme.txt"), "hello again");
    create_file(&repo_path.join("new file.txt"), "new");

    let mut session = git_session(repo_path);
    assert_eq!(session.last_error, None);
    assert_eq!(session.entries.len(), 2);
    assert!(session.entries.iter().all(|e| !e.is_staged()));

    // stage a path with a space in it
    assert_eq!(session.stage("new file.txt"), Outcome::Succeeded);
    let added = session
        .entries
        .iter()
        .find(|e| e.target_path() == "new file.txt")
        .expect("new file should be listed");
    assert_eq!(added.combined_code(), "A");
    assert!(added.is_staged());

    assert_eq!(session.unstage("new file.txt"), Outcome::Succeeded);
    let untracked = session
        .entries
        .iter()
        .find(|e| e.target_path() == "new file.txt")
        .expect("new file should still be listed");
    assert_eq!(untracked.combined_code(), "??");

    assert_eq!(session.stage_all(), Outcome::Succeeded);
    assert!(session.entries.iter().all(FileStatusEntry::is_staged));
}

#[test]
fn test_real_commit_clears_status() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();

    create_file(&repo_path.join("a.txt"), "a");
    commit_all(&repo, "initial commit");
    create_file(&repo_path.join("b.txt"), "b");

    let mut session = git_session(repo_path);
    session.stage_all();
    session.commit_message = "add b".to_string();

    assert_eq!(session.commit(), Outcome::Succeeded, "{:?}", session.last_error);
    assert!(session.entries.is_empty());
    assert!(session.commit_message.is_empty());

    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.summary(), Some("add b"));
}

#[test]
fn test_real_commit_with_nothing_staged_fails() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();

    create_file(&repo_path.join("a.txt"), "a");
    commit_all(&repo, "initial commit");

    let mut session = git_session(repo_path);
    session.commit_message = "empty".to_string();

    assert_eq!(session.commit(), Outcome::Failed);
    assert!(session.last_error.is_some());
    assert_eq!(session.commit_message, "empty");
}

#[test]
fn test_real_metadata_without_remotes() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();

    create_file(&repo_path.join("a.txt"), "a");
    commit_all(&repo, "initial commit");
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("feature/x", &head, false).unwrap();

    let session = git_session(repo_path);

    assert_eq!(session.metadata.remotes, vec!["origin"]);
    assert_eq!(session.metadata.push_remote, "origin");
    assert_eq!(session.metadata.local_branches.len(), 2);
    assert!(
        session
            .metadata
            .local_branches
            .contains(&"feature/x".to_string())
    );
    assert!(!session.metadata.current_branch.is_empty());
    assert_eq!(session.metadata.push_branch, session.metadata.current_branch);
}

#[test]
fn test_real_unborn_branch_is_seeded_from_head() {
    let (temp_dir, _repo) = setup_test_repo();

    let session = git_session(temp_dir.path());

    let current = session.metadata.current_branch.clone();
    assert!(!current.is_empty());
    assert_eq!(session.metadata.local_branches, vec![current.clone()]);
    assert_eq!(session.metadata.push_branch, current);
}

#[test]
fn test_real_checkout_switches_branch() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();

    create_file(&repo_path.join("a.txt"), "a");
    commit_all(&repo, "initial commit");
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("feature", &head, false).unwrap();

    let mut session = git_session(repo_path);
    assert!(session.select_branch_named("feature"));

    assert_eq!(session.checkout(), Outcome::Succeeded, "{:?}", session.last_error);
    assert_eq!(session.metadata.current_branch, "feature");
    assert_eq!(session.metadata.push_branch, "feature");
}

#[test]
fn test_real_line_ending_notice_is_benign() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();
    repo.config()
        .unwrap()
        .set_str("core.autocrlf", "true")
        .unwrap();

    create_file(&repo_path.join("unix.txt"), "one\ntwo\n");

    let mut session = git_session(repo_path);
    assert_eq!(session.stage("unix.txt"), Outcome::Succeeded);
    assert_eq!(session.last_error, None);
}

#[test]
fn test_real_diff_of_unstaged_change() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();

    create_file(&repo_path.join("a.txt"), "before\n");
    commit_all(&repo, "initial commit");
    create_file(&repo_path.join("a.txt"), "after\n");

    let mut session = git_session(repo_path);
    let mut surface = RecordingSurface::default();

    assert_eq!(session.diff("a.txt", &mut surface), Outcome::Succeeded);
    let (title, text) = &surface.diffs[0];
    assert_eq!(title, "a.txt");
    assert!(text.contains("-before"));
    assert!(text.contains("+after"));
}

#[test]
fn test_real_diff_of_staged_and_unstaged_change() {
    let (temp_dir, repo) = setup_test_repo();
    let repo_path = temp_dir.path();

    create_file(&repo_path.join("a.txt"), "one\n");
    commit_all(&repo, "initial commit");
    create_file(&repo_path.join("a.txt"), "two\n");
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("a.txt")).unwrap();
    index.write().unwrap();
    create_file(&repo_path.join("a.txt"), "three\n");

    let mut session = git_session(repo_path);
    assert_eq!(session.entries[0].combined_code(), "MM");
    let mut surface = RecordingSurface::default();

    assert_eq!(session.diff("a.txt", &mut surface), Outcome::Succeeded);
    let (title, text) = &surface.diffs[0];
    assert_eq!(title, "a.txt (staged and unstaged)");
    assert!(text.contains("-one"));
    assert!(text.contains("+two"));
    assert!(text.contains("+three"));
}
