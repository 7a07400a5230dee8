mod cli;
mod config;
mod constants;
mod executor;
mod metadata;
mod repo;
mod session;
mod status;
mod ui;
mod warnings;

use crate::cli::{Cli, Command, RemoteArgs};
use crate::config::Config;
use crate::executor::{CommandExecutor, GitCli};
use crate::session::{Outcome, Session};
use crate::ui::TerminalSurface;
use anyhow::{Result, bail};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

const PANEL_OPTIONS: [&str; 13] = [
    "refresh",
    "stage",
    "unstage",
    "all",
    "diff",
    "commit",
    "push",
    "get (pull)",
    "branch",
    "target remote",
    "open gui",
    "new root",
    "quit",
];

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = Config::load(cli.config.as_deref())?;

    let mut session = Session::new(
        GitCli::new(config.git_program.as_str()),
        config.session_options()?,
    );
    let root = resolve_root(cli.repo.as_deref(), config.repository.as_deref());
    session.set_repository(root);

    match cli.command.unwrap_or(Command::Panel) {
        Command::Panel => run_panel(&mut session),
        Command::Status { json } => {
            check(&session, Outcome::Succeeded)?;
            if json {
                info!(serde_json::to_string_pretty(&session.entries)?);
            } else {
                session.render(&mut TerminalSurface);
            }
            Ok(())
        }
        Command::Stage { path } => {
            let outcome = session.stage(&path);
            check(&session, outcome)
        }
        Command::Unstage { path } => {
            let outcome = session.unstage(&path);
            check(&session, outcome)
        }
        Command::StageAll => {
            let outcome = session.stage_all();
            check(&session, outcome)
        }
        Command::Diff { path } => {
            let outcome = session.diff(&path, &mut TerminalSurface);
            check(&session, outcome)
        }
        Command::Commit { message } => {
            session.commit_message = match message {
                Some(message) => message,
                None => ui::edit_multi_line("")?,
            };
            let outcome = session.commit();
            check(&session, outcome)
        }
        Command::Push(target) => {
            select_target(&mut session, &target)?;
            let outcome = ui::with_spinner("pushing...", || session.push());
            check(&session, outcome)
        }
        Command::Pull(target) => {
            select_target(&mut session, &target)?;
            let outcome = ui::with_spinner("pulling...", || session.pull());
            check(&session, outcome)
        }
        Command::Checkout { branch } => {
            if !session.select_branch_named(&branch) {
                bail!("no local branch named {branch}");
            }
            let outcome = session.checkout();
            check(&session, outcome)
        }
        Command::Branches { json } => {
            check(&session, Outcome::Succeeded)?;
            if json {
                info!(serde_json::to_string_pretty(&session.metadata)?);
            } else {
                display_branches(&session);
            }
            Ok(())
        }
        Command::Gui => {
            let outcome = session.open_gui();
            check(&session, outcome)
        }
    }
}

/// --repo, then the configured repository, then whatever contains the current directory
fn resolve_root(cli_repo: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    let start = cli_repo.or(configured).unwrap_or(Path::new("."));
    match repo::discover_root(start) {
        Ok(root) => root,
        Err(e) => {
            // keep the path so the panel can report it
            warning!("{}", e);
            start.to_path_buf()
        }
    }
}

/// turn an action's outcome into a command exit status
fn check<E: CommandExecutor>(session: &Session<E>, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Succeeded => match &session.last_error {
            Some(e) => bail!("{e}"),
            None => Ok(()),
        },
        Outcome::Failed => bail!(
            "{}",
            session
                .last_error
                .as_deref()
                .unwrap_or("command failed")
        ),
        Outcome::Refused(notice) => bail!("{notice}"),
    }
}

fn select_target<E: CommandExecutor>(session: &mut Session<E>, target: &RemoteArgs) -> Result<()> {
    if let Some(remote) = &target.remote
        && !session.select_remote_named(remote)
    {
        bail!("no remote named {remote}");
    }
    if let Some(branch) = &target.branch
        && !session.select_branch_named(branch)
    {
        bail!("no local branch named {branch}");
    }
    Ok(())
}

fn run_panel<E: CommandExecutor>(session: &mut Session<E>) -> Result<()> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        bail!("interactive terminal required");
    }

    let mut surface = TerminalSurface;
    loop {
        display_panel(session, &mut surface);

        let action = ui::prompt(&PANEL_OPTIONS)?;
        match handle_user_action(action, session, &mut surface)? {
            PanelAction::Quit => break,
            PanelAction::Continue => {}
        }
    }

    Ok(())
}

enum PanelAction {
    Continue,
    Quit,
}

fn display_panel<E: CommandExecutor>(session: &Session<E>, surface: &mut TerminalSurface) {
    let metadata = &session.metadata;
    let branch = if metadata.current_branch.is_empty() {
        "(detached)"
    } else {
        metadata.current_branch.as_str()
    };

    info!();
    status!("{} on {}", session.root().display(), branch);
    info!(
        "target: {} {}",
        display_or_default(&metadata.push_remote),
        display_or_default(&metadata.push_branch)
    );
    session.render(surface);
    if let Some(e) = &session.last_error {
        error!("{}", e);
    }
}

fn display_or_default(value: &str) -> &str {
    if value.is_empty() { "(default)" } else { value }
}

fn display_branches<E: CommandExecutor>(session: &Session<E>) {
    let metadata = &session.metadata;

    status!("remotes:");
    for (i, remote) in metadata.remotes.iter().enumerate() {
        let marker = if i == metadata.selected_remote_index { '>' } else { ' ' };
        info!("{} {:>2} {}", marker, i + 1, remote);
    }

    status!("branches:");
    for (i, branch) in metadata.local_branches.iter().enumerate() {
        let marker = if i == metadata.selected_branch_index { '>' } else { ' ' };
        let current = if *branch == metadata.current_branch { "*" } else { " " };
        info!("{} {:>2} {}{}", marker, i + 1, current, branch);
    }
}

/// handle one panel keypress
fn handle_user_action<E: CommandExecutor>(
    action: char,
    session: &mut Session<E>,
    surface: &mut TerminalSurface,
) -> Result<PanelAction> {
    match action {
        'r' => {
            session.reload_metadata();
            session.refresh_status();
        }
        's' => {
            if let Some(path) = pick_path(session)? {
                session.stage(&path);
            }
        }
        'u' => {
            if let Some(path) = pick_path(session)? {
                session.unstage(&path);
            }
        }
        'a' => {
            session.stage_all();
        }
        'd' => {
            if let Some(path) = pick_path(session)? {
                session.diff(&path, surface);
            }
        }
        'c' => {
            let initial = session.commit_message.clone();
            if let Some(message) = ui::edit_one_line("commit message", &initial)? {
                session.commit_message = message;
                if let Outcome::Refused(notice) = session.commit() {
                    warning!("{}", notice);
                }
            }
        }
        'p' => {
            ui::with_spinner("pushing...", || session.push());
        }
        'g' => {
            ui::with_spinner("pulling...", || session.pull());
        }
        'b' => {
            display_branches(session);
            if let Some(index) = pick_index(session.metadata.local_branches.len())? {
                session.select_branch(index);
                if ui::prompt(&["checkout", "select only"])? == 'c' {
                    session.checkout();
                }
            }
        }
        't' => {
            display_branches(session);
            if let Some(index) = pick_index(session.metadata.remotes.len())? {
                session.select_remote(index);
            }
        }
        'o' => {
            session.open_gui();
        }
        'n' => {
            let current = session.root().display().to_string();
            if let Some(path) = ui::edit_one_line("repository root", &current)? {
                let root = resolve_root(Some(Path::new(&path)), None);
                session.set_repository(root);
            }
        }
        'q' => return Ok(PanelAction::Quit),
        _ => {}
    }
    Ok(PanelAction::Continue)
}

/// ask for a row number or a path, returning the path to act on
fn pick_path<E: CommandExecutor>(session: &Session<E>) -> Result<Option<String>> {
    let Some(answer) = ui::edit_one_line("row number or path", "")? else {
        return Ok(None);
    };
    if answer.is_empty() {
        return Ok(None);
    }

    match answer.parse::<usize>() {
        Ok(row) if row >= 1 && row <= session.entries.len() => {
            Ok(Some(session.entries[row - 1].target_path()))
        }
        Ok(row) => {
            warning!("no row {}", row);
            Ok(None)
        }
        Err(_) => Ok(Some(answer)),
    }
}

/// ask for a 1-based list position
fn pick_index(len: usize) -> Result<Option<usize>> {
    if len == 0 {
        warning!("nothing to choose from");
        return Ok(None);
    }

    let Some(answer) = ui::edit_one_line("number", "")? else {
        return Ok(None);
    };
    match answer.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Ok(Some(n - 1)),
        _ => {
            warning!("expected a number from 1 to {}", len);
            Ok(None)
        }
    }
}
