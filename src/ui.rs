use crate::constants::MAX_DIFF_LINES;
use crate::session::DisplaySurface;
use crate::status::FileStatusEntry;
use anyhow::{Context, Result, bail};

#[macro_export]
macro_rules! warning {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).yellow());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).yellow());
    }};
}

#[macro_export]
macro_rules! error {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).red());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).red());
    }};
}

#[macro_export]
macro_rules! status {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!($fmt $(, $($arg)*)?).green());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!("{}", $expr).green());
    }};
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    // format string literal (with or without inline formatting or args)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

/// single keypress prompt, eg "[r]efresh/[s]tage/[q]uit ? "
///
/// returns the lowercased first char of the chosen option; enter picks the first option
pub fn prompt(options: &[&str]) -> Result<char> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
        terminal::{disable_raw_mode, enable_raw_mode},
    };
    use std::io::{self, Write};

    // validate options are not empty (programming error if violated)
    debug_assert!(!options.is_empty(), "prompt requires at least one option");

    let keys: Vec<char> = options
        .iter()
        .filter_map(|opt| opt.chars().next())
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect();
    if keys.len() != options.len() {
        bail!("prompt options cannot be empty strings");
    }

    let prompt_parts: Vec<String> = options
        .iter()
        .map(|opt| {
            let mut chars = opt.chars();
            let first = chars.next().unwrap_or_default();
            format!("[{first}]{}", chars.as_str())
        })
        .collect();

    print!("{} ? ", prompt_parts.join("/"));
    let _ = io::stdout().flush();

    // enable raw mode for single-character input
    enable_raw_mode().context("this command requires an interactive terminal")?;

    loop {
        let Ok(Event::Key(KeyEvent {
            code, modifiers, ..
        })) = event::read()
        else {
            continue;
        };

        match code {
            // esc and ctrl-c leave the panel
            KeyCode::Esc => {
                disable_raw_mode().ok();
                info!("^C");
                std::process::exit(1);
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                disable_raw_mode().ok();
                info!("^C");
                std::process::exit(1);
            }
            KeyCode::Enter => {
                disable_raw_mode().ok();
                info!(options[0]);
                break Ok(keys[0]);
            }
            KeyCode::Char(c) => {
                let lower = c.to_lowercase().next().unwrap_or(c);
                if let Some(idx) = keys.iter().position(|&k| k == lower) {
                    disable_raw_mode().ok();
                    info!(options[idx]);
                    break Ok(lower);
                }
            }
            _ => {}
        }
    }
}

/// read one line with `initial` pre-filled, None if the user cancelled
pub fn edit_one_line(label: &str, initial: &str) -> Result<Option<String>> {
    use rustyline::DefaultEditor;

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;

    match editor.readline_with_initial(&format!("{label}? "), (initial, "")) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(_) => {
            info!("^C");
            Ok(None)
        }
    }
}

/// edit text in $EDITOR, returning the trimmed result (possibly empty)
pub fn edit_multi_line(text: &str) -> Result<String> {
    use std::env;
    use std::fs;
    use std::io::Write;
    use std::process::Command;
    use tempfile::Builder;

    let editor = env::var("EDITOR").context("EDITOR not set, use --message instead")?;

    let mut temp_file = Builder::new()
        .prefix("COMMIT_EDITMSG")
        .suffix(".txt")
        .tempfile()
        .context("failed to create temporary file")?;
    temp_file
        .write_all(text.as_bytes())
        .context("failed to write to temporary file")?;
    temp_file
        .flush()
        .context("failed to flush temporary file")?;
    let temp_path = temp_file.path().to_owned();

    // run the editor via shell to properly handle arguments in EDITOR
    let quoted_path = shlex::try_quote(&temp_path.to_string_lossy())
        .context("temporary path cannot be quoted")?
        .to_string();
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{editor} {quoted_path}"))
        .status()
        .with_context(|| format!("failed to run editor: {editor}"))?;
    if !status.success() {
        bail!("editor exited with {status}");
    }

    let edited = fs::read_to_string(&temp_path).context("failed to read edited message")?;
    Ok(strip_comment_lines(&edited))
}

/// drop `#` comment lines the way git does for commit messages, then trim
fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// run a blocking call with a spinner on the terminal
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    use indicatif::{ProgressBar, ProgressStyle};

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = f();

    spinner.finish_and_clear();
    result
}

/// prints status rows and diffs to stdout
pub struct TerminalSurface;

impl DisplaySurface for TerminalSurface {
    fn show_entries(&mut self, entries: &[FileStatusEntry]) {
        use colored::Colorize;

        if entries.is_empty() {
            info!("nothing to commit, working tree clean");
            return;
        }

        for (i, entry) in entries.iter().enumerate() {
            let code = format!("{:>2}", entry.combined_code());
            let code = if entry.is_staged() {
                code.green()
            } else {
                code.red()
            };
            info!("{:>3} {} {}", i + 1, code, entry.path);
        }
    }

    fn show_diff(&mut self, title: &str, text: &str) {
        use colored::Colorize;

        status!("diff: {}", title);
        if text.trim().is_empty() {
            info!("(no differences to show)");
            return;
        }

        for line in text.lines().take(MAX_DIFF_LINES) {
            let line = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with("@@") {
                line.cyan()
            } else {
                line.normal()
            };
            info!("{}", line);
        }

        let total = text.lines().count();
        if total > MAX_DIFF_LINES {
            info!("(+{} more lines)", total - MAX_DIFF_LINES);
        }
    }
}
