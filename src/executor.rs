use crate::constants::LAUNCH_FAILURE_EXIT_CODE;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

/// outcome of a single command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl OperationResult {
    /// result used when the child process never ran
    pub fn launch_failure(description: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: description.into(),
            exit_code: LAUNCH_FAILURE_EXIT_CODE,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// runs git with a working directory
///
/// `execute` blocks until the child exits and never fails past the caller: launch
/// problems come back as an `OperationResult` with a non-zero exit code.
/// `execute_detached` takes a full argv (program first) and does not wait.
pub trait CommandExecutor {
    fn execute(&self, args: &[String], dir: &Path) -> OperationResult;

    fn execute_detached(&self, command: &[String], dir: &Path) -> Result<(), String>;
}

/// executor backed by the git binary
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CommandExecutor for GitCli {
    fn execute(&self, args: &[String], dir: &Path) -> OperationResult {
        if !dir.is_dir() {
            return OperationResult::launch_failure(format!(
                "working directory does not exist: {}",
                dir.display()
            ));
        }

        // keep non-ascii paths verbatim and never block on a credential prompt
        let mut child = match Command::new(&self.program)
            .args(["-c", "core.quotepath=false"])
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return OperationResult::launch_failure(format!(
                    "failed to run {}: {e}",
                    display_command(&self.program, args)
                ));
            }
        };

        // drain stderr on a helper thread so a chatty child can't fill one pipe
        // while we block on the other
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut data = Vec::new();
                let _ = stderr.read_to_end(&mut data);
                data
            })
        });

        let mut stdout_data = Vec::new();
        if let Some(mut stdout) = child.stdout.take()
            && let Err(e) = stdout.read_to_end(&mut stdout_data)
        {
            let _ = child.kill();
            let _ = child.wait();
            return OperationResult::launch_failure(format!("failed to read git stdout: {e}"));
        }

        let stderr_data = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        match child.wait() {
            Ok(status) => OperationResult {
                stdout: String::from_utf8_lossy(&stdout_data).to_string(),
                stderr: String::from_utf8_lossy(&stderr_data).to_string(),
                exit_code: status.code().unwrap_or(LAUNCH_FAILURE_EXIT_CODE),
            },
            Err(e) => OperationResult::launch_failure(format!("failed to wait for git: {e}")),
        }
    }

    fn execute_detached(&self, command: &[String], dir: &Path) -> Result<(), String> {
        let Some((program, args)) = command.split_first() else {
            return Err("no command to launch".to_string());
        };

        Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| format!("failed to launch {}: {e}", display_command(program, args)))
    }
}

/// render a command line for messages, quoting arguments the way a shell would need
pub fn display_command(program: &str, args: &[String]) -> String {
    let words = std::iter::once(program).chain(args.iter().map(String::as_str));
    shlex::try_join(words).unwrap_or_else(|_| {
        // arguments with nul bytes can't be quoted, fall back to plain spaces
        std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    })
}
