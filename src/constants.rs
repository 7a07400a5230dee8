// git binary
#[cfg(windows)]
pub const GIT_PROGRAM: &str = "git.exe";
#[cfg(not(windows))]
pub const GIT_PROGRAM: &str = "git";

/// exit code reported when the child process could not be launched or had no exit code
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = -1;

// status
pub const MIN_STATUS_LINE_LENGTH: usize = 3;
pub const STATUS_PATH_OFFSET: usize = 3;
pub const UNTRACKED_MARKER: char = '?';
pub const RENAME_ARROW: &str = " -> ";

// line ending notices written to stderr by add/commit/checkout
pub const LINE_ENDING_NOTICES: [&str; 3] = [
    "LF will be replaced by CRLF",
    "CRLF will be replaced by LF",
    "The file will have its original line endings in your working directory",
];

// metadata
pub const CONTROL_DIR: &str = ".git";
pub const DEFAULT_REMOTE: &str = "origin";

// ui
pub const DEFAULT_GUI_COMMAND: &str = "git gui";
pub const MAX_DIFF_LINES: usize = 2000;
