use crate::constants::LINE_ENDING_NOTICES;

/// check if stderr text is only a harmless line ending notice
///
/// git writes these on add/commit/checkout even when the command succeeds.
/// every non-blank line has to be one of the notices: a single unrecognised line
/// makes the whole text a real error, and empty text is not benign either.
pub fn is_benign(stderr: &str) -> bool {
    let mut lines = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    if lines.peek().is_none() {
        return false;
    }

    lines.all(|line| LINE_ENDING_NOTICES.iter().any(|notice| line.contains(notice)))
}
