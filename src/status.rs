use crate::constants::{MIN_STATUS_LINE_LENGTH, RENAME_ARROW, STATUS_PATH_OFFSET, UNTRACKED_MARKER};
use serde::Serialize;

/// one changed path from `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatusEntry {
    pub index_state: char,
    pub work_tree_state: char,
    pub path: String,
}

impl FileStatusEntry {
    /// both state characters with surrounding whitespace trimmed, eg "M" or "??"
    pub fn combined_code(&self) -> String {
        format!("{}{}", self.index_state, self.work_tree_state)
            .trim()
            .to_string()
    }

    pub fn is_staged(&self) -> bool {
        !self.index_state.is_whitespace() && self.index_state != UNTRACKED_MARKER
    }

    /// old and new path for rename/copy entries ("old -> new"), unquoted
    pub fn rename(&self) -> Option<(String, String)> {
        let renamed = [self.index_state, self.work_tree_state]
            .iter()
            .any(|c| matches!(c, 'R' | 'C'));
        if !renamed {
            return None;
        }
        self.path
            .split_once(RENAME_ARROW)
            .map(|(old, new)| (unquote(old.trim()), unquote(new.trim())))
    }

    /// unquoted path that actions (stage, unstage, diff) should operate on
    pub fn target_path(&self) -> String {
        self.rename()
            .map_or_else(|| unquote(&self.path), |(_, new)| new)
    }
}

/// undo git's c-style quoting of a path ("a b.txt", "tab\there")
///
/// paths that aren't wrapped in double quotes are returned as-is
pub fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('n') => bytes.push(b'\n'),
            Some('r') => bytes.push(b'\r'),
            Some('t') => bytes.push(b'\t'),
            Some('v') => bytes.push(0x0b),
            // octal escape for a raw byte, eg \303\251
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|n| n.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push(u8::try_from(value).unwrap_or(u8::MAX));
            }
            Some(other) => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).to_string()
}

/// parse porcelain status text into entries, preserving line order
///
/// lines shorter than the minimum are skipped. state characters are passed through
/// as-is and paths are only whitespace trimmed (quoted paths stay quoted).
pub fn parse(raw: &str) -> Vec<FileStatusEntry> {
    raw.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<FileStatusEntry> {
    if line.chars().count() < MIN_STATUS_LINE_LENGTH {
        return None;
    }

    let mut chars = line.chars();
    let index_state = chars.next()?;
    let work_tree_state = chars.next()?;
    // the separator may be any char, so find the byte offset of the path by position
    let path_start = line
        .char_indices()
        .nth(STATUS_PATH_OFFSET)
        .map_or(line.len(), |(i, _)| i);

    Some(FileStatusEntry {
        index_state,
        work_tree_state,
        path: line[path_start..].trim().to_string(),
    })
}
