//! Entry selection for partial extraction.

use std::path::Path;

use crate::bundle::FileEntry;

/// Selects which manifest entries to extract.
///
/// With no names every entry is selected. Names match an entry's full path,
/// its base name, or, when they contain `*` or `?`, the full path as a glob.
/// Exclusion patterns win over names and match by substring or glob.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    names: Vec<String>,
    exclude: Vec<String>,
}

impl EntryFilter {
    pub fn new(names: Vec<String>, exclude: Vec<String>) -> Self {
        Self { names, exclude }
    }

    /// Whether specific names were requested
    pub fn is_selective(&self) -> bool {
        !self.names.is_empty()
    }

    pub fn matches(&self, entry: &FileEntry) -> bool {
        // Parents of selected files are created on demand, so bare
        // directory entries are only kept for full extraction.
        if entry.is_directory && self.is_selective() {
            return false;
        }

        if self.is_selective() && !self.names.iter().any(|name| name_matches(name, &entry.path)) {
            return false;
        }

        !self
            .exclude
            .iter()
            .any(|x| entry.path.contains(x.as_str()) || glob_match(x, &entry.path))
    }
}

fn name_matches(name: &str, path: &str) -> bool {
    if has_glob_chars(name) {
        return glob_match(name, path);
    }

    let basename = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    path == name || basename == name
}

/// Check if a pattern contains glob wildcard characters.
///
/// # Arguments
///
/// * `pattern` - The pattern to check
///
/// # Returns
///
/// Returns `true` if the pattern contains `*` or `?` wildcards.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters, `/` included
/// - `?` matches exactly one character
///
/// Runs in `O(pattern * text)` time by keeping one row of match states per
/// pattern position, so runs of stars cannot blow up into backtracking.
///
/// # Arguments
///
/// * `pattern` - The glob pattern to match against
/// * `text` - The text to check for a match
///
/// # Returns
///
/// Returns `true` if the whole text matches the pattern.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let text: Vec<char> = text.chars().collect();

    // row[j]: the pattern consumed so far matches the first j chars of text
    let mut row = vec![false; text.len() + 1];
    row[0] = true;

    for p in pattern.chars() {
        let mut next = vec![false; text.len() + 1];
        match p {
            '*' => {
                let mut reachable = false;
                for j in 0..=text.len() {
                    reachable |= row[j];
                    next[j] = reachable;
                }
            }
            _ => {
                for j in 1..=text.len() {
                    next[j] = row[j - 1] && (p == '?' || p == text[j - 1]);
                }
            }
        }
        row = next;
    }

    row[text.len()]
}
