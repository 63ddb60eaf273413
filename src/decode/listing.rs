// ABOUTME: Parser for `ls -la` output captured inside a container.
// ABOUTME: Produces file entries with directory sizes forced to zero.

use crate::model::{FileEntry, FileKind};

const MIN_COLUMNS: usize = 9;

/// Parse a long directory listing.
///
/// Expects a time style that renders as two columns (date and time), which
/// are joined into `modified`. `.` and `..` are excluded.
pub fn parse_listing(output: &str) -> Vec<FileEntry> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<FileEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("total") {
        return None;
    }

    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < MIN_COLUMNS {
        tracing::debug!(line, "skipping short listing line");
        return None;
    }

    let permissions = columns[0];
    let modified = format!("{} {}", columns[5], columns[6]);
    let name = columns[8..].join(" ");

    let kind = match permissions.chars().next() {
        Some('d') => FileKind::Directory,
        Some('l') => FileKind::Symlink,
        _ => FileKind::File,
    };

    let (name, target) = match kind {
        FileKind::Symlink => match name.split_once(" -> ") {
            Some((link, target)) => (link.to_string(), Some(target.to_string())),
            None => (name, None),
        },
        _ => (name, None),
    };

    if name == "." || name == ".." {
        return None;
    }

    let size = match kind {
        FileKind::Directory => 0,
        _ => columns[4].parse().unwrap_or(0),
    };

    Some(FileEntry {
        name,
        kind,
        size,
        modified,
        permissions: permissions.to_string(),
        target,
    })
}
