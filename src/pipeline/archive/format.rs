use std::path::Path;

/// How an archive entry is treated by the unpacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Metadata,
    Pdf,
    Unsupported,
}

/// Classify an entry by its extension (exact, case-sensitive match).
/// Directory components of the entry name are ignored.
pub fn classify_entry(entry_name: &str) -> EntryKind {
    match Path::new(entry_name).extension().and_then(|e| e.to_str()) {
        Some("json") => EntryKind::Metadata,
        Some("pdf") => EntryKind::Pdf,
        _ => EntryKind::Unsupported,
    }
}

/// Final path component of an entry name ("docs/a.pdf" -> "a.pdf").
pub fn base_name(entry_name: &str) -> &str {
    entry_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry_name)
}

/// Sanitize a filename: strip path components, limit length
pub fn sanitize_filename(original: &str) -> String {
    let clean: String = base_name(original)
        .chars()
        .filter(|c| !matches!(c, '\0'))
        .take(255)
        .collect();

    if clean.is_empty() || clean == "." || clean == ".." {
        "document".to_string()
    } else {
        clean
    }
}

/// Human-readable byte count for log lines.
pub fn display_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b >= MB => format!("{} MB", b / MB),
        b if b >= KB => format!("{} KB", b / KB),
        b => format!("{b} bytes"),
    }
}
