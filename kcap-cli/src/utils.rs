//! Utility functions for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use kcap_core::Entry;
use std::path::{Path, PathBuf};

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Check if a filename matches the filter patterns.
/// - If include patterns are specified, the name must match at least one
/// - If exclude patterns are specified, the name must not match any
pub fn matches_filters(name: &str, include: &[String], exclude: &[String]) -> bool {
    let matches = |pattern_str: &String| {
        Pattern::new(pattern_str).is_ok_and(|pattern| pattern.matches(name))
    };

    if exclude.iter().any(matches) {
        return false;
    }
    include.is_empty() || include.iter().any(matches)
}

/// Filter entries based on include/exclude patterns.
pub fn filter_entries(entries: &[Entry], include: &[String], exclude: &[String]) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| matches_filters(&e.name, include, exclude))
        .cloned()
        .collect()
}

/// Whether an entry was selected by name (all when `files` is empty) and
/// passes the filters.
pub fn is_selected(name: &str, files: &[String], include: &[String], exclude: &[String]) -> bool {
    if !files.is_empty() && !files.iter().any(|f| f == name) {
        return false;
    }
    matches_filters(name, include, exclude)
}

/// Destination of an entry below `output`, or `None` if its name has no
/// usable path components.
pub fn output_path(output: &Path, entry: &Entry) -> Option<PathBuf> {
    if entry.has_unsafe_path() {
        log::warn!("sanitizing unsafe entry name {:?}", entry.name);
    }
    let name = entry.sanitized_name();
    (!name.is_empty()).then(|| output.join(name))
}

fn size_column(entry: &Entry) -> String {
    entry
        .size()
        .map_or_else(|| "?".to_string(), |size| size.to_string())
}

/// Print entries in a formatted table.
pub fn print_entries(entries: &[Entry], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.name);
        }
        return;
    }

    println!(
        "{:>10} {:>10} {:>6} {:>8} {:>10}  Name",
        "Size", "Compressed", "Ratio", "Method", "Offset",
    );
    println!("{}", "-".repeat(72));

    let mut total_size = 0u64;
    let mut total_compressed = 0u64;

    for entry in entries {
        let ratio = match entry.size() {
            Some(size) if size > 0 => format!("{:.1}%", entry.space_savings()),
            _ => "-".to_string(),
        };

        println!(
            "{:>10} {:>10} {:>6} {:>8} {:>#10x}  {}",
            size_column(entry),
            entry.compressed_size,
            ratio,
            entry.method.to_string(),
            entry.offset,
            entry.name
        );

        total_size += u64::from(entry.size().unwrap_or(0));
        total_compressed += u64::from(entry.compressed_size);
    }

    println!("{}", "-".repeat(72));
    let total_ratio = if total_size > 0 {
        (1.0 - total_compressed as f64 / total_size as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "{:>10} {:>10} {:>5.1}%                     {} files",
        total_size,
        total_compressed,
        total_ratio,
        entries.len()
    );
}
