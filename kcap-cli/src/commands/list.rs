//! List command implementation.

use crate::utils::{filter_entries, print_entries};
use kcap_core::Entry;
use kcap_pack::PackFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    name: String,
    method: String,
    method_id: u32,
    offset: u32,
    compressed_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
    ratio: f64,
}

impl EntryJson {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            method: entry.method.name().to_string(),
            method_id: entry.method.id(),
            offset: entry.offset,
            compressed_size: entry.compressed_size,
            size: entry.size(),
            ratio: entry.compression_ratio(),
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    entry_count: usize,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

pub fn cmd_list(archive: &Path, options: &ListOptions) -> Result<(), Box<dyn std::error::Error>> {
    let pack = PackFile::open(archive)?;
    let filtered = filter_entries(pack.entries()?, options.include, options.exclude);

    if options.json {
        let output = ArchiveListJson {
            archive: archive.display().to_string(),
            entry_count: pack.len(),
            entries: filtered.iter().map(EntryJson::from_entry).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Archive: {} ({} entries)", archive.display(), pack.len());
    println!();
    print_entries(&filtered, options.verbose);

    Ok(())
}
