//! Extract command implementation.

use crate::utils::{create_progress_bar, is_selected, output_path};
use indicatif::ProgressBar;
use kcap_core::Entry;
use kcap_pack::{PackFile, PackReader};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Options for extracting archive contents.
pub struct ExtractOptions<'a> {
    pub files: &'a [String],
    pub include: &'a [String],
    pub exclude: &'a [String],
    /// Read the pack front to back instead of mapping entries.
    pub stream: bool,
    pub verbose: bool,
    pub progress: bool,
}

impl ExtractOptions<'_> {
    fn selects(&self, entry: &Entry) -> bool {
        is_selected(&entry.name, self.files, self.include, self.exclude)
    }
}

pub fn cmd_extract(
    archive: &Path,
    output: &Path,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Extracting {} to {}", archive.display(), output.display());

    let extracted = if options.stream {
        extract_streaming(archive, output, options)?
    } else {
        extract_random_access(archive, output, options)?
    };

    println!("Extracted {} entries", extracted);
    Ok(())
}

fn extract_random_access(
    archive: &Path,
    output: &Path,
    options: &ExtractOptions,
) -> Result<usize, Box<dyn std::error::Error>> {
    let pack = PackFile::open(archive)?;
    let to_extract: Vec<&Entry> = pack.iter()?.filter(|e| options.selects(e)).collect();

    let pb = create_progress_bar(to_extract.len() as u64, options.progress);
    pb.set_message("files");

    let mut extracted = 0;
    for entry in to_extract {
        let mut reader = pack.open_entry(entry)?;
        if write_entry(entry, &mut reader, output, options.verbose, &pb)? {
            extracted += 1;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    Ok(extracted)
}

fn extract_streaming(
    archive: &Path,
    output: &Path,
    options: &ExtractOptions,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut reader = PackReader::new(BufReader::new(File::open(archive)?));
    let total = reader
        .directory()?
        .iter()
        .filter(|e| options.selects(e))
        .count();

    let pb = create_progress_bar(total as u64, options.progress);
    pb.set_message("files");

    let mut extracted = 0;
    while let Some(entry) = reader.next_entry()? {
        // Unselected entries are drained by the next advance.
        if !options.selects(&entry) {
            continue;
        }
        if write_entry(&entry, &mut reader, output, options.verbose, &pb)? {
            extracted += 1;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    Ok(extracted)
}

/// Copy one entry's content below `output`. Returns `false` if skipped.
fn write_entry<R: Read>(
    entry: &Entry,
    content: &mut R,
    output: &Path,
    verbose: bool,
    pb: &ProgressBar,
) -> io::Result<bool> {
    let Some(path) = output_path(output, entry) else {
        pb.println(format!("  Skipped: {:?} (no usable file name)", entry.name));
        return Ok(false);
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = BufWriter::new(File::create(&path)?);
    let written = io::copy(content, &mut file)?;
    file.flush()?;

    if verbose {
        pb.println(format!("  Extracted: {} ({} bytes)", entry.name, written));
    }
    Ok(true)
}
