//! Test command implementation.

use kcap_core::{Entry, EntryRead};
use kcap_pack::PackFile;
use std::io;
use std::path::Path;

/// Decompress one entry and check its length against the resolved size.
fn test_entry(pack: &PackFile, entry: &Entry) -> Result<u64, Box<dyn std::error::Error>> {
    let mut reader = pack.open_entry(entry)?;
    let produced = io::copy(&mut reader, &mut io::sink())?;
    reader.close();

    let expected = u64::from(entry.size().unwrap_or(0));
    if produced != expected {
        return Err(format!("expected {} bytes, got {}", expected, produced).into());
    }
    Ok(produced)
}

pub fn cmd_test(archive: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pack = PackFile::open(archive)?;
    println!("Testing {} ({} entries)", archive.display(), pack.len());

    let mut ok_count = 0usize;
    let mut errors: Vec<(String, String)> = Vec::new();

    for entry in pack.iter()? {
        match test_entry(&pack, entry) {
            Ok(size) => {
                ok_count += 1;
                if verbose {
                    println!("  OK: {} ({} bytes)", entry.name, size);
                }
            }
            Err(e) => {
                if verbose {
                    println!("  FAILED: {} - {}", entry.name, e);
                }
                errors.push((entry.name.clone(), e.to_string()));
            }
        }
    }

    println!();
    println!("Tested {} entries: {} OK, {} failed", pack.len(), ok_count, errors.len());

    if errors.is_empty() {
        println!("All entries OK");
        Ok(())
    } else {
        if !verbose {
            for (name, error) in &errors {
                println!("  FAILED: {} - {}", name, error);
            }
        }
        Err(format!("{} entries failed", errors.len()).into())
    }
}
