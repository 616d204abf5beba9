//! Info command implementation.

use kcap_core::CompressionMethod;
use kcap_pack::PackFile;
use kcap_pack::directory::{HEADER_SIZE, RECORD_SIZE};
use std::path::Path;

pub fn cmd_info(archive: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let pack = PackFile::open(archive)?;
    let entries = pack.entries()?;

    let count = |method: fn(&CompressionMethod) -> bool| {
        entries.iter().filter(|e| method(&e.method)).count()
    };
    let total_size: u64 = entries.iter().map(|e| u64::from(e.size().unwrap_or(0))).sum();
    let total_compressed: u64 = entries.iter().map(|e| u64::from(e.compressed_size)).sum();

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Format: KCAP pack");
    println!("Size: {} bytes", pack.file_len());
    println!(
        "Directory: {} bytes",
        HEADER_SIZE + RECORD_SIZE * entries.len()
    );

    println!();
    println!("Contents:");
    println!("  Entries: {}", entries.len());
    println!(
        "  Stored: {}",
        count(|m| *m == CompressionMethod::Stored)
    );
    println!(
        "  LZSS: {}",
        count(|m| *m == CompressionMethod::Lzss)
    );
    let unknown = count(|m| matches!(m, CompressionMethod::Unknown(_)));
    if unknown > 0 {
        println!("  Unknown method: {}", unknown);
    }
    println!("  Total size: {} bytes", total_size);
    println!("  Compressed size: {} bytes", total_compressed);
    if total_size > 0 {
        println!(
            "  Compression ratio: {:.1}%",
            (1.0 - total_compressed as f64 / total_size as f64) * 100.0
        );
    }

    Ok(())
}
