//! Shared helpers for kcap-lzss integration tests.
//!
//! `encode` is a greedy reference encoder producing bitstreams the decoder
//! accepts. It searches the whole window for the longest match, simulating
//! the byte-by-byte write-back so overlapping references are found too.

#![allow(dead_code)]

use kcap_lzss::{DATA_HEADER_SIZE, DataHeader, INITIAL_POSITION, MAX_REFERENCE_LENGTH, WINDOW_SIZE};

const MASK: usize = WINDOW_SIZE - 1;
const MIN_MATCH: usize = 3;

enum Token {
    Literal(u8),
    Reference { position: usize, length: usize },
}

/// Longest match for `data[pos..]` against the window at `cursor`.
fn longest_match(window: &[u8], cursor: usize, data: &[u8], pos: usize) -> Option<(usize, usize)> {
    let max = MAX_REFERENCE_LENGTH.min(data.len() - pos);
    if max < MIN_MATCH {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for start in 0..WINDOW_SIZE {
        let mut length = 0;
        while length < max {
            let src = (start + length) & MASK;
            let written = src.wrapping_sub(cursor) & MASK;
            // Bytes written earlier in this same copy come from the input.
            let byte = if written < length {
                data[pos + written]
            } else {
                window[src]
            };
            if byte != data[pos + length] {
                break;
            }
            length += 1;
        }
        if length >= MIN_MATCH && best.is_none_or(|(_, l)| length > l) {
            best = Some((start, length));
            if length == max {
                break;
            }
        }
    }
    best
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut window = vec![0u8; WINDOW_SIZE];
    let mut cursor = INITIAL_POSITION;
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let (token, length) = match longest_match(&window, cursor, data, pos) {
            Some((position, length)) => (Token::Reference { position, length }, length),
            None => (Token::Literal(data[pos]), 1),
        };
        for &byte in &data[pos..pos + length] {
            window[cursor] = byte;
            cursor = (cursor + 1) & MASK;
        }
        tokens.push(token);
        pos += length;
    }
    tokens
}

/// Encode `data` into a bare LZSS bitstream (no data header).
pub fn encode_stream(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut flag_index = 0;

    for (i, token) in tokenize(data).into_iter().enumerate() {
        if i % 8 == 0 {
            flag_index = out.len();
            out.push(0);
        }
        match token {
            Token::Literal(byte) => {
                out[flag_index] |= 1 << (i % 8);
                out.push(byte);
            }
            Token::Reference { position, length } => {
                out.push((position & 0xFF) as u8);
                out.push((((position >> 8) & 0x0F) << 4 | (length - MIN_MATCH)) as u8);
            }
        }
    }
    out
}

/// Encode `data` into a bitstream made only of literals.
pub fn literal_stream(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in data.chunks(8) {
        out.push(0xFF);
        out.extend_from_slice(chunk);
    }
    out
}

/// Prefix a bitstream with a data header declaring `original_size`.
///
/// The header's compressed size is capped at the original size so that
/// incompressible payloads still carry a valid header.
pub fn with_header(original_size: usize, stream: &[u8]) -> Vec<u8> {
    let compressed = (DATA_HEADER_SIZE + stream.len()).min(original_size);
    let mut region = DataHeader {
        compressed_size: compressed as u32,
        original_size: original_size as u32,
    }
    .to_bytes()
    .to_vec();
    region.extend_from_slice(stream);
    region
}

/// Full data region (header plus greedy bitstream) for `data`.
pub fn encode(data: &[u8]) -> Vec<u8> {
    with_header(data.len(), &encode_stream(data))
}

/// Text with plenty of repetition.
pub fn sample_text(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. \
                 Pack my box with five dozen liquor jugs. ";
    text.iter().copied().cycle().take(size).collect()
}

/// Reproducible pseudo-random bytes.
pub fn noise(size: usize) -> Vec<u8> {
    let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
    (0..size)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 32) as u8
        })
        .collect()
}
