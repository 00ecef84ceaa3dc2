// Intel HEX loader. Only the record types an 8051 toolchain emits are
// interpreted (data, end-of-file, extended segment, extended linear);
// checksums are not verified. Malformed lines are diagnosed and skipped, so a
// damaged image loads as far as it can.

use crate::memory::CodeMemory;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("error reading {path}: {source}")]
    Read { path: String, source: io::Error },
}

pub fn load_hex_file(path: &str, code: &mut CodeMemory) -> Result<(), LoadError> {
    let file =
        File::open(path).map_err(|source| LoadError::Open { path: path.to_string(), source })?;
    let mut extended = 0u32;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| LoadError::Read { path: path.to_string(), source })?;
        if !apply_record(&line, code, &mut extended) {
            break;
        }
    }
    info!("loaded HEX image from {}", path);
    Ok(())
}

pub fn load_hex_str(text: &str, code: &mut CodeMemory) {
    let mut extended = 0u32;
    for line in text.lines() {
        if !apply_record(line, code, &mut extended) {
            break;
        }
    }
}

// Returns false when the end-of-file record terminates the parse.
fn apply_record(line: &str, code: &mut CodeMemory, extended: &mut u32) -> bool {
    let line = line.trim_end_matches('\r');
    if !line.starts_with(':') {
        return true;
    }
    if line.len() < 11 {
        warn!("invalid line in HEX data: {}", line);
        return true;
    }
    let (count, address, record) =
        match (hex_field(line, 1, 2), hex_field(line, 3, 4), hex_field(line, 7, 2)) {
            (Some(count), Some(address), Some(record)) => (count as usize, address, record),
            _ => {
                warn!("invalid line in HEX data: {}", line);
                return true;
            }
        };
    match record {
        0x00 => {
            let base = *extended + address;
            for i in 0..count {
                match hex_field(line, 9 + i * 2, 2) {
                    Some(byte) => code.write(base + i as u32, byte as u8),
                    None => {
                        warn!("truncated data record: {}", line);
                        break;
                    }
                }
            }
        }
        0x01 => return false,
        0x02 => {
            if let Some(segment) = hex_field(line, 9, 4) {
                *extended = segment * 16;
            }
        }
        0x04 => {
            if let Some(upper) = hex_field(line, 9, 4) {
                *extended = upper << 16;
            }
        }
        other => warn!("unhandled record type 0x{:02x}: {}", other, line),
    }
    true
}

fn hex_field(line: &str, start: usize, len: usize) -> Option<u32> {
    u32::from_str_radix(line.get(start..start + len)?, 16).ok()
}
