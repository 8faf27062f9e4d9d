//! Read statement CSV exports into [`RawRow`]s.
//!
//! Bank exports vary: UTF-8 with a BOM, Latin-1, comma or semicolon or tab
//! delimited, sometimes with ragged trailing columns. The reader papers over
//! the encoding and delimiter; everything else is left to the normalizer.

use std::fs;
use std::path::Path;

use tally_core::{Error, Result};
use tracing::debug;

use crate::layout::detect_layout;
use crate::types::{RawRow, SourceInput};

/// Read a CSV file from disk.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode(&bytes);
    parse_csv_text(&text).map_err(|source| Error::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse CSV text whose first non-blank line is the header.
pub fn parse_csv_text(text: &str) -> std::result::Result<Vec<RawRow>, csv::Error> {
    let delimiter = sniff_delimiter(text);
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    debug!(delimiter = %(delimiter as char), columns = headers.len(), "csv header");

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()));
        rows.push(RawRow::new(line, cells));
    }

    Ok(rows)
}

impl SourceInput {
    /// Read a file and tag it: `tag` if given, else the detected layout name,
    /// else the file stem.
    pub fn from_path(path: impl AsRef<Path>, tag: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let rows = read_csv(path)?;

        let tag = match tag {
            Some(t) => t.to_string(),
            None => {
                let layout = detect_layout(&rows);
                match layout {
                    crate::Layout::Generic => path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| layout.name().to_string()),
                    _ => layout.name().to_string(),
                }
            }
        };

        Ok(SourceInput::new(tag, rows))
    }
}

/// UTF-8 (BOM stripped) when valid, otherwise Latin-1 byte-for-byte.
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Pick the delimiter occurring most often in the header line; `,` on tie.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut best = (b',', header.matches(',').count());
    for d in [b';', b'\t'] {
        let n = header.matches(d as char).count();
        if n > best.1 {
            best = (d, n);
        }
    }
    best.0
}
