//! WARC archive reading: record splitting and header/body separation.

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use flate2::read::MultiGzDecoder;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{LinkError, LinkResult};

/// Header naming the TREC document identifier of a record.
pub const KEYNAME: &str = "WARC-TREC-ID";
const RECORD_MARKER: &str = "WARC/1.0";
const CONTENT_TYPE: &str = "Content-Type:";

/// One crawled page: its identifier and raw HTML payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarcDocument {
    pub id: String,
    pub html: String,
}

/// Open an archive, transparently decompressing `.gz` files.
pub fn open_archive(path: &Path) -> LinkResult<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|source| LinkError::Archive {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn Read + Send> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Split a stream into raw record payloads on `WARC/1.0` marker lines.
pub fn split_records<R: BufRead>(reader: R) -> Records<R> {
    Records {
        reader,
        pending: String::new(),
        done: false,
    }
}

/// Iterator over raw record payloads; invalid UTF-8 is replaced, not rejected.
pub struct Records<R> {
    reader: R,
    pending: String,
    done: bool,
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    self.done = true;
                    return Some(Ok(std::mem::take(&mut self.pending)));
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    if line.trim() == RECORD_MARKER {
                        return Some(Ok(std::mem::take(&mut self.pending)));
                    }
                    self.pending.push_str(&line);
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Value of the `WARC-TREC-ID` header, if present.
pub fn find_id(headers: &str) -> Option<String> {
    headers
        .lines()
        .find(|line| line.starts_with(KEYNAME))
        .and_then(|line| line.split_once(": "))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Separate the record headers from the HTML body.
///
/// In a response record the second `Content-Type:` belongs to the HTTP headers;
/// the body begins after the blank line closing that header block.
pub fn split_headers(record: &str) -> Option<(&str, &str)> {
    let (idx, _) = record.match_indices(CONTENT_TYPE).take(2).last()?;
    let headers = &record[..idx];
    let rest = &record[idx..];
    let body = ["\r\n\r\n", "\n\n"]
        .iter()
        .filter_map(|sep| rest.find(sep).map(|pos| &rest[pos + sep.len()..]))
        .max_by_key(|body| body.len())
        .or_else(|| rest.split_once('\n').map(|(_, body)| body))
        .unwrap_or_default();
    Some((headers, body))
}

/// Parse a raw record into a document, or `None` when it carries no page.
pub fn parse_record(record: &str) -> Option<WarcDocument> {
    if record.trim().is_empty() {
        debug!("skipping empty record");
        return None;
    }
    let Some((headers, body)) = split_headers(record) else {
        warn!("record has no Content-Type header; skipping");
        return None;
    };
    let Some(id) = find_id(headers) else {
        debug!("record has no {KEYNAME}; skipping");
        return None;
    };
    Some(WarcDocument {
        id,
        html: body.to_string(),
    })
}

/// Stream the documents of an archive, stopping after `max_records` raw records.
pub fn read_documents(
    path: &Path,
    max_records: Option<usize>,
) -> LinkResult<Documents<Box<dyn BufRead + Send>>> {
    let reader = open_archive(path)?;
    Ok(parse_documents(reader, path, max_records))
}

/// Stream documents out of an already opened archive reader.
pub fn parse_documents<R: BufRead>(
    reader: R,
    path: &Path,
    max_records: Option<usize>,
) -> Documents<R> {
    Documents {
        records: split_records(reader),
        path: path.to_path_buf(),
        max_records,
        record_no: 0,
    }
}

/// Lazily parsed documents; only the current record is held in memory.
///
/// Records that carry no page are skipped. A read failure is yielded once and
/// ends the stream.
pub struct Documents<R> {
    records: Records<R>,
    path: PathBuf,
    max_records: Option<usize>,
    record_no: usize,
}

impl<R: BufRead> Iterator for Documents<R> {
    type Item = LinkResult<WarcDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.max_records.is_some_and(|max| self.record_no >= max) {
                debug!(max = ?self.max_records, "record limit reached");
                return None;
            }
            let record = self.records.next()?;
            self.record_no += 1;
            match record {
                Ok(record) => {
                    if let Some(document) = parse_record(&record) {
                        return Some(Ok(document));
                    }
                }
                Err(source) => {
                    return Some(Err(LinkError::Archive {
                        path: self.path.clone(),
                        source,
                    }))
                }
            }
        }
    }
}

/// Expand a file or directory argument into the archives it names, sorted.
pub fn collect_archives(path: &Path) -> LinkResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut archives = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|err| LinkError::Archive {
            path: path.to_path_buf(),
            source: err.into(),
        })?;
        let is_archive = {
            let name = entry.file_name().to_string_lossy();
            name.ends_with(".warc") || name.ends_with(".warc.gz")
        };
        if entry.file_type().is_file() && is_archive {
            archives.push(entry.into_path());
        }
    }
    Ok(archives)
}
