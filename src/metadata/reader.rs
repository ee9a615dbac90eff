//! Input plumbing for file-based sources: decompression, byte progress and
//! splitting SQL dumps into statements.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// PostgreSQL `COPY ... FROM stdin;`, followed by raw data lines up to `\.`
static COPY_FROM_STDIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^\s*COPY\s+.*\bFROM\s+STDIN\b").unwrap());

/// Compression format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect compression format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the appropriate decompressor
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

/// A reader wrapper that reports the number of compressed bytes consumed so far.
pub struct ProgressReader<'a, R: Read> {
    reader: R,
    callback: &'a dyn Fn(u64),
    bytes_read: u64,
}

impl<'a, R: Read> ProgressReader<'a, R> {
    pub fn new(reader: R, callback: &'a dyn Fn(u64)) -> Self {
        Self {
            reader,
            callback,
            bytes_read: 0,
        }
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.bytes_read += n as u64;
        (self.callback)(self.bytes_read);
        Ok(n)
    }
}

/// Open `path` for reading, decompressing by extension and reporting progress
/// on the raw file bytes when a callback is given.
pub fn open_input<'a>(
    path: &Path,
    progress: Option<&'a dyn Fn(u64)>,
) -> Result<Box<dyn Read + 'a>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let raw: Box<dyn Read + 'a> = match progress {
        Some(cb) => Box::new(ProgressReader::new(file, cb)),
        None => Box::new(file),
    };
    Compression::from_path(path)
        .wrap_reader(raw)
        .map_err(|e| Error::io(path, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    SingleQuote,
    DoubleQuote,
    Backtick,
    LineComment,
    BlockComment,
}

/// Streams `;`-terminated statements out of a SQL dump.
///
/// Semicolons inside quoted strings and identifiers are not terminators.
/// `--` and `/* */` comments are dropped from the returned statements.
/// The data block after `COPY ... FROM stdin;` is returned unscanned as
/// one statement ending with its `\.` line.
pub struct StatementReader<R: Read> {
    reader: BufReader<R>,
    stmt_buffer: Vec<u8>,
    in_copy_data: bool,
}

impl<R: Read> StatementReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, reader),
            stmt_buffer: Vec::with_capacity(32 * 1024),
            in_copy_data: false,
        }
    }

    /// Read the next statement, including its terminator.
    ///
    /// Trailing text without a terminator is returned as a final statement
    /// unless it is blank.
    pub fn read_statement(&mut self) -> io::Result<Option<String>> {
        self.stmt_buffer.clear();

        if self.in_copy_data {
            self.in_copy_data = false;
            return self.read_copy_data();
        }

        let mut state = ScanState::Code;
        let mut escaped = false;
        let mut last = 0u8;

        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                if self.stmt_buffer.iter().all(|b| b.is_ascii_whitespace()) {
                    return Ok(None);
                }
                return Ok(Some(self.take_statement()));
            }

            let mut consumed = buf.len();
            let mut found_terminator = false;

            for (i, &b) in buf.iter().enumerate() {
                match state {
                    ScanState::LineComment => {
                        if b == b'\n' {
                            state = ScanState::Code;
                            self.stmt_buffer.push(b'\n');
                        }
                        last = 0;
                        continue;
                    }
                    ScanState::BlockComment => {
                        if b == b'/' && last == b'*' {
                            state = ScanState::Code;
                            self.stmt_buffer.push(b' ');
                            last = 0;
                        } else {
                            last = b;
                        }
                        continue;
                    }
                    ScanState::SingleQuote | ScanState::DoubleQuote => {
                        self.stmt_buffer.push(b);
                        if escaped {
                            escaped = false;
                        } else if b == b'\\' {
                            escaped = true;
                        } else if (b == b'\'' && state == ScanState::SingleQuote)
                            || (b == b'"' && state == ScanState::DoubleQuote)
                        {
                            state = ScanState::Code;
                        }
                        continue;
                    }
                    ScanState::Backtick => {
                        self.stmt_buffer.push(b);
                        if b == b'`' {
                            state = ScanState::Code;
                        }
                        continue;
                    }
                    ScanState::Code => {}
                }

                if b == b'-' && last == b'-' {
                    self.stmt_buffer.pop();
                    state = ScanState::LineComment;
                    last = 0;
                    continue;
                }
                if b == b'*' && last == b'/' {
                    self.stmt_buffer.pop();
                    state = ScanState::BlockComment;
                    last = 0;
                    continue;
                }

                self.stmt_buffer.push(b);
                last = b;

                match b {
                    b'\'' => state = ScanState::SingleQuote,
                    b'"' => state = ScanState::DoubleQuote,
                    b'`' => state = ScanState::Backtick,
                    b';' => {
                        consumed = i + 1;
                        found_terminator = true;
                        break;
                    }
                    _ => {}
                }
            }

            self.reader.consume(consumed);

            if found_terminator {
                return Ok(Some(self.take_statement()));
            }
        }
    }

    /// Raw lines up to and including the `\.` terminator line
    fn read_copy_data(&mut self) -> io::Result<Option<String>> {
        loop {
            let start = self.stmt_buffer.len();
            if self.reader.read_until(b'\n', &mut self.stmt_buffer)? == 0 {
                break;
            }
            let line = &self.stmt_buffer[start..];
            let line = line.strip_suffix(b"\n").unwrap_or(line);
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line == b"\\." {
                break;
            }
        }

        if self.stmt_buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        let bytes = std::mem::take(&mut self.stmt_buffer);
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn take_statement(&mut self) -> String {
        let bytes = std::mem::take(&mut self.stmt_buffer);
        let stmt = String::from_utf8_lossy(&bytes).into_owned();
        self.in_copy_data = COPY_FROM_STDIN_RE.is_match(&stmt);
        stmt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(sql: &str) -> Vec<String> {
        let mut reader = StatementReader::new(sql.as_bytes());
        let mut out = Vec::new();
        while let Some(stmt) = reader.read_statement().unwrap() {
            out.push(stmt.trim().to_string());
        }
        out
    }

    #[test]
    fn test_read_statement_basic() {
        let stmts = statements("CREATE TABLE t1 (id INT); INSERT INTO t1 VALUES (1);");
        assert_eq!(
            stmts,
            vec!["CREATE TABLE t1 (id INT);", "INSERT INTO t1 VALUES (1);"]
        );
    }

    #[test]
    fn test_semicolon_inside_string() {
        let stmts = statements("INSERT INTO t1 VALUES ('hello; world', 'it\\'s');");
        assert_eq!(stmts, vec!["INSERT INTO t1 VALUES ('hello; world', 'it\\'s');"]);
    }

    #[test]
    fn test_comments_are_dropped() {
        let sql = "-- don't split here;\nCREATE TABLE a (id INT /* pk; later */);\n/* trailing */";
        let stmts = statements(sql);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].starts_with("CREATE TABLE a"));
        assert!(!stmts[0].contains("pk; later"));
        assert!(!stmts[0].contains("don't"));
    }

    #[test]
    fn test_trailing_statement_without_terminator() {
        let stmts = statements("CREATE TABLE a (id INT);\nCREATE TABLE b (id INT)");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[1], "CREATE TABLE b (id INT)");
    }

    #[test]
    fn test_blank_tail_is_not_a_statement() {
        assert_eq!(statements("CREATE TABLE a (id INT);\n\n  ").len(), 1);
    }

    #[test]
    fn test_negative_number_is_not_a_comment() {
        let stmts = statements("INSERT INTO t VALUES (-1, 2-3);");
        assert_eq!(stmts, vec!["INSERT INTO t VALUES (-1, 2-3);"]);
    }

    #[test]
    fn test_copy_data_is_not_scanned() {
        let sql = "COPY public.customers (id, name) FROM stdin;\n\
                   1\tO'Brien\n\
                   2\t\\N\n\
                   \\.\n\
                   ALTER TABLE ONLY public.customers ADD CONSTRAINT customers_pkey PRIMARY KEY (id);\n";
        let stmts = statements(sql);

        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0], "COPY public.customers (id, name) FROM stdin;");
        assert!(stmts[1].starts_with("1\tO'Brien"));
        assert!(stmts[1].ends_with("\\."));
        assert!(stmts[2].starts_with("ALTER TABLE ONLY public.customers"));
    }

    #[test]
    fn test_copy_data_crlf_and_empty_block() {
        let sql = "COPY t FROM stdin;\r\n\\.\r\nCOPY u FROM STDIN;\n3\tit's\n\\.\nCREATE TABLE v (id INT);";
        let stmts = statements(sql);

        assert_eq!(stmts.len(), 5);
        assert_eq!(stmts[2], "COPY u FROM STDIN;");
        assert_eq!(stmts[4], "CREATE TABLE v (id INT);");
    }

    #[test]
    fn test_copy_to_file_is_a_plain_statement() {
        let stmts = statements("COPY t TO '/tmp/out.csv';\nCREATE TABLE v (id INT);");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[1], "CREATE TABLE v (id INT);");
    }

    #[test]
    fn test_compression_from_path() {
        assert_eq!(Compression::from_path(Path::new("a.sql.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.sql.zst")), Compression::Zstd);
        assert_eq!(Compression::from_path(Path::new("a.sql")), Compression::None);
    }
}
