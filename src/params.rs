// src/params.rs

//! Record source: delimited rows → [`ParameterRecord`]s.
//!
//! Every row of the input becomes one record whose fields are the command's
//! arguments. There is no header row. Rows without any field are skipped, so
//! a source with blank lines behaves exactly like the same source without
//! them.
//!
//! Quoting is lenient: a `"` inside a field that did not start with one is
//! kept as a literal character (`a"b` reads as `a"b`) rather than rejected.
//! Quoted fields follow the usual rules.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use csv::{ErrorKind, ReaderBuilder};
use tracing::debug;

use crate::errors::{FanexecError, Result};
use crate::fs::FileSystem;

/// Where records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Interpret a CLI/config path. `-` and `/dev/stdin` mean standard input.
    pub fn from_arg(arg: &str) -> Self {
        match arg {
            "-" | "/dev/stdin" => InputSource::Stdin,
            path => InputSource::File(PathBuf::from(path)),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => f.write_str("<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Options for the delimited reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub delimiter: u8,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// One input row, bound into the command template as `.Args` / `.Arg`.
///
/// Never empty: construction through [`ParameterRecord::new`] rejects rows
/// without fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRecord {
    args: Vec<String>,
}

impl ParameterRecord {
    /// Returns `None` for an empty row.
    pub fn new(args: Vec<String>) -> Option<Self> {
        if args.is_empty() {
            None
        } else {
            Some(Self { args })
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// First field of the row.
    pub fn primary_arg(&self) -> &str {
        &self.args[0]
    }
}

/// Read every record from `source`, keeping input order.
pub fn read_params(
    fs: &dyn FileSystem,
    source: &InputSource,
    options: ReaderOptions,
) -> Result<Vec<ParameterRecord>> {
    debug!(%source, "reading parameter records");
    match source {
        InputSource::Stdin => parse_params(std::io::stdin().lock(), options),
        InputSource::File(path) => {
            let reader = open_source(fs, path)?;
            parse_params(reader, options)
        }
    }
}

fn open_source(fs: &dyn FileSystem, path: &Path) -> Result<Box<dyn Read + Send>> {
    fs.open_read(path)
        .map_err(|e| FanexecError::InputUnreadable {
            path: path.display().to_string(),
            message: format!("{e:#}"),
        })
}

/// Parse records from any reader.
///
/// All rows must have the same number of fields as the first one.
pub fn parse_params<R: Read>(reader: R, options: ReaderOptions) -> Result<Vec<ParameterRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let mut params = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(csv_error)?;
        let args: Vec<String> = row.iter().map(str::to_string).collect();
        match ParameterRecord::new(args) {
            Some(record) => params.push(record),
            None => debug!("skipping empty row"),
        }
    }

    debug!(count = params.len(), "parameter records read");
    Ok(params)
}

fn csv_error(err: csv::Error) -> FanexecError {
    if !err.is_io_error() {
        return FanexecError::ParseError(err);
    }
    match err.into_kind() {
        ErrorKind::Io(io) => FanexecError::IoError(io),
        other => FanexecError::Other(anyhow!("reading records: {other:?}")),
    }
}
