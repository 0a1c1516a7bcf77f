//! Symbol feed parsing.
//!
//! The remote feed comes in two shapes. A live payload is a single
//! comma-separated symbol list for "today". A historical payload has one
//! record per line: `"yyyy-MM-dd",SYM1,SYM2,...`, with fields optionally
//! wrapped in double quotes. Parsing is stateless; caching is the resolver's
//! concern.

use crate::domain::error::FeedError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether the feed is read one real day at a time or replayed from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    Live,
    Historical,
}

impl FeedMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedMode::Live => "live",
            FeedMode::Historical => "historical",
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(FeedMode::Live),
            "historical" | "backtest" => Ok(FeedMode::Historical),
            other => Err(format!(
                "unknown feed mode '{other}' (expected live or historical)"
            )),
        }
    }
}

/// One row of the remote feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub date: NaiveDate,
    pub symbols: Vec<String>,
}

/// Decode a fetched body as UTF-8 text.
pub fn decode_payload(bytes: Vec<u8>) -> Result<String, FeedError> {
    String::from_utf8(bytes).map_err(|e| FeedError::Format {
        reason: format!("response is not valid UTF-8 text: {e}"),
    })
}

/// Parse a payload according to `mode`.
///
/// Live payloads carry no date of their own, so the single record (if any)
/// is stamped with `date`. Historical payloads ignore `date`.
pub fn parse(raw: &str, mode: FeedMode, date: NaiveDate) -> Result<Vec<FeedRecord>, FeedError> {
    match mode {
        FeedMode::Live => Ok(parse_live(raw, date)?.into_iter().collect()),
        FeedMode::Historical => parse_historical(raw),
    }
}

/// Parse a live payload. An empty body means there is no record for today.
///
/// Quote characters are kept as-is in this mode.
pub fn parse_live(raw: &str, date: NaiveDate) -> Result<Option<FeedRecord>, FeedError> {
    let body = strip_bom(raw);
    if body.trim().is_empty() {
        return Ok(None);
    }

    let mut rdr = field_reader(body);
    let mut symbols = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| FeedError::Format {
            reason: format!("live payload: {e}"),
        })?;
        symbols.extend(
            record
                .iter()
                .filter(|field| !field.is_empty())
                .map(str::to_string),
        );
    }

    Ok(Some(FeedRecord { date, symbols }))
}

/// Parse a historical payload into records, in file order.
///
/// Duplicate dates are kept here; the cache collapses them last-write-wins.
/// `\n`, `\r\n` and a lone `\r` all end a line, and blank lines still count
/// towards the line numbers reported in [`FeedError::DateParse`].
pub fn parse_historical(raw: &str) -> Result<Vec<FeedRecord>, FeedError> {
    let stripped = strip_bom(raw).replace('"', "");
    let mut records = Vec::new();

    for (index, text) in lines(&stripped).enumerate() {
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        if fields.iter().all(|field| field.is_empty()) {
            continue;
        }

        let date = parse_date(fields[0]).ok_or_else(|| FeedError::DateParse {
            line: index + 1,
            value: fields[0].to_string(),
        })?;

        let symbols = fields[1..]
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| field.to_string())
            .collect();

        records.push(FeedRecord { date, symbols });
    }

    Ok(records)
}

/// Parse a strict `yyyy-MM-dd` date: four-digit year, zero-padded month and
/// day, no sign or surrounding text.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .flat_map(|line| line.split('\r'))
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

// Quoting is off so live payloads keep their quotes verbatim.
fn field_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}
