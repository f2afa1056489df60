use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDateTime;

use crate::error::ScoreStoreError;
use crate::metrics::record_score_store_operation;
use crate::models::score::{ScoreRecord, RECORDED_AT_FORMAT};

pub const SCORE_FILE_HEADER: &str = "Name,Score,Time,Date";

/// Characters that make spreadsheet tools treat a cell as a formula.
const FORMULA_PREFIXES: [char; 7] = ['=', '+', '@', '-', '\t', '\r', '\n'];

/// Escapes a CSV field and neutralizes formula injection by prefixing
/// dangerous leading characters with a tab.
fn escape_csv_field(value: &str) -> String {
    let sanitized = if value.starts_with(FORMULA_PREFIXES) {
        format!("\t{}", value)
    } else {
        value.to_string()
    };

    if sanitized.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", sanitized.replace('"', "\"\""))
    } else {
        sanitized
    }
}

/// Reverses the formula guard added by [`escape_csv_field`].
fn unescape_name(value: &str) -> String {
    match value.strip_prefix('\t') {
        Some(rest) if rest.starts_with(FORMULA_PREFIXES) => rest.to_string(),
        _ => value.to_string(),
    }
}

/// Splits CSV content into rows of fields. Quoted fields may contain commas,
/// doubled quotes and line breaks; `\r\n` and `\n` both end a row. A quote
/// only opens a quoted field at the start of a field; anywhere else it is kept
/// as a literal character.
fn parse_rows(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn format_row(record: &ScoreRecord) -> String {
    format!(
        "{},{},{:.2},{}\n",
        escape_csv_field(&record.player_name),
        record.score,
        record.elapsed_seconds,
        record.recorded_at_display()
    )
}

fn parse_record(row_number: usize, row: &[String]) -> Result<ScoreRecord, ScoreStoreError> {
    let score = row[1]
        .trim()
        .parse::<i64>()
        .map_err(|e| ScoreStoreError::MalformedRow {
            row: row_number,
            reason: format!("invalid score {:?}: {}", row[1], e),
        })?;
    let elapsed_seconds =
        row[2]
            .trim()
            .parse::<f64>()
            .map_err(|e| ScoreStoreError::MalformedRow {
                row: row_number,
                reason: format!("invalid time {:?}: {}", row[2], e),
            })?;
    let recorded_at = row
        .get(3)
        .and_then(|date| NaiveDateTime::parse_from_str(date.trim(), RECORDED_AT_FORMAT).ok());

    Ok(ScoreRecord {
        player_name: unescape_name(&row[0]),
        score,
        elapsed_seconds,
        recorded_at,
    })
}

/// Append-only high score log backed by a comma-separated file.
pub struct ScoreStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the score file with its header row unless it already exists.
    /// Uses a create-new open so two cold starts cannot both write a header.
    pub fn ensure_initialized(&self) -> Result<(), ScoreStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                writeln!(file, "{}", SCORE_FILE_HEADER)?;
                tracing::info!("Created high score file at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends one row. Not idempotent: every call records a new result.
    pub fn append(&self, record: &ScoreRecord) -> Result<(), ScoreStoreError> {
        let result = self.append_row(record);
        record_score_store_operation("append", result.is_ok());

        match &result {
            Ok(()) => tracing::info!(
                "Saved score: player={}, score={}, time={:.2}",
                record.player_name,
                record.score,
                record.elapsed_seconds
            ),
            Err(e) => tracing::error!("Failed to save score for {}: {}", record.player_name, e),
        }

        result
    }

    fn append_row(&self, record: &ScoreRecord) -> Result<(), ScoreStoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.ensure_initialized()?;

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(format_row(record).as_bytes())?;
        Ok(())
    }

    /// Best `limit` results, highest score first and faster time breaking
    /// ties. A file that cannot be read yields an empty leaderboard.
    pub fn top(&self, limit: usize) -> Vec<ScoreRecord> {
        match self.try_top(limit) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Error reading high scores: {}", e);
                Vec::new()
            }
        }
    }

    pub fn try_top(&self, limit: usize) -> Result<Vec<ScoreRecord>, ScoreStoreError> {
        let result = self.read_all();
        record_score_store_operation("read", result.is_ok());

        let mut records = result?;
        records.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.elapsed_seconds.total_cmp(&b.elapsed_seconds))
        });
        records.truncate(limit);
        Ok(records)
    }

    fn read_all(&self) -> Result<Vec<ScoreRecord>, ScoreStoreError> {
        self.ensure_initialized()?;

        let content = fs::read_to_string(&self.path)?;

        parse_rows(&content)
            .iter()
            .enumerate()
            // first row is the header
            .skip(1)
            .filter(|(_, row)| row.len() >= 3)
            .map(|(index, row)| parse_record(index + 1, row))
            .collect()
    }
}
