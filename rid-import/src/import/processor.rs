//! Batch orchestration: files in, created-issue summaries out
//!
//! One [`BatchProcessor`] run owns the reference cache and the result
//! list. Failure isolation follows the recoverability ladder: a bad row
//! is skipped, a bad file is skipped, a lost connection abandons the rest
//! of the current file, and only rejected credentials or an empty overall
//! result abort the batch.

use std::path::{Path, PathBuf};

use crate::api::{ApiError, RedmineApi};

use super::cache::ReferenceCache;
use super::excel::{SheetTable, load_first_sheet};
use super::mapper::to_create_request;
use super::normalize::normalize_columns;
use super::row::DiscrepancyRow;
use super::validate::{RowError, validate};

/// One successfully created issue
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedIssueSummary {
    pub id: u64,
    pub project: String,
    pub subject: String,
}

/// Why a whole file was rejected
#[derive(Debug)]
pub enum FileError {
    /// The file could not be read as a spreadsheet
    Load { path: PathBuf, source: anyhow::Error },
    /// The file has no data rows after normalization
    Empty { path: PathBuf },
    /// Credentials stopped being accepted mid-run
    Auth,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::Load { path, source } => {
                write!(f, "could not load {}: {:#}", path.display(), source)
            }
            FileError::Empty { path } => {
                write!(f, "{} has no data rows", path.display())
            }
            FileError::Auth => ApiError::Auth.fmt(f),
        }
    }
}

impl std::error::Error for FileError {}

/// Batch-fatal failure
#[derive(Debug)]
pub enum BatchError {
    /// Session establishment failed, or credentials were revoked mid-run
    Api(ApiError),
    /// Nothing was produced: no files, or every row of every file failed
    EmptyInput {
        files: usize,
        rows_attempted: usize,
        rows_failed: usize,
    },
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Api(err) => err.fmt(f),
            BatchError::EmptyInput {
                files: 0,
                ..
            } => write!(f, "no spreadsheet files were supplied"),
            BatchError::EmptyInput {
                files,
                rows_attempted,
                rows_failed,
            } => write!(
                f,
                "no issues were created from {} file(s) ({} of {} processed rows failed)",
                files, rows_failed, rows_attempted
            ),
        }
    }
}

impl std::error::Error for BatchError {}

/// Per-file tally reported back to the batch loop
#[derive(Debug, Default)]
struct FileOutcome {
    created: Vec<CreatedIssueSummary>,
    rows_attempted: usize,
    rows_failed: usize,
}

/// Drives the load -> normalize -> validate -> map -> submit pipeline
pub struct BatchProcessor<'a> {
    api: &'a dyn RedmineApi,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(api: &'a dyn RedmineApi) -> Self {
        Self { api }
    }

    /// Process every file and return the accumulated summaries
    pub fn process_batch(
        &self,
        files: &[PathBuf],
    ) -> Result<Vec<CreatedIssueSummary>, BatchError> {
        if files.is_empty() {
            return Err(BatchError::EmptyInput {
                files: 0,
                rows_attempted: 0,
                rows_failed: 0,
            });
        }

        let mut cache = ReferenceCache::build(self.api).map_err(BatchError::Api)?;

        let mut created = Vec::new();
        let mut rows_attempted = 0;
        let mut rows_failed = 0;

        for path in files {
            log::info!("Processing file {}", path.display());
            match self.process_file(&mut cache, path) {
                Ok(outcome) => {
                    log::info!(
                        "{}: created {} issue(s), {} of {} row(s) failed",
                        path.display(),
                        outcome.created.len(),
                        outcome.rows_failed,
                        outcome.rows_attempted
                    );
                    created.extend(outcome.created);
                    rows_attempted += outcome.rows_attempted;
                    rows_failed += outcome.rows_failed;
                }
                Err(FileError::Auth) => return Err(BatchError::Api(ApiError::Auth)),
                Err(err) => log::error!("Skipping file: {}", err),
            }
        }

        if created.is_empty() {
            return Err(BatchError::EmptyInput {
                files: files.len(),
                rows_attempted,
                rows_failed,
            });
        }
        Ok(created)
    }

    fn process_file(
        &self,
        cache: &mut ReferenceCache,
        path: &Path,
    ) -> Result<FileOutcome, FileError> {
        let mut table = load_first_sheet(path).map_err(|source| FileError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        normalize_columns(&mut table);
        if table.is_empty() {
            return Err(FileError::Empty {
                path: path.to_path_buf(),
            });
        }
        self.process_table(cache, &table)
    }

    /// Run the row loop over a normalized table
    fn process_table(
        &self,
        cache: &mut ReferenceCache,
        table: &SheetTable,
    ) -> Result<FileOutcome, FileError> {
        let mut outcome = FileOutcome::default();

        for idx in 0..table.row_count() {
            outcome.rows_attempted += 1;
            let row_no = idx + 1;

            let row = match DiscrepancyRow::from_record(table.record(idx)) {
                Ok(row) => row,
                Err(err) => {
                    log::warn!("Skipping row {}: {}", row_no, err);
                    outcome.rows_failed += 1;
                    continue;
                }
            };

            match self.submit_row(cache, row) {
                Ok(summary) => {
                    log::info!(
                        "Created issue {} in project {}",
                        summary.id,
                        summary.project
                    );
                    outcome.created.push(summary);
                }
                Err(RowError::Api(ApiError::Auth)) => return Err(FileError::Auth),
                Err(RowError::Api(err)) if err.is_connectivity() => {
                    // The remote is gone; the rest of this file cannot
                    // succeed, but other files may once it comes back
                    log::error!(
                        "Lost connection at row {}, abandoning the rest of the file: {}",
                        row_no,
                        err
                    );
                    outcome.rows_failed += 1;
                    break;
                }
                Err(err) => {
                    log::warn!("Skipping row {}: {}", row_no, err);
                    outcome.rows_failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    /// Validate, map and submit a single row
    fn submit_row(
        &self,
        cache: &mut ReferenceCache,
        row: DiscrepancyRow,
    ) -> Result<CreatedIssueSummary, RowError> {
        let validated = validate(row, cache, self.api)?;
        let request = to_create_request(&validated);
        let issue = self.api.create_issue(&request)?;
        Ok(CreatedIssueSummary {
            id: issue.id,
            project: issue.project.name,
            subject: issue.subject,
        })
    }
}
