//! Spreadsheet-to-Redmine import pipeline
//!
//! A batch run loads each workbook's first sheet, normalizes the columns,
//! cross-checks every row against a per-run snapshot of the tracker's
//! reference data, and submits the rows that survive as new issues.
//! Failures are isolated at the narrowest sensible scope (row, then file,
//! then batch); see [`processor`] for the policy.

pub mod cache;
pub mod excel;
pub mod mapper;
pub mod normalize;
pub mod processor;
pub mod row;
pub mod stage;
pub mod validate;

#[cfg(test)]
pub mod testutil;

pub use processor::{BatchError, BatchProcessor, CreatedIssueSummary};
pub use stage::StagedFiles;
