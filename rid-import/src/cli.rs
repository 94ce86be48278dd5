//! Command-line surface: argument parsing, credential loading, result
//! rendering. All import semantics live in [`crate::import`].

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;

use crate::api::RedmineClient;
use crate::import::{BatchProcessor, StagedFiles};

/// Create Redmine issues from Review Item Discrepancy spreadsheets
#[derive(Debug, Parser)]
#[command(name = "rid-import", version, about)]
pub struct Cli {
    /// Spreadsheet files to import (.xlsx, first sheet only)
    pub files: Vec<PathBuf>,

    /// Scan a directory for .xlsx files instead of listing them
    #[arg(long, conflicts_with = "files")]
    pub dir: Option<PathBuf>,

    /// Redmine base URL (defaults to $REDMINE_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Redmine account name (defaults to $REDMINE_USER)
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run(cli: Cli) -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let files = gather_files(&cli)?;
    if files.is_empty() {
        bail!("No spreadsheet files to process");
    }

    let url = setting(cli.url, "REDMINE_URL", "--url")?;
    let user = setting(cli.user, "REDMINE_USER", "--user")?;
    let password = match std::env::var("REDMINE_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password(format!("Redmine password for {user}: "))
            .context("Failed to read password")?,
    };

    // Work on scoped copies so the originals are never touched and the
    // copies cannot outlive the run
    let staged = StagedFiles::stage(&files)?;

    let client = RedmineClient::new(url, user, password)?;
    let processor = BatchProcessor::new(&client);
    let created = processor
        .process_batch(staged.paths())
        .map_err(anyhow::Error::from)?;

    println!();
    println!(
        "{}",
        format!("Created {} issue(s)", created.len()).green().bold()
    );
    for summary in &created {
        println!(
            "{:>8}  {:<28}  {}",
            summary.id.to_string().cyan(),
            summary.project,
            summary.subject
        );
    }
    Ok(())
}

fn setting(flag: Option<String>, env_var: &str, flag_name: &str) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }
    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("Missing {flag_name} (or the {env_var} environment variable)"),
    }
}

fn gather_files(cli: &Cli) -> Result<Vec<PathBuf>> {
    let Some(dir) = &cli.dir else {
        return Ok(cli.files.clone());
    };

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
        })
        // Office drops "~$" lock files next to open workbooks
        .filter(|path| {
            path.file_name()
                .map(|name| !name.to_string_lossy().starts_with('~'))
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_files_scans_directory_and_skips_lock_files() {
        let dir = std::env::temp_dir().join(format!("rid-import-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.xlsx", "a.xlsx", "~$a.xlsx", "notes.txt"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }

        let cli = Cli {
            files: vec![],
            dir: Some(dir.clone()),
            url: None,
            user: None,
        };
        let files = gather_files(&cli).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xlsx".to_string(), "b.xlsx".to_string()]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_explicit_files_pass_through_untouched() {
        let cli = Cli {
            files: vec![PathBuf::from("reviews/batch1.xlsx")],
            dir: None,
            url: None,
            user: None,
        };
        let files = gather_files(&cli).unwrap();
        assert_eq!(files, vec![PathBuf::from("reviews/batch1.xlsx")]);
    }
}
