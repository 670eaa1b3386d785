use crate::error::{BatchError, RenameFailure};
use crate::logging::BatchLogger;
use crate::report::{BatchReport, FileOutcome, OutcomeStatus};
use crate::rule::{compute_new_name, split_extension, RenameRule};
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use walkdir::WalkDir;

/// Everything one batch run needs. Fixed for the duration of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    pub folder_path: PathBuf,
    /// Without the leading dot.
    pub extension_filter: String,
    pub rule: RenameRule,
    pub copy_mode: bool,
    /// Process files in lexicographic order instead of directory order.
    #[serde(default)]
    pub sort_entries: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTask {
    pub original_path: PathBuf,
    pub original_name: String,
    pub computed_name: String,
    pub extension: String,
}

impl FileTask {
    pub fn changed(&self) -> bool {
        self.original_name != self.computed_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameEffect {
    Moved,
    Copied,
}

pub struct BatchProcessor<L: BatchLogger> {
    logger: L,
}

impl<L: BatchLogger> BatchProcessor<L> {
    pub fn new(logger: L) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Names of regular files directly inside `folder` ending in
    /// `.{extension}`. Problems are logged and yield an empty list.
    pub fn list_files_with_extension(&self, folder: &Path, extension: &str) -> Vec<String> {
        match self.matching_names(folder, extension, false) {
            Ok(names) => names,
            Err(err) => {
                self.log_abort(&err);
                Vec::new()
            }
        }
    }

    /// Computes the target name of every matching file without touching
    /// anything.
    pub fn scan(&self, config: &BatchConfig) -> Result<Vec<FileTask>, BatchError> {
        let names = self.matching_names(
            &config.folder_path,
            &config.extension_filter,
            config.sort_entries,
        )?;

        Ok(names
            .into_iter()
            .map(|name| {
                let computed_name = compute_new_name(&name, &config.rule);
                let extension = split_extension(&name).1.to_string();
                FileTask {
                    original_path: config.folder_path.join(&name),
                    original_name: name,
                    computed_name,
                    extension,
                }
            })
            .collect())
    }

    pub fn apply_one_rename(
        &self,
        folder: &Path,
        original_name: &str,
        rule: &RenameRule,
        copy_mode: bool,
    ) -> Result<RenameEffect, RenameFailure> {
        let new_name = compute_new_name(original_name, rule);
        self.transfer(folder, original_name, &new_name, copy_mode)
    }

    /// Scans, then moves or copies each file in turn. A failing file is
    /// recorded and skipped; files already handled stay handled.
    pub fn run_batch(&self, config: &BatchConfig) -> BatchReport {
        let started_at = Local::now();
        self.logger.info(&format!(
            "Starting file processing in: {} (Extension: .{})",
            config.folder_path.display(),
            config.extension_filter
        ));

        let tasks = match self.scan(config) {
            Ok(tasks) => tasks,
            Err(err) => {
                self.log_abort(&err);
                return BatchReport {
                    folder: config.folder_path.clone(),
                    extension: config.extension_filter.clone(),
                    copy_mode: config.copy_mode,
                    started_at,
                    finished_at: Local::now(),
                    aborted: Some(err),
                    outcomes: Vec::new(),
                };
            }
        };

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            self.logger.info(&format!(
                "Processing file: {} -> {}",
                task.original_name, task.computed_name
            ));

            let status = if !task.changed() {
                self.logger
                    .info(&format!("Unchanged, skipping: {}", task.original_name));
                OutcomeStatus::Unchanged
            } else {
                match self.transfer(
                    &config.folder_path,
                    &task.original_name,
                    &task.computed_name,
                    config.copy_mode,
                ) {
                    Ok(RenameEffect::Moved) => OutcomeStatus::Renamed,
                    Ok(RenameEffect::Copied) => OutcomeStatus::Copied,
                    Err(failure) => OutcomeStatus::from(&failure),
                }
            };

            outcomes.push(FileOutcome {
                original_name: task.original_name,
                new_name: task.computed_name,
                status,
            });
        }

        self.logger.info(&format!(
            "Completed processing for folder: {}",
            config.folder_path.display()
        ));

        BatchReport {
            folder: config.folder_path.clone(),
            extension: config.extension_filter.clone(),
            copy_mode: config.copy_mode,
            started_at,
            finished_at: Local::now(),
            aborted: None,
            outcomes,
        }
    }

    fn matching_names(
        &self,
        folder: &Path,
        extension: &str,
        sort: bool,
    ) -> Result<Vec<String>, BatchError> {
        if !folder.is_dir() {
            return Err(BatchError::Config {
                folder: folder.to_path_buf(),
                reason: "not an existing directory".to_string(),
            });
        }

        let suffix = format!(".{extension}");
        let mut walker = WalkDir::new(folder).min_depth(1).max_depth(1);
        if sort {
            walker = walker.sort_by_file_name();
        }

        let mut names = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(BatchError::Config {
                        folder: folder.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    self.logger
                        .warn(&format!("Skipping unreadable entry in {}: {err}", folder.display()));
                    continue;
                }
            };

            if !entry.path().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                self.logger.warn(&format!(
                    "Skipping file with non UTF-8 name: {}",
                    entry.path().display()
                ));
                continue;
            };
            if name.ends_with(&suffix) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() {
            return Err(BatchError::NoMatchingFiles {
                folder: folder.to_path_buf(),
                extension: extension.to_string(),
            });
        }
        Ok(names)
    }

    fn log_abort(&self, err: &BatchError) {
        match err {
            BatchError::Config { .. } => self.logger.error(&err.to_string()),
            BatchError::NoMatchingFiles { .. } => self.logger.warn(&err.to_string()),
        }
    }

    fn transfer(
        &self,
        folder: &Path,
        original_name: &str,
        new_name: &str,
        copy_mode: bool,
    ) -> Result<RenameEffect, RenameFailure> {
        let result = transfer_file(folder, original_name, new_name, copy_mode);
        match &result {
            Ok(RenameEffect::Copied) => self.logger.info(&format!(
                "Copied: {} -> {}",
                folder.join(original_name).display(),
                folder.join(new_name).display()
            )),
            Ok(RenameEffect::Moved) => self.logger.info(&format!(
                "Renamed: {} -> {}",
                folder.join(original_name).display(),
                folder.join(new_name).display()
            )),
            Err(failure) => self.logger.error(&failure.to_string()),
        }
        result
    }
}

/// Plain listing of `folder` for display after a run: every direct entry,
/// sorted, no filtering.
pub fn list_folder_entries(folder: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(folder)
        .with_context(|| format!("could not read folder: {}", folder.display()))?
    {
        let entry = entry.with_context(|| format!("could not read entry in: {}", folder.display()))?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

fn transfer_file(
    folder: &Path,
    original_name: &str,
    new_name: &str,
    copy_mode: bool,
) -> Result<RenameEffect, RenameFailure> {
    if !is_plain_file_name(new_name) {
        return Err(RenameFailure::InvalidTarget(new_name.to_string()));
    }

    let old_path = folder.join(original_name);
    let new_path = folder.join(new_name);

    let source_is_file = fs::metadata(&old_path)
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !source_is_file {
        return Err(RenameFailure::SourceMissing(old_path));
    }
    if fs::symlink_metadata(&new_path).is_ok() {
        return Err(RenameFailure::TargetExists(new_path));
    }

    let (result, effect) = if copy_mode {
        (copy_exclusive(&old_path, &new_path, false), RenameEffect::Copied)
    } else {
        (move_exclusive(&old_path, &new_path), RenameEffect::Moved)
    };

    match result {
        Ok(()) => Ok(effect),
        // Something appeared at the target between the check and the write.
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            Err(RenameFailure::TargetExists(new_path))
        }
        Err(source) => Err(RenameFailure::TransferFailed {
            from: old_path,
            to: new_path,
            source,
        }),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(MAIN_SEPARATOR)
        && !name.contains('\0')
}

// Never overwrites: the destination is created with create_new semantics.
// `keep_times` carries access and modification times over; ownership is not.
fn copy_exclusive(from: &Path, to: &Path, keep_times: bool) -> io::Result<()> {
    let mut source = File::open(from)?;
    let meta = source.metadata()?;
    let mut dest = OpenOptions::new().write(true).create_new(true).open(to)?;

    let written = io::copy(&mut source, &mut dest)
        .and_then(|_| {
            if keep_times {
                let times = FileTimes::new()
                    .set_accessed(meta.accessed()?)
                    .set_modified(meta.modified()?);
                dest.set_times(times)?;
            }
            dest.sync_all()
        })
        .and_then(|_| fs::set_permissions(to, meta.permissions()));
    if written.is_err() {
        drop(dest);
        let _ = fs::remove_file(to);
    }
    written
}

// `fs::rename` replaces an existing target on unix, so link then unlink.
// Falls back to copy + remove where hard links are unavailable (other device,
// filesystems without link support).
fn move_exclusive(from: &Path, to: &Path) -> io::Result<()> {
    move_exclusive_with(
        from,
        to,
        |from, to| fs::hard_link(from, to),
        |path| fs::remove_file(path),
    )
}

fn move_exclusive_with(
    from: &Path,
    to: &Path,
    link: impl FnOnce(&Path, &Path) -> io::Result<()>,
    remove_source: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<()> {
    match link(from, to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Err(err),
        Err(_) => copy_exclusive(from, to, true)?,
    }

    if let Err(err) = remove_source(from) {
        let _ = fs::remove_file(to);
        return Err(err);
    }
    Ok(())
}
