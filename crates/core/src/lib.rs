mod config;
mod error;
mod logging;
mod processor;
mod report;
mod rule;

pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use error::{BatchError, FailureKind, RenameFailure};
pub use logging::{
    app_span, init_logging, log_file_path, BatchLogger, LogGuard, LogSettings, TracingLogger,
    APP_TITLE,
};
pub use processor::{list_folder_entries, BatchConfig, BatchProcessor, FileTask, RenameEffect};
pub use report::{BatchReport, BatchStats, FileOutcome, OutcomeStatus};
pub use rule::{compute_new_name, parse_find_strings, split_extension, RenameRule};
