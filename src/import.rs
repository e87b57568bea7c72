use std::path::{Path, PathBuf};

use anyhow::anyhow;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::error::{ImportError, ValidationError};
use crate::game_file::{GameFile, ParseOptions};
use crate::store::games::{store_game, ImportOutcome};
use crate::store::models::RowId;
use crate::store::Store;
use crate::util::FlagCoercion;

const DEFAULT_MAX_FILE_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct ImportOptions {
    /// Files larger than this are rejected before parsing.
    pub max_file_bytes: usize,
    pub flag_coercion: FlagCoercion,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            flag_coercion: FlagCoercion::default(),
        }
    }
}

impl ImportOptions {
    const fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            flag_coercion: self.flag_coercion,
        }
    }
}

/// Size check and parse. Touches no storage, so it is safe to run in parallel.
fn validate(bytes: &[u8], options: &ImportOptions) -> Result<GameFile, ValidationError> {
    if bytes.len() > options.max_file_bytes {
        return Err(ValidationError::TooLarge {
            size: bytes.len(),
            limit: options.max_file_bytes,
        });
    }
    GameFile::parse(bytes, &options.parse_options())
}

fn ensure_season(store: &Store, season_id: RowId) -> Result<(), ImportError> {
    match store.season(season_id)? {
        Some(_) => Ok(()),
        None => Err(ImportError::Storage(anyhow!("Season #{season_id} does not exist"))),
    }
}

/// Imports a single game file into a season. A game that is already stored comes back as
/// `AlreadyImported` and leaves the database unchanged.
pub fn import_file(
    store: &mut Store,
    bytes: &[u8],
    season_id: RowId,
    options: &ImportOptions,
) -> Result<ImportOutcome, ImportError> {
    ensure_season(store, season_id)?;
    debug!("Reading pitching decisions with {} flag coercion", options.flag_coercion);
    let file = validate(bytes, options)?;
    Ok(store_game(store.conn_mut(), &file, season_id)?)
}

#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub result: Result<ImportOutcome, ImportError>,
}

impl FileReport {
    pub fn status(&self) -> &'static str {
        match &self.result {
            Ok(ImportOutcome::Created(_)) => "created",
            Ok(ImportOutcome::AlreadyImported(_)) => "skipped",
            Err(e) if e.is_validation() => "invalid",
            Err(_) => "failed",
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn created(&self) -> usize {
        self.count(|r| matches!(r, Ok(ImportOutcome::Created(_))))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(ImportOutcome::AlreadyImported(_))))
    }

    pub fn failed(&self) -> usize {
        self.count(Result::is_err)
    }

    fn count(&self, pred: impl Fn(&Result<ImportOutcome, ImportError>) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.result)).count()
    }
}

/// Imports many files into one season. Parsing runs in parallel; each file is then written
/// in its own transaction, in input order, so one file's failure does not affect another.
pub fn import_batch(
    store: &mut Store,
    files: Vec<(String, Vec<u8>)>,
    season_id: RowId,
    options: &ImportOptions,
) -> Result<BatchReport, ImportError> {
    ensure_season(store, season_id)?;
    info!(
        "Importing {} files into season #{} with {} flag coercion",
        files.len(),
        season_id,
        options.flag_coercion
    );
    let parsed = files
        .into_par_iter()
        .map(|(name, bytes)| {
            let file = validate(&bytes, options);
            (name, file)
        })
        .collect::<Vec<_>>();

    let files = parsed
        .into_iter()
        .map(|(name, file)| {
            let result = file
                .map_err(ImportError::from)
                .and_then(|f| Ok(store_game(store.conn_mut(), &f, season_id)?));
            log_result(&name, &result);
            FileReport { name, result }
        })
        .collect::<Vec<_>>();
    let report = BatchReport { files };
    info!(
        "Batch finished: {} created, {} skipped, {} failed",
        report.created(),
        report.skipped(),
        report.failed()
    );
    Ok(report)
}

/// Reads and imports files from disk. Unreadable files are reported like any other failure.
pub fn import_paths(
    store: &mut Store,
    paths: &[PathBuf],
    season_id: RowId,
    options: &ImportOptions,
) -> Result<BatchReport, ImportError> {
    let (readable, unreadable): (Vec<_>, Vec<_>) = paths
        .par_iter()
        .map(|path| (display_name(path), std::fs::read(path).map_err(|e| (path.clone(), e))))
        .partition(|(_, r)| r.is_ok());

    let buffers = readable
        .into_iter()
        .filter_map(|(name, r)| r.ok().map(|bytes| (name, bytes)))
        .collect::<Vec<_>>();
    debug!("Read {} of {} files", buffers.len(), paths.len());
    let mut report = import_batch(store, buffers, season_id, options)?;

    for (name, r) in unreadable {
        if let Err((path, source)) = r {
            let result = Err(ImportError::Read { path, source });
            log_result(&name, &result);
            report.files.push(FileReport { name, result });
        }
    }
    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

fn log_result(name: &str, result: &Result<ImportOutcome, ImportError>) {
    match result {
        Ok(ImportOutcome::Created(g)) => info!("{}: imported as game #{}", name, g.id),
        Ok(ImportOutcome::AlreadyImported(g)) => warn!("{}: already imported as game #{}", name, g.id),
        Err(e) => error!("{}: {}", name, e),
    }
}
