//! Site loading and batch validation.
//!
//! Reads every collection file and data file a [`SiteConfig`] points at,
//! validates each one independently and gathers the outcome into a
//! [`ValidationReport`]. Collection files are validated in parallel; no
//! state is shared between records.

use crate::error::ValidationError;
use crate::validate::{validate_contact, validate_hours, validate_menu_item, validate_special};
use menu_kit_core::config::{ContentConfig, SiteConfig};
use menu_kit_core::{
    Contact, ContentEntry, Hours, MenuItem, RawRecord, Special, parse_front_matter,
    parse_json_record,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Why a source file was rejected
#[derive(Debug, Error)]
pub enum FileErrorReason {
    /// The file could not be read or its front-matter/JSON could not be parsed
    #[error("{0}")]
    Load(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A rejected source file, path relative to the site root
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    pub reason: FileErrorReason,
}

impl FileError {
    fn load(path: &Path, reason: impl fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: FileErrorReason::Load(reason.to_string()),
        }
    }

    fn invalid(path: &Path, err: ValidationError) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: FileErrorReason::Invalid(err),
        }
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        match &self.reason {
            FileErrorReason::Invalid(err) => Some(err),
            FileErrorReason::Load(_) => None,
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Every validated record of a site, ready for the page renderer
#[derive(Debug, Clone, Serialize)]
pub struct SiteContent {
    pub menu: Vec<ContentEntry<MenuItem>>,
    pub specials: Vec<ContentEntry<Special>>,
    pub hours: Hours,
    pub contact: Contact,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<FileError>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
    /// Present only when no file failed
    pub site: Option<SiteContent>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of individual field violations across all files
    pub fn violation_count(&self) -> usize {
        self.errors
            .iter()
            .map(|e| e.validation_error().map_or(1, |v| v.violations.len()))
            .sum()
    }
}

/// Load and validate every content record of the site rooted at `root`
pub fn load_site(root: &Path, config: &SiteConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    let content = &config.content;

    let menu = load_collection(
        root,
        &content.menu_dir(),
        content,
        "menu",
        validate_menu_item,
        &mut report,
    );
    let specials = load_collection(
        root,
        &content.specials_dir(),
        content,
        "specials",
        validate_special,
        &mut report,
    );
    let hours = load_data_file(root, &config.data.hours, validate_hours, &mut report);
    let contact = load_data_file(root, &config.data.contact, validate_contact, &mut report);

    check_duplicate_slugs("menu", &menu, &mut report);
    check_duplicate_slugs("specials", &specials, &mut report);
    check_special_dates(&specials, &mut report);
    if let Some(contact) = &contact
        && !is_valid_email(&contact.email)
    {
        report.warnings.push(format!(
            "{}: email '{}' does not look like an address",
            config.data.contact.display(),
            contact.email
        ));
    }

    summarize(&menu, &specials, hours.as_ref(), &mut report);

    if report.errors.is_empty()
        && let (Some(hours), Some(contact)) = (hours, contact)
    {
        report.site = Some(SiteContent {
            menu,
            specials,
            hours,
            contact,
        });
    }

    report
}

/// Collection entries under `dir`, in sorted path order.
///
/// Hidden files and names starting with `_` are skipped, along with
/// anything whose extension the content config does not accept. Symlinks
/// are followed. Entries the walk cannot read (broken links, unreadable
/// directories, link cycles) come back as errors with paths relative to
/// `root`.
pub fn discover_entries(
    root: &Path,
    dir: &Path,
    content: &ContentConfig,
) -> (Vec<PathBuf>, Vec<FileError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(e.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(dir);
                let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
                errors.push(FileError::load(&rel, err));
                continue;
            }
        };

        let accepted = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| content.accepts_extension(ext));
        if entry.file_type().is_file() && accepted {
            files.push(entry.into_path());
        }
    }

    (files, errors)
}

fn is_ignored(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || name.starts_with('_')
}

fn load_collection<T, F>(
    root: &Path,
    rel_dir: &Path,
    content: &ContentConfig,
    label: &str,
    validate_fn: F,
    report: &mut ValidationReport,
) -> Vec<ContentEntry<T>>
where
    T: Send,
    F: Fn(&RawRecord) -> Result<T, ValidationError> + Sync,
{
    let dir = root.join(rel_dir);
    if !dir.is_dir() {
        report.warnings.push(format!(
            "{} collection directory not found: {}",
            label,
            rel_dir.display()
        ));
        return Vec::new();
    }

    let (files, walk_errors) = discover_entries(root, &dir, content);
    report.errors.extend(walk_errors);
    debug!("Validating {} {} file(s)", files.len(), label);

    // collect() on an indexed parallel iterator keeps the sorted order
    let results: Vec<Result<ContentEntry<T>, FileError>> = files
        .par_iter()
        .map(|path| load_entry(root, &dir, path, &validate_fn))
        .collect();

    let mut entries = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(entry) => entries.push(entry),
            Err(err) => report.errors.push(err),
        }
    }
    entries
}

fn load_entry<T, F>(
    root: &Path,
    dir: &Path,
    path: &Path,
    validate_fn: &F,
) -> Result<ContentEntry<T>, FileError>
where
    F: Fn(&RawRecord) -> Result<T, ValidationError>,
{
    let rel = path.strip_prefix(root).unwrap_or(path);

    let content = fs::read_to_string(path).map_err(|e| FileError::load(rel, e))?;
    let (raw, body) = parse_front_matter(&content).map_err(|e| FileError::load(rel, e))?;
    let data = validate_fn(&raw).map_err(|e| FileError::invalid(rel, e))?;

    debug!("Validated {}", rel.display());
    Ok(ContentEntry::new(entry_id(dir, path), body, data))
}

/// Path relative to the collection directory, always with `/` separators
fn entry_id(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn load_data_file<T, F>(
    root: &Path,
    rel_path: &Path,
    validate_fn: F,
    report: &mut ValidationReport,
) -> Option<T>
where
    F: Fn(&RawRecord) -> Result<T, ValidationError>,
{
    let read = || -> Result<T, FileError> {
        let content = fs::read_to_string(root.join(rel_path)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileError::load(rel_path, "file not found"),
            _ => FileError::load(rel_path, e),
        })?;
        let raw = parse_json_record(&content).map_err(|e| FileError::load(rel_path, e))?;
        validate_fn(&raw).map_err(|e| FileError::invalid(rel_path, e))
    };

    match read() {
        Ok(data) => {
            debug!("Validated {}", rel_path.display());
            Some(data)
        }
        Err(err) => {
            report.errors.push(err);
            None
        }
    }
}

fn check_duplicate_slugs<T>(label: &str, entries: &[ContentEntry<T>], report: &mut ValidationReport) {
    let mut seen: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for entry in entries {
        seen.entry(&entry.slug).or_default().push(&entry.id);
    }

    for (slug, ids) in seen {
        if ids.len() > 1 {
            report.warnings.push(format!(
                "{}: slug '{}' is shared by {}",
                label,
                slug,
                ids.join(", ")
            ));
        }
    }
}

fn check_special_dates(specials: &[ContentEntry<Special>], report: &mut ValidationReport) {
    for entry in specials {
        let special = &entry.data;
        if special.end_date < special.start_date {
            report.warnings.push(format!(
                "specials/{}: endDate {} is before startDate {}",
                entry.id, special.end_date, special.start_date
            ));
        }
    }
}

fn summarize(
    menu: &[ContentEntry<MenuItem>],
    specials: &[ContentEntry<Special>],
    hours: Option<&Hours>,
    report: &mut ValidationReport,
) {
    let hidden: Vec<&str> = menu
        .iter()
        .filter(|e| !e.data.is_visible())
        .map(|e| e.id.as_str())
        .collect();

    report
        .info
        .push(format!("Menu: {} item(s), {} unpublished", menu.len(), hidden.len()));
    for id in hidden {
        report.info.push(format!("  menu/{} is unpublished", id));
    }

    let featured = specials.iter().filter(|e| e.data.featured).count();
    report.info.push(format!(
        "Specials: {} ({} featured)",
        specials.len(),
        featured
    ));

    if let Some(hours) = hours {
        let open = hours.hours.iter().filter(|d| !d.closed).count();
        report.info.push(format!(
            "Hours: {} day(s), open {}",
            hours.hours.len(),
            open
        ));
    }
}

/// Validate email format
/// Checks for basic RFC 5322 compliance without full regex
fn is_valid_email(email: &str) -> bool {
    // Must have exactly one @ symbol
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if domain.is_empty() || domain.len() > 255 {
        return false;
    }

    // Domain needs a dot and no dot/hyphen at either end
    if !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return false;
    }

    // TLD of at least 2 chars
    domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.len() >= 2)
}
