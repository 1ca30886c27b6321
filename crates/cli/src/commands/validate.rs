use anyhow::{Context, Result};
use menu_kit_core::config::{SITE_CONFIG_FILE, SiteConfig, parse_site_toml};
use menu_kit_validator::{FileErrorReason, ValidationReport, load_site};
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site at: {}", path.display());

    let config = load_config(&path)?;
    let report = validate_site(&path, &config).await?;
    print_report(&report);

    ensure_valid(&report)?;
    println!("\n✓ All content valid");

    Ok(())
}

/// Load site.toml from a site directory
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        anyhow::bail!("Site directory does not exist: {}", path.display());
    }

    let config_path = path.join(SITE_CONFIG_FILE);
    if !config_path.exists() {
        anyhow::bail!(
            "{} not found in {}\nRun 'menu-kit init {}' first",
            SITE_CONFIG_FILE,
            path.display(),
            path.display()
        );
    }

    let config = parse_site_toml(&config_path)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;
    println!("✓ {} valid ({})", SITE_CONFIG_FILE, config.name);
    Ok(config)
}

/// Run the file reads and schema checks off the async runtime
pub async fn validate_site(path: &Path, config: &SiteConfig) -> Result<ValidationReport> {
    let root = path.to_path_buf();
    let config = config.clone();

    let report = tokio::task::spawn_blocking(move || load_site(&root, &config))
        .await
        .context("Validation task failed")?;

    info!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );
    Ok(report)
}

pub fn print_report(report: &ValidationReport) {
    for line in &report.info {
        println!("  {}", line);
    }

    if !report.warnings.is_empty() {
        println!();
        for warning in &report.warnings {
            println!("⚠ {}", warning);
        }
    }

    if !report.errors.is_empty() {
        println!();
        for error in &report.errors {
            match &error.reason {
                FileErrorReason::Load(reason) => {
                    println!("✗ {}: {}", error.path.display(), reason);
                }
                FileErrorReason::Invalid(err) => {
                    println!("✗ {} (invalid {})", error.path.display(), err.schema);
                    for violation in &err.violations {
                        println!("    - {}", violation);
                    }
                }
            }
        }
    }
}

/// Fail with a summary when any file was rejected
pub fn ensure_valid(report: &ValidationReport) -> Result<()> {
    if !report.is_valid() {
        anyhow::bail!(
            "{} file(s) failed validation with {} problem(s)",
            report.errors.len(),
            report.violation_count()
        );
    }
    Ok(())
}
