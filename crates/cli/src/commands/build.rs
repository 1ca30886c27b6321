use anyhow::{Context, Result};
use menu_kit_core::config::{SiteConfig, ThemeConfig};
use menu_kit_core::{Category, ContentEntry, MenuItem, Special};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::validate::{ensure_valid, load_config, print_report, validate_site};

/// Site-wide values the page renderer needs alongside the records
#[derive(Debug, Serialize)]
struct SiteManifest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    theme: &'a ThemeConfig,
    /// Categories with at least one published item, in menu order
    categories: Vec<&'static str>,
}

/// Validate all content and write it as JSON for the page renderer
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building site content...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let config = load_config(&path)?;
    let report = validate_site(&path, &config).await?;
    print_report(&report);
    ensure_valid(&report).context("Build aborted")?;

    let Some(mut site) = report.site else {
        anyhow::bail!("Build aborted: no content was produced");
    };

    sort_menu(&mut site.menu);
    sort_specials(&mut site.specials);

    println!();
    println!("📁 Writing content...");
    tokio::fs::create_dir_all(&output)
        .await
        .context("Failed to create output directory")?;

    write_json(&output.join("menu.json"), &site.menu).await?;
    write_json(&output.join("specials.json"), &site.specials).await?;
    write_json(&output.join("hours.json"), &site.hours).await?;
    write_json(&output.join("contact.json"), &site.contact).await?;
    write_json(&output.join("site.json"), &manifest(&config, &site.menu)).await?;
    println!(
        "   ✓ {} menu item(s), {} special(s)",
        site.menu.len(),
        site.specials.len()
    );

    info!(output = %output.display(), "build complete");
    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());

    Ok(())
}

/// Menu order: category declaration order, then title
fn sort_menu(menu: &mut [ContentEntry<MenuItem>]) {
    menu.sort_by(|a, b| {
        a.data
            .category
            .cmp(&b.data.category)
            .then_with(|| a.data.title.cmp(&b.data.title))
    });
}

fn sort_specials(specials: &mut [ContentEntry<Special>]) {
    specials.sort_by(|a, b| {
        a.data
            .start_date
            .cmp(&b.data.start_date)
            .then_with(|| a.data.title.cmp(&b.data.title))
    });
}

fn manifest<'a>(config: &'a SiteConfig, menu: &[ContentEntry<MenuItem>]) -> SiteManifest<'a> {
    let categories = Category::ALL
        .iter()
        .filter(|c| menu.iter().any(|e| e.data.is_visible() && e.data.category == **c))
        .map(|c| c.as_str())
        .collect();

    SiteManifest {
        name: &config.name,
        url: config.url.as_deref(),
        theme: &config.theme,
        categories,
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
