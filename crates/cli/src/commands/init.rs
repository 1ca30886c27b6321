use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use menu_kit_core::config::SITE_CONFIG_FILE;
use menu_kit_core::{Contact, DayHours, Hours};
use std::fs;
use std::path::{Path, PathBuf};

const DAYS: &[&str] = &[
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];
const SPECIAL_LENGTH_DAYS: u64 = 30;

/// Escape a string for safe inclusion in a TOML basic string
///
/// Backslash, quote and the control characters with short forms
/// (\b \t \n \f \r) use those; every other control character
/// (U+0000-U+001F, U+007F) is written as `\uXXXX`, since TOML forbids
/// them unescaped.
///
/// site.toml is generated as a commented template, which the toml crate's
/// serializer cannot produce.
///
/// See: https://toml.io/en/v1.0.0#string
fn toml_escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\x0C' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\x00'..='\x1F' | '\x7F' => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Initialize a new site directory with sample content.
///
/// Creates the directory if needed, then writes:
/// - site.toml with the default content layout
/// - one sample menu item and one sample special
/// - hours.json and contact.json data files
///
/// Everything written passes `menu-kit validate` as-is.
///
/// # Errors
///
/// Returns an error if site.toml already exists or a file cannot be written.
pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let site_toml_path = path.join(SITE_CONFIG_FILE);
    if site_toml_path.exists() {
        anyhow::bail!(
            "{} already exists at {}\nHint: Delete it first or use a different directory",
            SITE_CONFIG_FILE,
            site_toml_path.display()
        );
    }

    let name = match name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => name_from_dir(&path),
    };

    create_directory_structure(&path)?;
    generate_site_toml(&path, &name)?;
    generate_menu_sample(&path)?;
    generate_special_sample(&path, Local::now().date_naive())?;
    generate_hours(&path)?;
    generate_contact(&path, &name)?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml                  ← Site name and content layout");
    println!("  └── src/");
    println!("      ├── content/");
    println!("      │   ├── menu/tacos-al-pastor.md");
    println!("      │   └── specials/martes-de-tacos.md");
    println!("      └── data/");
    println!("          ├── hours.json");
    println!("          └── contact.json       ← Edit address, phone, email");

    println!("\nNext steps:");
    println!("  1. Add one file per dish to src/content/menu/");
    println!("  2. Fill in src/data/contact.json");
    println!("  3. Check: menu-kit validate {}", path.display());

    Ok(())
}

/// Turn a directory name into a restaurant name.
///
/// - `la-cocina` → "La Cocina"
/// - `tacos_don_pepe` → "Tacos Don Pepe"
fn name_from_dir(path: &Path) -> String {
    let dirname = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .trim();

    let normalized = dirname.replace(['_', '-'], " ");
    let words: Vec<String> = normalized
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect();

    if words.is_empty() {
        "My Restaurant".to_string()
    } else {
        words.join(" ")
    }
}

fn create_directory_structure(base: &Path) -> Result<()> {
    fs::create_dir_all(base.join("src/content/menu"))
        .context("Failed to create menu directory")?;
    fs::create_dir_all(base.join("src/content/specials"))
        .context("Failed to create specials directory")?;
    fs::create_dir_all(base.join("src/data")).context("Failed to create data directory")?;
    Ok(())
}

fn generate_site_toml(base: &Path, name: &str) -> Result<()> {
    let toml = format!(
        r##"# Site configuration
# Generated by menu-kit init

[site]
name = "{}"
# url = "https://example.com"
output = "static"

[content]
dir = "src/content"
menu = "menu"
specials = "specials"
extensions = ["md", "mdx", "markdown"]

[data]
hours = "src/data/hours.json"
contact = "src/data/contact.json"

[theme]
sans = ["Inter", "system-ui", "sans-serif"]
serif = ["Playfair Display", "Georgia", "serif"]
"##,
        toml_escape_string(name)
    );

    fs::write(base.join(SITE_CONFIG_FILE), toml).context("Failed to write site.toml")?;
    Ok(())
}

fn generate_menu_sample(base: &Path) -> Result<()> {
    let sample = r##"---
title: Tacos al Pastor
# One of: Entradas, Charolas, Arroces, Naturales, Empanizados, Horneados, Bebidas, Extras
category: Entradas
price: 45
description: Tres tacos de cerdo adobado con piña, cebolla y cilantro.
# image: /images/tacos-al-pastor.jpg
vegetarian: false
vegan: false
glutenFree: true
# 0 (mild) to 3 (hot)
spicyLevel: 1
published: true
---

Receta de la casa.
"##;

    fs::write(base.join("src/content/menu/tacos-al-pastor.md"), sample)
        .context("Failed to write sample menu item")?;
    Ok(())
}

fn generate_special_sample(base: &Path, today: NaiveDate) -> Result<()> {
    let end = today
        .checked_add_days(Days::new(SPECIAL_LENGTH_DAYS))
        .unwrap_or(today);

    let sample = format!(
        r##"---
title: Martes de Tacos
startDate: {}
endDate: {}
description: Dos órdenes de tacos al pastor por el precio de una.
price: 45
regularPrice: 90
featured: true
---
"##,
        today.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    );

    fs::write(base.join("src/content/specials/martes-de-tacos.md"), sample)
        .context("Failed to write sample special")?;
    Ok(())
}

fn generate_hours(base: &Path) -> Result<()> {
    let hours = Hours {
        hours: DAYS
            .iter()
            .map(|day| {
                let closed = *day == "Domingo";
                DayHours {
                    day: day.to_string(),
                    open: if closed { "" } else { "09:00" }.to_string(),
                    close: if closed { "" } else { "21:00" }.to_string(),
                    closed,
                }
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&hours)?;
    fs::write(base.join("src/data/hours.json"), json).context("Failed to write hours.json")?;
    Ok(())
}

fn generate_contact(base: &Path, name: &str) -> Result<()> {
    let contact = Contact {
        name: name.to_string(),
        address: "Calle Principal 123".to_string(),
        city: "Ciudad".to_string(),
        state: "Estado".to_string(),
        zip: "00000".to_string(),
        phone: "+52 55 0000 0000".to_string(),
        email: "contacto@example.com".to_string(),
        map_url: None,
    };

    let json = serde_json::to_string_pretty(&contact)?;
    fs::write(base.join("src/data/contact.json"), json)
        .context("Failed to write contact.json")?;
    Ok(())
}
