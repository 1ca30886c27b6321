use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Name of the configuration file at the root of a site
pub const SITE_CONFIG_FILE: &str = "site.toml";

const DEFAULT_CONTENT_DIR: &str = "src/content";
const DEFAULT_MENU_DIR: &str = "menu";
const DEFAULT_SPECIALS_DIR: &str = "specials";
const DEFAULT_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];
const DEFAULT_HOURS_FILE: &str = "src/data/hours.json";
const DEFAULT_CONTACT_FILE: &str = "src/data/contact.json";
const DEFAULT_SANS: &[&str] = &["Inter", "system-ui", "sans-serif"];
const DEFAULT_SERIF: &[&str] = &["Playfair Display", "Georgia", "serif"];

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    #[serde(default)]
    content: RawContent,
    #[serde(default)]
    data: RawData,
    #[serde(default)]
    theme: RawTheme,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    name: String,
    url: Option<String>,
    output: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    dir: Option<String>,      // Convert to PathBuf
    menu: Option<String>,     // Relative to dir
    specials: Option<String>, // Relative to dir
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    hours: Option<String>,
    contact: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTheme {
    sans: Option<Vec<String>>,
    serif: Option<Vec<String>>,
}

/// Complete site configuration, every optional section filled in
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub name: String,
    pub url: Option<String>,
    pub content: ContentConfig,
    pub data: DataConfig,
    pub theme: ThemeConfig,
}

/// Where the collections live, relative to the site root
#[derive(Debug, Clone, PartialEq)]
pub struct ContentConfig {
    pub dir: PathBuf,
    pub menu: PathBuf,
    pub specials: PathBuf,
    /// Lowercase file extensions treated as collection entries
    pub extensions: Vec<String>,
}

impl ContentConfig {
    pub fn menu_dir(&self) -> PathBuf {
        self.dir.join(&self.menu)
    }

    pub fn specials_dir(&self) -> PathBuf {
        self.dir.join(&self.specials)
    }

    /// Whether a file extension marks a collection entry
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            menu: PathBuf::from(DEFAULT_MENU_DIR),
            specials: PathBuf::from(DEFAULT_SPECIALS_DIR),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Standalone JSON data files, relative to the site root
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub hours: PathBuf,
    pub contact: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            hours: PathBuf::from(DEFAULT_HOURS_FILE),
            contact: PathBuf::from(DEFAULT_CONTACT_FILE),
        }
    }
}

/// Font stacks handed to the stylesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub sans: Vec<String>,
    pub serif: Vec<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            sans: DEFAULT_SANS.iter().map(|f| f.to_string()).collect(),
            serif: DEFAULT_SERIF.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let path = path.as_ref();
    debug!("Reading site config from {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.site.name.trim().is_empty() {
        return Err(Error::ConfigParse("site.name must not be empty".to_string()));
    }

    // Only static output is supported; there is no server runtime
    if let Some(output) = raw.site.output.as_deref()
        && output != "static"
    {
        return Err(Error::ConfigParse(format!(
            "Unsupported site.output '{}': only \"static\" is supported",
            output
        )));
    }

    let defaults = ContentConfig::default();
    let content = ContentConfig {
        dir: optional_path(raw.content.dir, "content.dir", defaults.dir)?,
        menu: optional_path(raw.content.menu, "content.menu", defaults.menu)?,
        specials: optional_path(raw.content.specials, "content.specials", defaults.specials)?,
        extensions: match raw.content.extensions {
            Some(exts) => parse_extensions(exts)?,
            None => defaults.extensions,
        },
    };

    let defaults = DataConfig::default();
    let data = DataConfig {
        hours: optional_path(raw.data.hours, "data.hours", defaults.hours)?,
        contact: optional_path(raw.data.contact, "data.contact", defaults.contact)?,
    };

    let defaults = ThemeConfig::default();
    let theme = ThemeConfig {
        sans: raw.theme.sans.unwrap_or(defaults.sans),
        serif: raw.theme.serif.unwrap_or(defaults.serif),
    };

    Ok(SiteConfig {
        name: raw.site.name,
        url: raw.site.url,
        content,
        data,
        theme,
    })
}

fn optional_path(value: Option<String>, field_name: &str, default: PathBuf) -> Result<PathBuf> {
    match value {
        Some(path_str) => validate_path(&path_str, field_name),
        None => Ok(default),
    }
}

/// Normalize configured extensions: lowercase, no leading dot
fn parse_extensions(exts: Vec<String>) -> Result<Vec<String>> {
    if exts.is_empty() {
        return Err(Error::ConfigParse(
            "content.extensions must list at least one extension".to_string(),
        ));
    }

    exts.into_iter()
        .map(|ext| {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if ext.is_empty() {
                Err(Error::ConfigParse(
                    "Empty extension in 'content.extensions'".to_string(),
                ))
            } else {
                Ok(ext)
            }
        })
        .collect()
}

/// Resolve a configured content or data location.
///
/// Every location in site.toml is relative to the site root: the content
/// directory, the collection folders inside it, and the hours/contact
/// files. Blank values, absolute paths and `..` segments are refused, so a
/// build only ever reads from inside the site it was pointed at.
///
/// ```text
/// validate_path("src/data/hours.json", "data.hours")  → Ok
/// validate_path("/srv/menu", "content.menu")           → Err(must be relative)
/// validate_path("../shared", "content.dir")            → Err(leaves the site root)
/// ```
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!("'{}' is blank", field_name)));
    }

    let path = Path::new(path_str);
    if path.has_root() || path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "'{}' = '{}' must be relative to the site root",
            field_name, path_str
        )));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(Error::ConfigParse(format!(
            "'{}' = '{}' leaves the site root via '..'",
            field_name, path_str
        )));
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_valid_relative() {
        assert!(validate_path("src/content", "content.dir").is_ok());
        assert!(validate_path("menu", "content.menu").is_ok());
        assert!(validate_path("src/data/hours.json", "data.hours").is_ok());
    }

    #[test]
    fn test_validate_path_rejects_absolute_unix() {
        let result = validate_path("/etc/passwd", "data.hours");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must be relative to the site root")
        );
    }

    #[test]
    fn test_validate_path_rejects_parent_dir() {
        let result = validate_path("../content", "content.dir");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("leaves the site root")
        );

        assert!(validate_path("src/../../secret.json", "data.contact").is_err());
    }

    #[test]
    fn test_validate_path_rejects_empty() {
        let result = validate_path("", "content.dir");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("is blank"));

        assert!(validate_path("   ", "content.dir").is_err());
    }

    #[test]
    fn test_parse_minimal_config_applies_defaults() {
        let config = parse_site_toml_str(
            r#"
[site]
name = "La Cocina"
        "#,
        )
        .unwrap();

        assert_eq!(config.name, "La Cocina");
        assert_eq!(config.url, None);
        assert_eq!(config.content, ContentConfig::default());
        assert_eq!(config.content.menu_dir(), PathBuf::from("src/content/menu"));
        assert_eq!(
            config.content.specials_dir(),
            PathBuf::from("src/content/specials")
        );
        assert_eq!(config.data, DataConfig::default());
        assert_eq!(config.theme.sans[0], "Inter");
        assert_eq!(config.theme.serif[0], "Playfair Display");
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_site_toml_str(
            r#"
[site]
name = "La Cocina"
url = "https://lacocina.example.com"
output = "static"

[content]
dir = "content"
menu = "platillos"
specials = "promociones"
extensions = [".MD", "markdown"]

[data]
hours = "data/horario.json"
contact = "data/contacto.json"

[theme]
sans = ["Lato", "sans-serif"]
        "#,
        )
        .unwrap();

        assert_eq!(config.url.as_deref(), Some("https://lacocina.example.com"));
        assert_eq!(config.content.menu_dir(), PathBuf::from("content/platillos"));
        assert_eq!(config.content.extensions, vec!["md", "markdown"]);
        assert!(config.content.accepts_extension("MD"));
        assert!(!config.content.accepts_extension("mdx"));
        assert_eq!(config.data.hours, PathBuf::from("data/horario.json"));
        assert_eq!(config.theme.sans, vec!["Lato", "sans-serif"]);
        assert_eq!(config.theme.serif, ThemeConfig::default().serif);
    }

    #[test]
    fn test_parse_config_rejects_server_output() {
        let result = parse_site_toml_str(
            r#"
[site]
name = "La Cocina"
output = "server"
        "#,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("site.output"));
    }

    #[test]
    fn test_parse_config_rejects_path_traversal() {
        let result = parse_site_toml_str(
            r#"
[site]
name = "La Cocina"

[data]
contact = "../../etc/passwd"
        "#,
        );
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("leaves the site root"));
        assert!(msg.contains("data.contact"));
    }

    #[test]
    fn test_parse_site_toml_missing_file_is_io_error() {
        let result = parse_site_toml("does/not/exist/site.toml");
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(result.unwrap_err().to_string().starts_with("IO error"));
    }

    #[test]
    fn test_parse_config_rejects_empty_extensions() {
        let result = parse_site_toml_str(
            r#"
[site]
name = "La Cocina"

[content]
extensions = []
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_config_requires_site_name() {
        assert!(parse_site_toml_str("[content]\ndir = \"content\"\n").is_err());
        assert!(parse_site_toml_str("[site]\nname = \"  \"\n").is_err());
    }
}
