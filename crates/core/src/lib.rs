pub mod config;
pub mod error;
pub mod frontmatter;
pub mod types;

pub use config::parse_site_toml;
pub use error::{Error, Result};
pub use frontmatter::{RawRecord, parse_front_matter, parse_json_record};
pub use types::*;
