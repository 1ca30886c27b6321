//! Content schema validation for the restaurant site.
//!
//! Raw records (front-matter of collection files, the hours and contact
//! JSON files) go in; typed records from `menu-kit-core` or a
//! [`ValidationError`] listing every failed field come out.

pub mod collection;
pub mod error;
pub mod schema;
pub mod validate;

pub use collection::{FileError, FileErrorReason, SiteContent, ValidationReport, load_site};
pub use error::{ValidationError, Violation, ViolationKind};
pub use schema::{Schema, SchemaKind};
pub use validate::{
    Record, validate, validate_contact, validate_hours, validate_menu_item, validate_raw,
    validate_special,
};
