//! SQL analysis for the query bridge.
//!
//! - [`rewrite`] - row-limit rewriting and the metadata-command bypass
//! - [`validate`] - read-only (SELECT/DESCRIBE/SHOW) gating
//!
//! The remote engine is Trino, which sqlparser has no dedicated dialect
//! for, so parsing uses [`GenericDialect`].

pub mod rewrite;
pub mod validate;


use sqlparser::dialect::GenericDialect;

pub use rewrite::{
    bound_query, is_introspection_command, is_metadata_command, rewrite_with_limit,
};
pub use validate::{validate_select_only, ValidationError};

/// Dialect used for every parse in this module.
pub(crate) fn parser_dialect() -> GenericDialect {
    GenericDialect {}
}
