//! Annotation discovery.
//!
//! Finds `/* @mcp ... */` blocks in source files and turns each block's YAML
//! payload into a [`RawToolDeclaration`].

mod declaration;
mod extract;
mod scanner;

pub use declaration::RawToolDeclaration;
pub use extract::{extract_blocks, normalize_block};
pub use scanner::{
    parse_block, parse_file_contents, scan_directory, source_files, ScanError, EXCLUDED_DIRS,
    SOURCE_EXTENSIONS,
};
