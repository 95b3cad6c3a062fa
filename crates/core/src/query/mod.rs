// Statement construction for partial updates

pub mod columns;
pub mod patch;

pub use patch::{build_patch_statement, GeneratedStatement, PatchBuilder, PatchError};
