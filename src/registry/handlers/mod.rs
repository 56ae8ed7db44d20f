//! Dispatch targets of the `define_commands!` table, one module per category.

pub mod query;
pub mod text;
pub mod tone;
pub mod typing;
pub mod window;
