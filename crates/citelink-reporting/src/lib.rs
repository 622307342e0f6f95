//! CSV rendering for the two conversion output tables.

mod export;

pub use export::{
    render_references_csv, render_sections_csv, write_references_csv, write_sections_csv,
};
