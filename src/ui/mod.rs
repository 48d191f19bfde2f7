//! Terminal presentation primitives: design tokens, icons and capability
//! detection shared by the console event sink and the report renderer.

pub mod primitives;
pub mod terminal;
pub mod theme;
