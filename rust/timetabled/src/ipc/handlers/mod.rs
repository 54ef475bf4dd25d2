pub mod classes;
pub mod core;
pub mod dialog;
pub mod grid;
pub mod sidebar;
pub mod subjects;
pub mod teachers;
