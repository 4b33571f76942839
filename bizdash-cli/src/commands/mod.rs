pub mod check;
pub mod config;
pub mod import;
pub mod template;
