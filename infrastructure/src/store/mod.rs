//! Durable stores backing the application ports

mod json_file;

pub use json_file::JsonFileTemplateStore;
