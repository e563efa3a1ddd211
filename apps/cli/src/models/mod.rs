pub mod args;
pub mod version;
