pub mod scaffold;
pub mod version;
