#[blocks_derive::blocks_error]
pub enum DemoError {
    Io { source: std::io::Error, context: String },
}

fn main() {}
