#[blocks_derive::blocks_error]
pub enum DemoError {
    Io { source: std::io::Error },
}

fn main() {}
