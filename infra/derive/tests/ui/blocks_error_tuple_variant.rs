#[blocks_derive::blocks_error]
pub enum DemoError {
    Io(std::io::Error),
}

fn main() {}
