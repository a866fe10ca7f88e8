mod reader;

pub use reader::{read_epub, read_epub_from_reader};
