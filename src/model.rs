pub mod cursor;
pub mod preview;
