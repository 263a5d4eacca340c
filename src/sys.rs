pub mod geometry;
pub mod headless;
pub mod shell;
pub mod timer;
