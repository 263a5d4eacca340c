pub mod coverflow;
pub mod headless;
pub mod scene;
