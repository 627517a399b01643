pub mod loader;
pub mod selector;
pub mod session;
pub mod sink;
