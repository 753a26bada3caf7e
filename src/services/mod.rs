pub mod http;
pub mod loader;
