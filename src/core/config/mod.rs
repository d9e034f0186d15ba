pub mod data;
pub mod io;
pub mod settings;

pub use data::Config;
pub use io::ConfigError;

#[cfg(test)]
mod tests;
