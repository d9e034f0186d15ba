pub mod logging;
pub mod syntax;
pub mod time;
pub mod url;
