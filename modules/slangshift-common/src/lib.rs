pub mod config;
pub mod keywords;
pub mod text;
pub mod types;

pub use config::Config;
pub use keywords::KeywordDef;
pub use types::*;
