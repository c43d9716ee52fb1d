pub mod analyzers;
pub mod config;
pub mod date;
pub mod error;
pub mod event_year;
pub mod output;
pub mod parser;
pub mod series;
pub mod value;
pub mod window;
