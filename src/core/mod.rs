pub mod error;
pub mod output;
pub mod store;
pub mod time;
pub mod types;
