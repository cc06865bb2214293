pub mod api;
pub mod args;
pub mod model;
pub mod utils;
