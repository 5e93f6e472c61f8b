// src/lib.rs

pub mod db;
pub mod repositories;
pub mod cache;
pub mod http;
pub mod platforms;
pub mod websub;
pub mod services;
pub mod eventbus;
pub mod tasks;
pub mod utils;
pub mod config;
pub mod test_utils;

pub use db::Database;
pub use ytlive_common::error::Error;
pub use http::{DefaultHttpClient, HttpClient, HttpResponse};
