pub mod client;
pub mod requests;

pub use client::YouTubeDataClient;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
