// File: src/platforms/mod.rs

pub mod youtube;

pub use ytlive_common::traits::api::VideoStatusApi;
