// src/repositories/postgres/mod.rs

pub mod tracked_channel;
pub mod subscription;
pub mod live_event;
pub mod notification;
pub mod quota_usage;
pub mod dead_letter;
