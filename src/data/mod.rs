//! Database models and domain logic.

pub mod chats;
pub mod comments;
pub mod faculty;
pub mod names;
pub mod rankings;
pub mod ratings;
pub mod recommend;
pub mod scholar_sync;
pub mod sessions;
pub mod stats;
pub mod users;
