//! Playdeck - reactive browsing and playback core for a streaming music
//! client.
//!
//! The crate keeps a filtered collection view, a play queue and a swipeable
//! cover carousel consistent with each other and with an external playback
//! engine. Everything runs on one logical timeline owned by
//! [`session::Session`].

pub mod assets;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pagination;
pub mod player;
pub mod session;
pub mod sync;
#[cfg(test)]
pub mod test_utils;
pub mod view;
