//! HTTP API handlers

pub mod artists;
pub mod health;
pub mod members;
pub mod params;
pub mod stream;
pub mod tags;
pub mod tracklists;
pub mod tracks;

pub use health::health_routes;
