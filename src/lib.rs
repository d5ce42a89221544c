pub mod api;
pub mod app;
pub mod config;
pub mod details;
pub mod error;
pub mod insight;
pub mod models;
pub mod render;
pub mod search;
pub mod tmdb;
