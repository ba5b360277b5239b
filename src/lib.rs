//! Library crate for live-quiz-back, exposing modules for the server binary
//! and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod scoring;
pub mod services;
pub mod state;
