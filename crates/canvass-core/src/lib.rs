//! Canvass Core — domain models, error types and repository traits
//! shared by the access decision engine and its storage backends.

pub mod error;
pub mod models;
pub mod repository;
