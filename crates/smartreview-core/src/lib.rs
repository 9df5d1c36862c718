//! Core SmartReview client library (session, credentials, backend API).

pub mod api;
pub mod config;
pub mod credential;
pub mod guard;
pub mod notice;
pub mod redirect;
pub mod session;
