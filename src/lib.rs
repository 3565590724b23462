//! Translate short texts through DeepL and keep a browsable history of the results.

pub mod config;
pub mod db;
pub mod deepl;
pub mod error;
pub mod models;
pub mod retry;
pub mod seeding;
pub mod service;
pub mod store;
pub mod view_model;
pub mod web;
