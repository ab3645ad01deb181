//! HTTP handlers for the bedside voice API

pub mod commands;
pub mod health;
pub mod sessions;
pub mod transcribe;
