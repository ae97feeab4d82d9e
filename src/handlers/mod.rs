// src/handlers/mod.rs

pub mod auth;
pub mod community;
pub mod interaction;
pub mod profile;
pub mod search;
