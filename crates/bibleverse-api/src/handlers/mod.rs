//! API Handlers

pub mod health;
pub mod situations;
pub mod verse;
