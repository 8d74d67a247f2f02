// src/clients/mod.rs

pub mod auth;
pub mod cashflow;
pub mod market;
pub mod warehouse;
