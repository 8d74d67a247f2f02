// src/lib.rs

pub mod config;
pub mod core;

pub mod clients;
pub mod controller;
pub mod engine;
pub mod gui;
pub mod metrics;
pub mod net;
pub mod panel;
pub mod recipes;
pub mod row;
pub mod state;
