// src/core/mod.rs

pub mod dom;
pub mod html;
pub mod parse;
pub mod sanitize;
