// src/services/mod.rs

pub mod assembler;
pub mod catalog;
pub mod import;
pub mod scorer;
