// src/models/mod.rs

pub mod attempt;
pub mod exam;
pub mod question;
pub mod subject;
