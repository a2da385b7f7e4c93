// src/utils/mod.rs

pub mod flash;
pub mod hash;
pub mod jwt;
pub mod markdown;
pub mod redirect;
pub mod validation;
