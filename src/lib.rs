//! Find a postal address, attach a person to it and keep the result in a
//! persisted address book.

pub mod address;
pub mod book;
pub mod candidates;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod fields;
pub mod geocode;
pub mod record;
pub mod storage;
pub mod utils;
pub mod workflow;
