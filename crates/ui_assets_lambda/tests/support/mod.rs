#![allow(dead_code)]

pub mod callback;
pub mod store;
