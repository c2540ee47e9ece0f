#![allow(dead_code)]

pub mod bookmark;
pub mod profile;
pub mod resource;
