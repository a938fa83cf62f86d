#![allow(dead_code)]

pub mod epub_fixture;
pub mod socket_guard;
