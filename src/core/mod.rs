//! Shared math and timing helpers without domain meaning.

pub mod phase;
pub mod timebase;
pub mod util;
