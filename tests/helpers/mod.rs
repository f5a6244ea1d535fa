#![allow(dead_code)]

mod writer;

pub use self::writer::Writer;
