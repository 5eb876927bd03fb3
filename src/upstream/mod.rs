pub mod futures;
pub mod options;
