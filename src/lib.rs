// Library for tests to access modules

pub mod assembler;
pub mod bus;
pub mod classifier;
pub mod config;
pub mod consumers;
pub mod discovery;
pub mod driver;
pub mod models;
pub mod retry;
pub mod sources;
