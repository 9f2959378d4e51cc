pub mod app;
pub mod common;
pub mod domain;
pub mod events;
pub mod io;
pub mod profile;
pub mod remote;
pub mod store;
pub mod wallet;
pub mod worker;
