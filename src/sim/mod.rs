pub mod catalog;
pub mod event;
pub mod history;
pub mod schedule;
pub mod session;
