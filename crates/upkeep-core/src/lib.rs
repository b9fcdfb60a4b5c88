pub mod config;
pub mod cost;
pub mod downtime;
pub mod error;
pub mod evidence;
pub mod export;
pub mod history;
pub mod id;
pub mod lock;
pub mod schedule;
pub mod scoring;
pub mod storage;
pub mod types;
pub mod workorder;
