pub mod add;
pub mod availability;
pub mod costs;
pub mod downtime;
pub mod due;
pub mod equipment;
pub mod evidence;
pub mod export;
pub mod history;
pub mod init;
pub mod order;
pub mod orders;
pub mod receipt;
pub mod record;
pub mod schedule;
pub mod score;
pub mod transition;

mod common;
