//! Storage module - treasury mempool persistence

mod db;

pub use db::*;
