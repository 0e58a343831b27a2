// src/core/handler/mod.rs

//! Routes parsed commands into the execution layer.

mod command_router;

pub use command_router::Router;
