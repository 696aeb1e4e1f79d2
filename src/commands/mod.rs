//! Command handlers

pub mod publish;

pub use publish::handle_publish_command;
