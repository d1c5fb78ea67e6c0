// Discord adapters for the automod core: slash commands, the message event
// glue, and the live enforcement port.

pub mod commands;
pub mod enforcement;
pub mod message_handler;
