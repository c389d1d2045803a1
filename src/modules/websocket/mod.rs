/// Realtime gateway: per-room broadcast over websockets.
pub mod connection;
pub mod events;
pub mod gateway;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
