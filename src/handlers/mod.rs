pub mod event_actor;
pub mod events;
pub mod handler;
pub mod location_logger;
pub mod location_store;
pub mod processor;
pub mod websocket_actor;
