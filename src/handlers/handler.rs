use async_trait::async_trait;
use tracing::error;

use crate::handlers::events::{Command, FetchOutcome, TypedCommand};
use crate::handlers::processor::UpdateProcessor;
use crate::models::updates::MapView;

pub trait UpdateDeserializer<V: MapView> {
    fn deserialize_update(&self, message: &str) -> serde_json::Result<V::Inbound>;
}

pub trait UpdateSerializer<V: MapView> {
    fn serialize_update(&self, update: V::Outbound) -> serde_json::Result<serde_json::Value>;
    fn serialize_error(&self, error: String) -> serde_json::Value;
}

/// View-agnostic face of a map session, driven by the event actor.
#[async_trait]
pub trait UpdateHandler<M> {
    fn view_name(&self) -> &'static str;
    async fn opened(&mut self) -> Vec<Command>;
    async fn inbound_update(&mut self, message: M) -> Vec<Command>;
    async fn fetched(&mut self, outcome: FetchOutcome) -> Vec<Command>;
}

pub struct WebSocketUpdateHandler<V: MapView> {
    processor: V::Processor,
}

impl<V: MapView> WebSocketUpdateHandler<V> {
    pub fn new(processor: V::Processor) -> Self {
        Self { processor }
    }

    fn serialize_command(&self, command: TypedCommand<V>) -> Command {
        let serialized = |update: V::Outbound| {
            self.serialize_update(update).map_err(|e| {
                error!("Error serializing {} update: {}", V::view_name(), e);
                Command::Error(self.serialize_error(format!("Error serializing update: {}", e)))
            })
        };

        match command {
            TypedCommand::Notify(update) => serialized(update).map_or_else(|e| e, Command::Notify),
            TypedCommand::Render(update) => serialized(update).map_or_else(|e| e, Command::Render),
            TypedCommand::Fetch(request) => Command::Fetch(request),
            TypedCommand::CancelFetch => Command::CancelFetch,
            TypedCommand::MapReady => Command::MapReady,
        }
    }

    fn serialize_commands(&self, commands: Vec<TypedCommand<V>>) -> Vec<Command> {
        commands
            .into_iter()
            .map(|command| self.serialize_command(command))
            .collect()
    }
}

impl<V: MapView> UpdateDeserializer<V> for WebSocketUpdateHandler<V> {
    fn deserialize_update(&self, message: &str) -> serde_json::Result<V::Inbound> {
        serde_json::from_str(message)
    }
}

impl<V: MapView> UpdateSerializer<V> for WebSocketUpdateHandler<V> {
    fn serialize_update(&self, update: V::Outbound) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&update)
    }

    fn serialize_error(&self, error: String) -> serde_json::Value {
        serde_json::json!({ "Error": error })
    }
}

#[async_trait]
impl<V: MapView> UpdateHandler<String> for WebSocketUpdateHandler<V> {
    fn view_name(&self) -> &'static str {
        V::view_name()
    }

    async fn opened(&mut self) -> Vec<Command> {
        let commands = self.processor.process_open().await;
        self.serialize_commands(commands)
    }

    async fn inbound_update(&mut self, message: String) -> Vec<Command> {
        match self.deserialize_update(&message) {
            Ok(update) => {
                let commands = self.processor.process_update(update).await;
                self.serialize_commands(commands)
            }
            Err(e) => vec![Command::Error(self.serialize_error(format!("Error deserializing update: {}", e)))],
        }
    }

    async fn fetched(&mut self, outcome: FetchOutcome) -> Vec<Command> {
        let commands = self.processor.process_fetch(outcome).await;
        self.serialize_commands(commands)
    }
}
