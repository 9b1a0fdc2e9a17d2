use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, OwnedSemaphorePermit};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::handlers::event_actor::EventActor;
use crate::handlers::handler::UpdateHandler;
use crate::handlers::location_store::LocationSource;

struct AutoCancelTask<T>(pub JoinHandle<T>);

impl<T> Drop for AutoCancelTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// One connected map client: the socket pump plus the session's event actor.
pub struct MapSessionHandler {
    actor: AutoCancelTask<()>,
    socket: WebsocketActor,
    _permit: OwnedSemaphorePermit,
}

impl MapSessionHandler {
    pub fn new(
        socket: WebSocket,
        handler: Box<dyn UpdateHandler<String> + Send + Sync>,
        source: Arc<dyn LocationSource>,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        let (inbound, inbound_recv) = mpsc::channel(8);
        let (outbound_send, outbound) = mpsc::channel(8);

        let operator = EventActor::new(inbound_recv, outbound_send, handler, source);

        Self {
            actor: AutoCancelTask(tokio::spawn(operator.run_actor())),
            socket: WebsocketActor::new(socket, inbound, outbound),
            _permit: permit,
        }
    }

    /// Runs until either the client disconnects or the session ends.
    pub async fn run(mut self) {
        tokio::select! {
            _ = &mut self.actor.0 => (),
            _ = self.socket.run_actor() => (),
        }
    }
}

struct WebsocketActor {
    send_task: AutoCancelTask<()>,
    recv_task: AutoCancelTask<()>,
}

impl WebsocketActor {
    pub fn new(socket: WebSocket, inbound: mpsc::Sender<String>, mut outbound: mpsc::Receiver<String>) -> Self {
        let (mut ws_sender, mut ws_receiver) = socket.split();

        let inbound_task = tokio::spawn(async move {
            while let Some(Ok(msg)) = ws_receiver.next().await {
                debug!("Received message from map client: {:?}", msg);
                match msg {
                    Message::Text(text) => {
                        if inbound.send(text).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        let outbound_task = tokio::spawn(async move {
            while let Some(msg) = outbound.recv().await {
                debug!("Sending message to map client: {:?}", msg);
                if ws_sender.send(Message::Text(msg)).await.is_err() {
                    return;
                }
            }
            ws_sender.send(Message::Close(None)).await.ok();
        });

        Self {
            send_task: AutoCancelTask(outbound_task),
            recv_task: AutoCancelTask(inbound_task),
        }
    }

    pub async fn run_actor(&mut self) {
        tokio::select! {
            _ = &mut self.send_task.0 => (),
            _ = &mut self.recv_task.0 => ()
        }
    }
}
