use std::sync::Arc;

use tokio::select;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::handlers::events::{Command, FetchOutcome, FetchRequest};
use crate::handlers::handler::UpdateHandler;
use crate::handlers::location_store::LocationSource;

/// Drives one map session: applies client updates, runs fetches in the
/// background and forwards outbound frames to the socket.
///
/// Render frames are held until the client reports its map as ready; only
/// the latest one is kept. Fetch results are applied only if no newer
/// fetch was issued in the meantime.
pub struct EventActor {
    inbound: mpsc::Receiver<String>,
    outbound: mpsc::Sender<String>,
    handler: Box<dyn UpdateHandler<String> + Send + Sync>,
    source: Arc<dyn LocationSource>,
    fetch_tx: mpsc::Sender<(u64, FetchOutcome)>,
    fetch_rx: mpsc::Receiver<(u64, FetchOutcome)>,
    latest_fetch: u64,
    map_ready: bool,
    pending_render: Option<serde_json::Value>,
}

impl EventActor {
    pub fn new(
        inbound: mpsc::Receiver<String>,
        outbound: mpsc::Sender<String>,
        handler: Box<dyn UpdateHandler<String> + Send + Sync>,
        source: Arc<dyn LocationSource>,
    ) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::channel(8);
        Self {
            inbound,
            outbound,
            handler,
            source,
            fetch_tx,
            fetch_rx,
            latest_fetch: 0,
            map_ready: false,
            pending_render: None,
        }
    }

    pub async fn run_actor(mut self) {
        let commands = self.handler.opened().await;
        if !self.execute(commands).await {
            return;
        }

        enum Message {
            Client(String),
            Fetched(u64, FetchOutcome),
        }
        loop {
            let message = select! {
                message = self.inbound.recv() => message.map(Message::Client),
                Some((seq, outcome)) = self.fetch_rx.recv() => Some(Message::Fetched(seq, outcome)),
            };

            let commands = match message {
                Some(Message::Client(text)) => self.handler.inbound_update(text).await,
                Some(Message::Fetched(seq, outcome)) => {
                    if seq != self.latest_fetch {
                        debug!("Discarding stale fetch {} (latest is {})", seq, self.latest_fetch);
                        continue;
                    }
                    self.handler.fetched(outcome).await
                }
                None => {
                    info!("{} session closed", self.handler.view_name());
                    return;
                }
            };

            if !self.execute(commands).await {
                return;
            }
        }
    }

    /// Returns false once the client side has gone away.
    async fn execute(&mut self, commands: Vec<Command>) -> bool {
        for command in commands {
            let sent = match command {
                Command::Notify(msg) | Command::Error(msg) => self.send(msg).await,
                Command::Render(msg) if self.map_ready => self.send(msg).await,
                Command::Render(msg) => {
                    self.pending_render = Some(msg);
                    true
                }
                Command::MapReady => {
                    self.map_ready = true;
                    match self.pending_render.take() {
                        Some(msg) => self.send(msg).await,
                        None => true,
                    }
                }
                Command::Fetch(request) => {
                    self.spawn_fetch(request);
                    true
                }
                Command::CancelFetch => {
                    self.latest_fetch += 1;
                    true
                }
            };
            if !sent {
                return false;
            }
        }
        true
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        self.latest_fetch += 1;
        let seq = self.latest_fetch;
        let source = self.source.clone();
        let results = self.fetch_tx.clone();
        debug!("Fetch {} started: {:?}", seq, request);

        tokio::spawn(async move {
            let outcome = match request {
                FetchRequest::EmployeeHistory { employee, date } => FetchOutcome::EmployeeHistory {
                    date,
                    result: source.employee_history(&employee, date).await,
                },
                FetchRequest::EmployeeTrail { employee, date } => {
                    let result = source.employee_trail(&employee, date).await;
                    FetchOutcome::EmployeeTrail { employee, date, result }
                }
            };
            results.send((seq, outcome)).await.ok();
        });
    }

    async fn send(&self, msg: serde_json::Value) -> bool {
        let frame = serde_json::json!({
            "view": self.handler.view_name(),
            "update": msg,
        });
        self.outbound.send(frame.to_string()).await.is_ok()
    }
}
