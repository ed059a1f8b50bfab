//! Runtime actor that owns the session.
//!
//! Commands, load completions and the three simulation tickers are arms of
//! one `select!` loop, so nothing ever touches the session concurrently.

use crate::ipc::commands::{handle_message, Handled};
use crate::ipc::{parse_message, IpcMessage, IpcResponse};
use std::path::PathBuf;
use tidewave_core::PersistentStore;
use tidewave_shell::{BrowserSession, PendingLoad};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Capacity of the inbound command queue
const COMMAND_QUEUE: usize = 64;

pub struct Host<S: PersistentStore> {
    session: BrowserSession<S>,
    export_dir: PathBuf,
    pending_load: Option<JoinHandle<()>>,
    loads_tx: mpsc::UnboundedSender<u64>,
}

impl<S: PersistentStore> Host<S> {
    pub fn new(
        session: BrowserSession<S>,
        export_dir: PathBuf,
    ) -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();
        let host = Self {
            session,
            export_dir,
            pending_load: None,
            loads_tx,
        };
        (host, loads_rx)
    }

    /// Drive the session until the command channel closes or `quit` arrives.
    /// Returns the session so callers can inspect the final state.
    pub async fn run<W>(
        mut self,
        mut loads_rx: mpsc::UnboundedReceiver<u64>,
        mut commands: mpsc::Receiver<String>,
        mut out: W,
    ) -> anyhow::Result<BrowserSession<S>>
    where
        W: AsyncWrite + Unpin,
    {
        let config = self.session.config().clone();
        let mut downloads = time::interval(config.download_tick());
        let mut adblock = time::interval(config.adblock_tick());
        let mut network = time::interval(config.network_tick());
        for ticker in [&mut downloads, &mut adblock, &mut network] {
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        info!("Host ready");

        loop {
            tokio::select! {
                line = commands.recv() => {
                    let Some(line) = line else {
                        debug!("Command channel closed");
                        break;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let (response, quit) = match parse_message(line) {
                        Ok(message) => {
                            let quit = message == IpcMessage::Quit;
                            (self.dispatch(message), quit)
                        }
                        Err(e) => {
                            warn!("{}", e);
                            (IpcResponse::error(e), false)
                        }
                    };

                    out.write_all(response.to_line().as_bytes()).await?;
                    out.write_all(b"\n").await?;
                    out.flush().await?;

                    if quit {
                        info!("Quit requested");
                        break;
                    }
                }
                Some(generation) = loads_rx.recv() => {
                    self.session.finish_load(generation);
                }
                _ = downloads.tick() => {
                    self.session.tick_downloads();
                }
                _ = adblock.tick() => {
                    self.session.tick_adblock();
                }
                _ = network.tick() => {
                    self.session.tick_network();
                }
            }
        }

        if let Some(handle) = self.pending_load.take() {
            handle.abort();
        }
        Ok(self.session)
    }

    fn dispatch(&mut self, message: IpcMessage) -> IpcResponse {
        let Handled { response, pending } =
            handle_message(&mut self.session, &self.export_dir, message);

        match pending {
            Some(load) => self.schedule_load(load),
            None if !self.session.is_loading() => self.cancel_load(),
            None => {}
        }
        response
    }

    /// Start the latency timer for `load`, replacing any earlier one
    fn schedule_load(&mut self, load: PendingLoad) {
        self.cancel_load();

        let tx = self.loads_tx.clone();
        debug!(generation = load.generation, latency = ?load.latency, "Scheduling load completion");
        self.pending_load = Some(tokio::spawn(async move {
            time::sleep(load.latency).await;
            // The receiver only goes away when the host is shutting down.
            let _ = tx.send(load.generation);
        }));
    }

    fn cancel_load(&mut self) {
        if let Some(handle) = self.pending_load.take() {
            handle.abort();
        }
    }
}

/// Forward lines from `input` into a command channel until EOF
pub fn spawn_reader<R>(input: R) -> (mpsc::Receiver<String>, JoinHandle<()>)
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let handle = tokio::spawn(async move {
        let mut lines = input.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    break;
                }
            }
        }
    });
    (rx, handle)
}
