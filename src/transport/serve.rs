//! JSON-lines server over stdin/stdout.
//!
//! The session lives on a dedicated worker thread (cairo surfaces are not
//! `Send`). The async loop reads requests, hands them to the worker one at a
//! time and writes each reply as a single line.

use std::thread;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::config::Config;
use crate::tracking::{self, HandTracker};
use crate::transport::protocol::{self, Request, Response};
use crate::transport::worker::FrameWorker;

type Job = (Request, oneshot::Sender<Response>);

/// Handle to the thread that owns the session.
pub struct WorkerHandle {
    request_tx: mpsc::Sender<Job>,
    thread: thread::JoinHandle<()>,
}

impl WorkerHandle {
    /// Starts the worker thread. The session is built on that thread.
    pub fn spawn(config: Config, tracker: Box<dyn HandTracker>) -> Result<Self> {
        let (request_tx, mut request_rx) = mpsc::channel::<Job>(1);

        let thread = thread::Builder::new()
            .name("luxdraw-session".to_string())
            .spawn(move || {
                let mut worker = FrameWorker::from_config(&config, tracker);
                while let Some((request, reply)) = request_rx.blocking_recv() {
                    log::debug!("Processing request: {:?}", request_kind(&request));
                    let response = worker.handle(request);
                    if reply.send(response).is_err() {
                        log::debug!("Requester went away before the reply was ready");
                    }
                }
                log::debug!("Session worker exiting");
            })
            .context("Failed to spawn session worker thread")?;

        Ok(Self { request_tx, thread })
    }

    /// Sends one request to the worker and waits for its reply.
    pub async fn request(&self, request: Request) -> Response {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.request_tx.send((request, reply_tx)).await.is_err() {
            return Response::error("Session worker is not running");
        }
        reply_rx
            .await
            .unwrap_or_else(|_| Response::error("Session worker dropped the request"))
    }

    /// Stops accepting requests and waits for the worker to finish.
    pub fn shutdown(self) {
        let Self { request_tx, thread } = self;
        drop(request_tx);
        if thread.join().is_err() {
            log::error!("Session worker panicked");
        }
    }
}

fn request_kind(request: &Request) -> &'static str {
    match request {
        Request::Frame { .. } => "frame",
        Request::Clear => "clear",
        Request::Ping => "ping",
    }
}

/// Serves requests from stdin until EOF or Ctrl+C.
pub async fn run(config: Config) -> Result<()> {
    let tracker = tracking::from_config(&config.tracker).context("Failed to start hand tracker")?;
    let worker = WorkerHandle::spawn(config, tracker)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    log::info!("Serving JSON-lines requests on stdin");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read request")?,
            _ = &mut shutdown => {
                log::info!("Interrupted, shutting down");
                break;
            }
        };

        let Some(line) = line else {
            log::info!("Input closed, shutting down");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match protocol::parse_request(&line) {
            Ok(request) => worker.request(request).await,
            Err(err) => {
                log::warn!("Malformed request: {}", err);
                Response::error(format!("Invalid request: {}", err))
            }
        };

        let mut encoded = serde_json::to_string(&response).context("Failed to encode response")?;
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }

    tokio::task::spawn_blocking(move || worker.shutdown())
        .await
        .context("Session worker shutdown task failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::NoTracker;
    use crate::transport::protocol::READY_MESSAGE;

    #[tokio::test]
    async fn worker_handle_round_trips_requests() {
        let worker = WorkerHandle::spawn(Config::default(), Box::new(NoTracker)).unwrap();
        assert_eq!(worker.request(Request::Ping).await, Response::message(READY_MESSAGE));

        let response = worker
            .request(Request::Frame {
                image: "garbage".to_string(),
                landmarks: None,
            })
            .await;
        assert!(matches!(response, Response::Error { .. }));

        tokio::task::spawn_blocking(move || worker.shutdown())
            .await
            .unwrap();
    }
}
