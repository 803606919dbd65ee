//! Export worker: answers export jobs pushed over a [`SocketClient`].
//!
//! A job (message type [`EXPORT_JOB`]) carries binary material results. The
//! worker builds them into a fresh [`PaletteSchematic`] and responds with its
//! wire form. A job that fails is logged and answered with an empty payload.

use super::client::{Handlers, MessageHandler, SocketClient};
use crate::error::Result;
use crate::export::encode_palette;
use crate::exporter::{build_results, decode_results, ExportContext, ExportRng};
use crate::schematic::{PaletteSchematic, Schematic};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::ToSocketAddrs;

pub const EXPORT_JOB: u8 = 1;

/// Identity sent in the handshake unless configured otherwise.
pub const DEFAULT_IDENTITY: u8 = 1;

#[derive(Debug, Clone)]
pub struct ExportWorker {
    ctx: ExportContext,
    seed: Option<u64>,
}

impl ExportWorker {
    pub fn new(ctx: ExportContext) -> Self {
        Self { ctx, seed: None }
    }

    /// Use the same seed for every job instead of a fresh one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Decode, build and encode one job.
    pub fn run_job(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let start = Instant::now();
        let results = decode_results(payload, 0)?;
        let decoded = start.elapsed();

        let mut rng = match self.seed {
            Some(seed) => ExportRng::new(seed),
            None => ExportRng::from_entropy(),
        };
        let mut schematic = PaletteSchematic::new();
        build_results(&results, &mut schematic, &self.ctx, &mut rng)?;
        let built = start.elapsed();

        let bytes = encode_palette(&schematic)?;
        log::debug!(
            "job of {} results: decoded in {:?}, built {} blocks in {:?}, encoded {} bytes in {:?}",
            results.len(),
            decoded,
            schematic.len(),
            built - decoded,
            bytes.len(),
            start.elapsed() - built
        );
        Ok(bytes)
    }

    pub fn handlers(self) -> Handlers {
        let mut handlers = Handlers::new();
        handlers.insert(
            EXPORT_JOB,
            Arc::new(JobHandler {
                worker: Arc::new(self),
            }) as Arc<dyn MessageHandler>,
        );
        handlers
    }

    /// Connect to a job server and start answering its jobs.
    pub async fn connect(self, addr: impl ToSocketAddrs, identity: u8) -> Result<SocketClient> {
        SocketClient::connect(addr, identity, self.handlers()).await
    }
}

struct JobHandler {
    worker: Arc<ExportWorker>,
}

impl MessageHandler for JobHandler {
    fn handle(&self, client: &SocketClient, sequence: i32, payload: Vec<u8>) {
        let worker = Arc::clone(&self.worker);
        let client = client.clone();
        tokio::task::spawn_blocking(move || {
            let response = worker.run_job(&payload).unwrap_or_else(|e| {
                log::error!("export job {} failed: {}", sequence, e);
                Vec::new()
            });
            if let Err(e) = client.respond(sequence, response) {
                log::warn!("could not answer export job {}: {}", sequence, e);
            }
        });
    }
}
