//! Worker pool that generates chunk batches and merges them into the world.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded};
use lattice_coords::ChunkPosition;
use lattice_world::{ChunkDataError, DataOutcome, World};

use crate::terrain::TerrainGenerator;

/// Result of merging one chunk.
#[derive(Debug)]
pub struct IngestReport {
    pub chunk: ChunkPosition,
    pub outcome: Result<DataOutcome, ChunkDataError>,
    /// Generation plus merge time in microseconds.
    pub elapsed_us: u64,
}

pub struct IngestPool {
    task_sender: Option<Sender<ChunkPosition>>,
    result_receiver: Receiver<IngestReport>,
    in_flight: Arc<AtomicU64>,
    workers: Vec<JoinHandle<()>>,
}

impl IngestPool {
    /// Spawns `thread_count` workers sharing a queue of `capacity` chunks.
    pub fn new(
        world: Arc<World>,
        generator: Arc<TerrainGenerator>,
        thread_count: usize,
        capacity: usize,
    ) -> io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<ChunkPosition>(capacity);
        let (result_sender, result_receiver) = bounded::<IngestReport>(capacity);
        let in_flight = Arc::new(AtomicU64::new(0));

        let mut workers = Vec::with_capacity(thread_count);
        for index in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let world = Arc::clone(&world);
            let generator = Arc::clone(&generator);

            let handle = std::thread::Builder::new()
                .name(format!("ingest-{index}"))
                .spawn(move || {
                    while let Ok(chunk) = receiver.recv() {
                        let start = Instant::now();
                        let outcome = world.set_data(chunk, generator.generate(chunk), true);
                        let elapsed_us = start.elapsed().as_micros() as u64;
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                        if sender
                            .send(IngestReport {
                                chunk,
                                outcome,
                                elapsed_us,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                })?;
            workers.push(handle);
        }

        Ok(Self {
            task_sender: Some(task_sender),
            result_receiver,
            in_flight,
            workers,
        })
    }

    /// Queues a chunk. Returns it back if the queue is full or closed.
    pub fn submit(&self, chunk: ChunkPosition) -> Result<(), ChunkPosition> {
        let Some(sender) = &self.task_sender else {
            return Err(chunk);
        };
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        sender.try_send(chunk).map_err(|e| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            e.into_inner()
        })
    }

    /// Blocks until the next chunk is merged. `None` once every worker is gone.
    pub fn recv(&self) -> Option<IngestReport> {
        self.result_receiver.recv().ok()
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Closes the queue and waits for the workers to drain it.
    pub fn shutdown(mut self) {
        self.task_sender = None;
        // Unblock workers waiting to hand in a report.
        let results = self.result_receiver.clone();
        let drain = std::thread::spawn(move || while results.recv().is_ok() {});
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("ingest worker panicked");
            }
        }
        let _ = drain.join();
    }
}
