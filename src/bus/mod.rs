//! Event bus carrying changed notes from the synchronizer to consumers.
//!
//! The channel holds a single note. A publisher waits while the slot is
//! occupied, so an absent or slow consumer stalls the current sync cycle
//! instead of letting changed notes pile up in memory.

use crate::models::Note;
use tokio::sync::mpsc;

/// Number of changed notes that may be in flight.
pub const BUS_CAPACITY: usize = 1;

/// Create a connected writer/reader pair.
pub fn channel() -> (BusWriter, BusReader) {
    let (tx, rx) = mpsc::channel(BUS_CAPACITY);
    (BusWriter { tx }, BusReader { rx })
}

/// Publishing half, owned by the synchronizer. Dropping it closes the bus.
#[derive(Debug)]
pub struct BusWriter {
    tx: mpsc::Sender<Note>,
}

impl BusWriter {
    /// Publish a changed note, waiting for room.
    ///
    /// Returns false when the reader has gone away; the note is dropped.
    pub async fn publish(&self, note: Note) -> bool {
        self.tx.send(note).await.is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consuming half.
#[derive(Debug)]
pub struct BusReader {
    rx: mpsc::Receiver<Note>,
}

impl BusReader {
    /// Next changed note, or `None` once the writer is gone and the bus is drained.
    pub async fn read(&mut self) -> Option<Note> {
        self.rx.recv().await
    }
}
