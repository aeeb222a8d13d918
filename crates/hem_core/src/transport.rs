//! Fixed-capacity record queue between the transport and the engine.
//!
//! The receive side owns a handful of record slots. When the engine falls
//! behind and every slot is occupied, the newest record is discarded and
//! counted; records already queued are never overwritten.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::warn;

use crate::decoder::EventRecord;

/// Receive buffers available to the transport.
pub const RX_BUFFER_COUNT: usize = 5;

/// Transport side of the queue.
pub struct RecordSender {
    producer: HeapProd<EventRecord>,
    dropped: u64,
}

/// Engine side of the queue.
pub struct RecordReceiver {
    consumer: HeapCons<EventRecord>,
}

/// Create a queue holding at most `capacity` records (at least one).
pub fn record_queue(capacity: usize) -> (RecordSender, RecordReceiver) {
    let ring = HeapRb::<EventRecord>::new(capacity.max(1));
    let (producer, consumer) = ring.split();
    (RecordSender { producer, dropped: 0 }, RecordReceiver { consumer })
}

impl RecordSender {
    /// Queue a record. Returns false when the queue was full and the record
    /// was dropped.
    pub fn send(&mut self, record: EventRecord) -> bool {
        match self.producer.try_push(record) {
            Ok(()) => true,
            Err(_) => {
                self.dropped += 1;
                warn!(dropped = self.dropped, "record queue full, dropping newest record");
                false
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn vacant_len(&self) -> usize {
        self.producer.vacant_len()
    }
}

impl RecordReceiver {
    pub fn recv(&mut self) -> Option<EventRecord> {
        self.consumer.try_pop()
    }

    pub fn len(&self) -> usize {
        self.consumer.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Pop everything currently queued, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = EventRecord> + '_ {
        std::iter::from_fn(move || self.consumer.try_pop())
    }
}
