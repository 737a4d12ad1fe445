//! Bounded, named, single-producer/single-consumer frame queue.
//!
//! `enqueue` never blocks: a full queue drops the incoming frame and logs a
//! warning. `dequeue` never blocks: an empty queue returns `None`. See
//! spec.md §4.1 / SPEC_FULL.md §4.1.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::frame::Frame;

/// A bounded FIFO of [`Frame`]s with tail-drop backpressure.
#[derive(Clone)]
pub struct PacketQueue {
    name: &'static str,
    inner: Arc<ArrayQueue<Frame>>,
}

/// Returned by [`PacketQueue::enqueue`] when the queue was full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dropped;

impl PacketQueue {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            inner: Arc::new(ArrayQueue::new(capacity)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Push a frame onto the queue. Drops (and logs) the frame on overflow
    /// rather than blocking the producer.
    pub fn enqueue(&self, frame: Frame) -> Result<(), Dropped> {
        match self.inner.push(frame) {
            Ok(()) => Ok(()),
            Err(_frame) => {
                tracing::warn!(queue = self.name, "queue is full, dropping latest packet");
                Err(Dropped)
            }
        }
    }

    /// Pop the oldest frame, or `None` if the queue is currently empty.
    pub fn dequeue(&self) -> Option<Frame> {
        self.inner.pop()
    }

    /// Hint only; a racing consumer may still observe `dequeue` return
    /// `None` right after this returns `false` (spec.md §4.1). Each queue in
    /// this system has exactly one consumer, so that race cannot occur in
    /// practice.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for PacketQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketQueue")
            .field("name", &self.name)
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_ordering_is_preserved() {
        let q = PacketQueue::new("test", 10);
        q.enqueue(Frame::from_static(b"a")).unwrap();
        q.enqueue(Frame::from_static(b"b")).unwrap();
        q.enqueue(Frame::from_static(b"c")).unwrap();

        assert_eq!(q.dequeue().unwrap(), Frame::from_static(b"a"));
        assert_eq!(q.dequeue().unwrap(), Frame::from_static(b"b"));
        assert_eq!(q.dequeue().unwrap(), Frame::from_static(b"c"));
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn full_queue_drops_newest_frame_without_changing_size() {
        let q = PacketQueue::new("test", 2);
        q.enqueue(Frame::from_static(b"f1")).unwrap();
        q.enqueue(Frame::from_static(b"f2")).unwrap();

        assert_eq!(q.enqueue(Frame::from_static(b"f3")), Err(Dropped));
        assert!(!q.is_empty());

        assert_eq!(q.dequeue().unwrap(), Frame::from_static(b"f1"));
        assert_eq!(q.dequeue().unwrap(), Frame::from_static(b"f2"));
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn empty_queue_dequeue_returns_none_immediately() {
        let q = PacketQueue::new("test", 4);
        assert!(q.is_empty());
        assert_eq!(q.dequeue(), None);
    }
}
