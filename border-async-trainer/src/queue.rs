//! Bounded multi-producer single-consumer queue between actors and the learner.
use crate::QueueItem;
use crossbeam_channel::{bounded, Receiver, Sender};
use thiserror::Error;

/// Constructor of the queue carrying [`QueueItem`]s from actors to the learner.
///
/// The queue holds at most `capacity` items. [`QueueSender::push`] blocks while the queue is
/// full, which bounds the staleness of transitions relative to the parameters the learner
/// is updating. Items pushed by one sender are popped in the order they were pushed, items of
/// different senders are interleaved arbitrarily.
///
/// When the [`QueueReceiver`] is dropped, every pending and future push fails immediately.
/// When every [`QueueSender`] is dropped, [`QueueReceiver::pop`] fails once the queue is empty.
pub struct TransitionQueue;

impl TransitionQueue {
    /// Creates a queue with the given capacity.
    ///
    /// A capacity of zero makes every push wait for a matching pop.
    #[allow(clippy::new_ret_no_self)]
    pub fn bounded<O>(capacity: usize) -> (QueueSender<O>, QueueReceiver<O>) {
        let (s, r) = bounded(capacity);
        (QueueSender { sender: s }, QueueReceiver { receiver: r })
    }
}

/// The other side of the queue has been dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("The transition queue is disconnected")]
pub struct Disconnected;

/// Sending side of the [`TransitionQueue`], owned by an actor.
pub struct QueueSender<O> {
    sender: Sender<QueueItem<O>>,
}

impl<O> Clone for QueueSender<O> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<O> QueueSender<O> {
    /// Pushes an item, blocking while the queue is full.
    pub fn push(&self, item: QueueItem<O>) -> Result<(), Disconnected> {
        self.sender.send(item).map_err(|_| Disconnected)
    }
}

/// Receiving side of the [`TransitionQueue`], owned by the learner.
pub struct QueueReceiver<O> {
    receiver: Receiver<QueueItem<O>>,
}

impl<O> QueueReceiver<O> {
    /// Pops an item, blocking while the queue is empty.
    pub fn pop(&self) -> Result<QueueItem<O>, Disconnected> {
        self.receiver.recv().map_err(|_| Disconnected)
    }

    /// Returns the number of items in the queue.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    #[test]
    fn test_backpressure() {
        let capacity = 3;
        let (s, r) = TransitionQueue::bounded::<()>(capacity);

        for i in 0..capacity {
            s.push(QueueItem::End(i)).unwrap();
        }
        assert_eq!(r.len(), capacity);

        let pushed = Arc::new(AtomicBool::new(false));
        let handle = {
            let s = s.clone();
            let pushed = pushed.clone();
            thread::spawn(move || {
                s.push(QueueItem::End(capacity)).unwrap();
                pushed.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(200));
        assert!(!pushed.load(Ordering::SeqCst));
        assert_eq!(r.len(), capacity);

        assert!(matches!(r.pop(), Ok(QueueItem::End(0))));
        handle.join().unwrap();
        assert!(pushed.load(Ordering::SeqCst));
        assert_eq!(r.len(), capacity);
    }

    #[test]
    fn test_fifo_per_sender() {
        let (s, r) = TransitionQueue::bounded::<()>(1);
        let handle = thread::spawn(move || {
            for i in 0..10 {
                s.push(QueueItem::End(i)).unwrap();
            }
        });
        for i in 0..10 {
            assert!(matches!(r.pop(), Ok(QueueItem::End(j)) if j == i));
        }
        handle.join().unwrap();

        // The sender has been dropped
        assert_eq!(r.pop().unwrap_err(), Disconnected);
    }

    #[test]
    fn test_drop_receiver_releases_blocked_sender() {
        let (s, r) = TransitionQueue::bounded::<()>(1);
        s.push(QueueItem::TotalReward(0.0)).unwrap();
        let handle = thread::spawn(move || s.push(QueueItem::TotalReward(1.0)));

        thread::sleep(Duration::from_millis(100));
        drop(r);
        assert_eq!(handle.join().unwrap(), Err(Disconnected));
    }
}
