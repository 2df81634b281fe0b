//! JSON-lines event reader on stdin.
//!
//! One event per line, parsed on a background thread and handed to the
//! control loop through a lock-free ring. Malformed lines are logged and
//! skipped.

use std::{
    io::BufRead,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use neurosonic::io::InboundEvent;
use rtrb::{Consumer, RingBuffer};
use tracing::{debug, info, warn};

pub struct Inbox {
    rx: Consumer<InboundEvent>,
    closed: Arc<AtomicBool>,
}

impl Inbox {
    /// Start reading stdin. The reader stops at end of input.
    pub fn spawn(capacity: usize) -> Self {
        let (mut tx, rx) = RingBuffer::<InboundEvent>::new(capacity);
        let closed = Arc::new(AtomicBool::new(false));

        thread::spawn({
            let closed = closed.clone();
            move || {
                let stdin = std::io::stdin();
                for (number, line) in stdin.lock().lines().enumerate() {
                    let line = match line {
                        Ok(line) => line,
                        Err(err) => {
                            warn!(%err, "stdin read failed");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    match InboundEvent::from_json(&line) {
                        Ok(event) => {
                            if tx.push(event).is_err() {
                                debug!(line = number + 1, "event queue full, event dropped");
                            }
                        }
                        Err(err) => warn!(line = number + 1, %err, "malformed event"),
                    }
                }

                info!("input closed");
                closed.store(true, Ordering::Release);
            }
        });

        Self { rx, closed }
    }

    pub fn pop(&mut self) -> Option<InboundEvent> {
        self.rx.pop().ok()
    }

    /// True once stdin has ended and every event has been taken.
    pub fn is_drained(&self) -> bool {
        self.closed.load(Ordering::Acquire) && self.rx.is_empty()
    }
}
