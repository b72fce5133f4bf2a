//! Ring buffer guarded by a single lock.

use autohaul_types::SensorReading;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Slot count used by [`SharedSensorChannel::new`].
pub const DEFAULT_CAPACITY: usize = 200;

/// A warning is logged once per this many dropped readings.
pub const OVERWRITE_WARN_INTERVAL: u64 = 100;

#[derive(Debug)]
struct Ring {
    slots: Vec<SensorReading>,
    /// Index of the oldest entry (read cursor).
    head: usize,
    len: usize,
    overwrites: u64,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, reading: SensorReading) -> bool {
        let capacity = self.capacity();
        let mut overwrote = false;
        if self.len == capacity {
            self.head = (self.head + 1) % capacity;
            self.len -= 1;
            self.overwrites += 1;
            overwrote = true;
        }
        let tail = (self.head + self.len) % capacity;
        if let Some(slot) = self.slots.get_mut(tail) {
            *slot = reading;
            self.len += 1;
        }
        overwrote
    }

    fn newest(&self) -> Option<SensorReading> {
        let last = self.len.checked_sub(1)?;
        self.slots.get((self.head + last) % self.capacity()).copied()
    }

    fn pop(&mut self) -> Option<SensorReading> {
        if self.len == 0 {
            return None;
        }
        let reading = self.slots.get(self.head).copied()?;
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(reading)
    }
}

/// Fixed-capacity latest-value ring buffer of [`SensorReading`]s.
///
/// All operations take one exclusive lock for an O(1) critical section.
/// Only [`read`](Self::read) and [`read_timeout`](Self::read_timeout) wait.
#[derive(Debug)]
pub struct SharedSensorChannel {
    ring: Mutex<Ring>,
    not_empty: Condvar,
}

impl Default for SharedSensorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSensorChannel {
    /// Creates a channel with [`DEFAULT_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a channel with `capacity` slots (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring {
                slots: vec![SensorReading::default(); capacity],
                head: 0,
                len: 0,
                overwrites: 0,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Inserts a reading. Never blocks; drops the oldest entry when full.
    pub fn write(&self, reading: SensorReading) {
        let (overwrote, overwrites) = {
            let mut ring = self.ring.lock();
            let overwrote = ring.push(reading);
            (overwrote, ring.overwrites)
        };
        self.not_empty.notify_one();

        if overwrote && overwrites % OVERWRITE_WARN_INTERVAL == 0 {
            tracing::warn!(
                overwrites = overwrites,
                "Sensor channel full, oldest readings overwritten"
            );
        }
    }

    /// Removes and returns the oldest reading, waiting until one exists.
    pub fn read(&self) -> SensorReading {
        let mut ring = self.ring.lock();
        loop {
            if let Some(reading) = ring.pop() {
                return reading;
            }
            self.not_empty.wait(&mut ring);
        }
    }

    /// Like [`read`](Self::read) but gives up after `timeout`.
    ///
    /// Returns `None` if the channel stayed empty until the deadline. Wakeups
    /// that find the entry already taken do not extend the wait.
    pub fn read_timeout(&self, timeout: Duration) -> Option<SensorReading> {
        let deadline = Instant::now() + timeout;
        let mut ring = self.ring.lock();
        loop {
            if let Some(reading) = ring.pop() {
                return Some(reading);
            }
            if self.not_empty.wait_until(&mut ring, deadline).timed_out() {
                return ring.pop();
            }
        }
    }

    /// Returns the most recently written reading without removing anything.
    ///
    /// Returns the zero-valued reading when nothing has been written.
    #[must_use]
    pub fn peek_latest(&self) -> SensorReading {
        self.ring.lock().newest().unwrap_or_default()
    }

    /// Number of buffered readings.
    #[must_use]
    pub fn size(&self) -> usize {
        self.ring.lock().len
    }

    /// Returns true when no reading is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.lock().len == 0
    }

    /// Returns true when every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        let ring = self.ring.lock();
        ring.len == ring.capacity()
    }

    /// Slot count.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    /// Total readings dropped to make room for newer ones.
    #[must_use]
    pub fn overwrite_count(&self) -> u64 {
        self.ring.lock().overwrites
    }
}
