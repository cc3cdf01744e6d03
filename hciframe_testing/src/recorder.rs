//! Recording packet callback.

use std::sync::{Arc, Mutex, MutexGuard};

use hciframe::MessageCategory;

/// One callback invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery<P> {
    /// Total frame size reported to the callback.
    pub total_size: usize,
    /// Delivered packet.
    pub packet: P,
    /// Delivery category.
    pub category: MessageCategory,
}

/// Shared log of callback invocations.
///
/// Clones share the same log, so one handle can be registered with the
/// reassembler while another is inspected by the test.
#[derive(Debug)]
pub struct Recorder<P> {
    deliveries: Arc<Mutex<Vec<Delivery<P>>>>,
}

impl<P> Clone for Recorder<P> {
    fn clone(&self) -> Self {
        Self {
            deliveries: Arc::clone(&self.deliveries),
        }
    }
}

impl<P> Default for Recorder<P> {
    fn default() -> Self {
        Self {
            deliveries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<P: Send + 'static> Recorder<P> {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Callback appending to this recorder's log.
    #[must_use]
    pub fn callback(&self) -> impl FnMut(usize, P, MessageCategory) + Send + use<P> {
        let deliveries = Arc::clone(&self.deliveries);
        move |total_size, packet, category| {
            deliveries
                .lock()
                .expect("recorder poisoned")
                .push(Delivery {
                    total_size,
                    packet,
                    category,
                });
        }
    }

    /// Lock and return the delivery log.
    ///
    /// # Panics
    ///
    /// Panics if a callback panicked while holding the lock.
    pub fn deliveries(&self) -> MutexGuard<'_, Vec<Delivery<P>>> {
        self.deliveries.lock().expect("recorder poisoned")
    }

    /// Number of deliveries so far.
    #[must_use]
    pub fn len(&self) -> usize { self.deliveries().len() }

    /// Whether nothing has been delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.deliveries().is_empty() }

    /// Reported total sizes, in delivery order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.deliveries()
            .iter()
            .map(|delivery| delivery.total_size)
            .collect()
    }
}

impl<P: Clone + Send + 'static> Recorder<P> {
    /// Delivered packets, in delivery order.
    #[must_use]
    pub fn packets(&self) -> Vec<P> {
        self.deliveries()
            .iter()
            .map(|delivery| delivery.packet.clone())
            .collect()
    }
}
