use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tracing::{error, info};

use common::notify::Notifier;
use engine::error::error_notification;
use engine::orchestrator::Orchestrator;
use engine::parser;

/// Fans accepted signals out to bounded worker tasks. Ingestion never waits
/// on order placement or monitoring.
#[derive(Clone)]
pub struct SignalDispatcher {
    orchestrator: Arc<Orchestrator>,
    notifier: Notifier,
    permits: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SignalDispatcher {
    pub fn new(orchestrator: Arc<Orchestrator>, notifier: Notifier, max_concurrent: usize) -> Self {
        Self {
            orchestrator,
            notifier,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Parses the signal and, if it is well formed, hands it to a worker
    /// task. A parse failure never starts a worker.
    pub fn dispatch(&self, raw_text: String) {
        let signal = match parser::parse_signal(&raw_text) {
            Ok(signal) => signal,
            Err(e) => {
                self.notifier.notify(error_notification(&e));
                return;
            }
        };

        // One live worker per symbol; a second signal for the same symbol
        // would race the first one's protective chain.
        {
            let mut active = self.in_flight.lock().expect("in-flight set poisoned");
            if !active.insert(signal.symbol.clone()) {
                self.notifier.notify(format!(
                    "{}: a signal is already being worked, ignoring duplicate",
                    signal.symbol
                ));
                return;
            }
        }

        let orchestrator = self.orchestrator.clone();
        let notifier = self.notifier.clone();
        let permits = self.permits.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let symbol = signal.symbol.clone();

            match permits.acquire_owned().await {
                Ok(_permit) => {
                    info!("Worker started for {}", symbol);
                    if let Err(e) = orchestrator.execute_signal(signal).await {
                        notifier.notify(error_notification(&e));
                    }
                }
                Err(_) => error!("Signal semaphore closed, dropping {}", symbol),
            }

            in_flight
                .lock()
                .expect("in-flight set poisoned")
                .remove(&symbol);
        });
    }
}
