use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Sender};

use crate::{
    peripheral::{Outcome, Peripheral, StackEvent},
    stack::BleStack,
};

const EVENT_QUEUE_DEPTH: usize = 16;
const STACK_SIZE: usize = 8 * 1024;

/// Owns the [`Peripheral`] on a dedicated thread and feeds it stack events
/// strictly one at a time. Callbacks only ever touch the sending side.
pub struct EventLoop {
    events: Sender<StackEvent>,
    handle: JoinHandle<Peripheral>,
}

impl EventLoop {
    /// `subscribe` wires the stack callbacks to the queue. It runs before the
    /// application is registered so that no confirmation can be missed.
    pub fn spawn<S, F>(stack: S, mut peripheral: Peripheral, subscribe: F) -> anyhow::Result<Self>
    where
        S: BleStack + Send + 'static,
        F: FnOnce(&S, Sender<StackEvent>) -> anyhow::Result<()>,
    {
        let (tx, rx) = bounded::<StackEvent>(EVENT_QUEUE_DEPTH);
        subscribe(&stack, tx.clone())?;

        let handle = std::thread::Builder::new()
            .name("ble-peripheral".to_string())
            .stack_size(STACK_SIZE)
            .spawn(move || {
                if let Err(err) = peripheral.start(&stack) {
                    log::error!("Failed to start peripheral: {:?}", err);
                }

                for event in rx.iter() {
                    match peripheral.handle(&stack, &event) {
                        Ok(Outcome::Ignored) => {
                            log::debug!("Event ignored: {:?}", event);
                        }
                        Ok(outcome) => {
                            log::debug!("Event {:?} handled: {:?}", event, outcome);
                        }
                        Err(err) => {
                            log::error!("Failed to handle event {:?}: {}", event, err);
                        }
                    }
                }

                log::warn!("Event channel closed, stopping peripheral loop");
                peripheral
            })?;

        Ok(Self { events: tx, handle })
    }

    pub fn sender(&self) -> Sender<StackEvent> {
        self.events.clone()
    }

    /// Stops accepting events from this handle and waits for the loop to
    /// drain. Returns once every other sender is dropped as well.
    pub fn join(self) -> anyhow::Result<Peripheral> {
        drop(self.events);
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("Peripheral event loop panicked"))
    }
}
