//! Fan-out of engine events to asynchronous hooks.
//!
//! Each kind of event gets its own bounded channel and a single dispatcher task. Flows hold an [`EventProducer`] and
//! publish into the channel; the dispatcher runs the hook for every event on its own task, so a slow hook never
//! holds up an order or payment flow. Hooks only ever see a copy of the event.
//!
//! The dispatcher stops when the last producer is dropped, after every hook job it started has finished.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    receiver: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer { sender: self.sender.clone() }
    }

    /// Dispatches events until every producer is gone, then waits for the outstanding hook jobs.
    pub async fn start_handler(self) {
        let Self { mut receiver, sender, handler } = self;
        drop(sender);
        debug!("📬️ Event dispatcher started");
        let mut jobs = JoinSet::new();
        while let Some(event) = receiver.recv().await {
            trace!("📬️ Dispatching event to hook");
            jobs.spawn((handler)(event));
            // reap finished jobs, the set lives as long as the server
            while let Some(result) = jobs.try_join_next() {
                report(result);
            }
        }
        if !jobs.is_empty() {
            debug!("📬️ All producers dropped. Waiting for {} hook job(s) to finish", jobs.len());
        }
        while let Some(result) = jobs.join_next().await {
            report(result);
        }
        debug!("📬️ Event dispatcher has shut down");
    }
}

fn report(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!("📬️ A hook job did not complete. {e}");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    /// Waits for room in the channel. An event published after the dispatcher has stopped is logged and dropped.
    pub async fn publish_event(&self, event: E) {
        if self.sender.send(event).await.is_err() {
            error!("📬️ Event dispatcher is not running. Event dropped.");
        }
    }
}
