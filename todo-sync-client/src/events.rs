//! Delivery of list events to the presentation layer
//!
//! Events can be emitted from any thread. They are queued and only handed to
//! callbacks when `process_events()` is called, on the thread that registered
//! the first callback. The working set lives on that same thread, so a callback
//! can safely read the client state it is being told about.

use std::sync::{mpsc, Mutex};
use std::thread::{self, ThreadId};
use todo_sync_core::{ClientError, ClientResult, ListEvent, ViewUpdate};

struct CallbackEntry {
    callback: Box<dyn Fn(&ListEvent) + Send>,
}

pub struct EventDispatcher {
    callbacks: Mutex<Vec<CallbackEntry>>,
    event_queue: Mutex<mpsc::Receiver<ListEvent>>,
    event_sender: mpsc::Sender<ListEvent>,
    callback_thread_id: Mutex<Option<ThreadId>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            callbacks: Mutex::new(Vec::new()),
            event_queue: Mutex::new(receiver),
            event_sender: sender,
            callback_thread_id: Mutex::new(None),
        }
    }

    fn ensure_callback_thread(&self) -> ClientResult<()> {
        let mut thread_id = self
            .callback_thread_id
            .lock()
            .map_err(|_| ClientError::LockError("thread ID".into()))?;
        if thread_id.is_none() {
            *thread_id = Some(thread::current().id());
            tracing::info!(
                "Event callbacks will be processed on thread: {:?}",
                thread::current().id()
            );
        }
        Ok(())
    }

    /// Register a callback for every list event.
    ///
    /// ```rust,no_run
    /// use todo_sync_client::events::EventDispatcher;
    /// use todo_sync_core::ListEvent;
    ///
    /// let dispatcher = EventDispatcher::new();
    /// dispatcher.register_callback(|event| match event {
    ///     ListEvent::CellInserted { index } => println!("inserted at {index}"),
    ///     ListEvent::LoadFailed { message } => eprintln!("load failed: {message}"),
    ///     _ => {}
    /// }).unwrap();
    /// ```
    pub fn register_callback<F>(&self, callback: F) -> ClientResult<()>
    where
        F: Fn(&ListEvent) + Send + 'static,
    {
        self.ensure_callback_thread()?;

        let mut callbacks = self
            .callbacks
            .lock()
            .map_err(|_| ClientError::LockError("callbacks".into()))?;

        callbacks.push(CallbackEntry {
            callback: Box::new(callback),
        });

        Ok(())
    }

    pub fn emit(&self, event: ListEvent) {
        if self.event_sender.send(event).is_err() {
            tracing::error!("Failed to queue event - receiver may have been dropped");
        }
    }

    pub fn emit_update(&self, update: ViewUpdate) {
        self.emit(update.into());
    }

    pub fn emit_load_failed(&self, message: impl Into<String>) {
        self.emit(ListEvent::LoadFailed {
            message: message.into(),
        });
    }

    /// Deliver every queued event. Must be called on the registration thread.
    pub fn process_events(&self) -> ClientResult<usize> {
        {
            let thread_id = self
                .callback_thread_id
                .lock()
                .map_err(|_| ClientError::LockError("thread ID".into()))?;
            match *thread_id {
                Some(expected) if thread::current().id() != expected => {
                    return Err(ClientError::ThreadSafetyViolation);
                }
                Some(_) => {}
                None => return Err(ClientError::NoCallbacksRegistered),
            }
        }

        let pending: Vec<ListEvent> = {
            let receiver = self
                .event_queue
                .lock()
                .map_err(|_| ClientError::LockError("event queue".into()))?;
            receiver.try_iter().collect()
        };

        let callbacks = self
            .callbacks
            .lock()
            .map_err(|_| ClientError::LockError("callbacks".into()))?;

        for event in &pending {
            for entry in callbacks.iter() {
                (entry.callback)(event);
            }
        }

        Ok(pending.len())
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recording_dispatcher() -> (EventDispatcher, Arc<Mutex<Vec<ListEvent>>>) {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        dispatcher
            .register_callback(move |event| sink.lock().unwrap().push(event.clone()))
            .unwrap();
        (dispatcher, seen)
    }

    #[test]
    fn test_events_are_queued_until_processed() {
        let (dispatcher, seen) = recording_dispatcher();

        dispatcher.emit_update(ViewUpdate::CellInserted(0));
        dispatcher.emit_load_failed("offline");
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(dispatcher.process_events().unwrap(), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ListEvent::CellInserted { index: 0 },
                ListEvent::LoadFailed {
                    message: "offline".to_string()
                },
            ]
        );

        assert_eq!(dispatcher.process_events().unwrap(), 0);
    }

    #[test]
    fn test_process_without_callbacks() {
        let dispatcher = EventDispatcher::new();
        dispatcher.emit_update(ViewUpdate::ListChanged);

        assert!(matches!(
            dispatcher.process_events(),
            Err(ClientError::NoCallbacksRegistered)
        ));
    }

    #[test]
    fn test_thread_safety_check() {
        let (dispatcher, _seen) = recording_dispatcher();
        let dispatcher = Arc::new(dispatcher);

        let other = dispatcher.clone();
        let result = std::thread::spawn(move || {
            other.emit_update(ViewUpdate::CellChanged(1));
            other.process_events()
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(ClientError::ThreadSafetyViolation)));
        assert_eq!(dispatcher.process_events().unwrap(), 1);
    }
}
