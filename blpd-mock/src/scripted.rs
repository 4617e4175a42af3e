use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use blpd_core::{BlpError, ConnectionConfig, CorrelationId, Event, EventKind, Message, Request, SessionGateway};

/// How [`SessionGateway::open`] behaves on a scripted session.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenBehavior {
    /// Start the session.
    Succeed,
    /// Fail with `ConnectionFailed` carrying this message.
    ConnectionFailed(String),
    /// Fail with `ServiceUnavailable` for this service.
    ServiceUnavailable(String),
}

enum Scripted {
    /// Delivered exactly as given.
    Verbatim(Event),
    /// Messages are tagged with the most recently issued correlation id on delivery.
    ForCurrent(EventKind, Vec<Message>),
}

struct InternalState {
    open_behavior: OpenBehavior,
    opened_with: Option<ConnectionConfig>,
    active: bool,
    next_cid: u64,
    current: Option<CorrelationId>,
    queue: VecDeque<Scripted>,
    sent: Vec<(CorrelationId, Request)>,
    polls: usize,
}

impl Default for InternalState {
    fn default() -> Self {
        Self {
            open_behavior: OpenBehavior::Succeed,
            opened_with: None,
            active: false,
            next_cid: 1,
            current: None,
            queue: VecDeque::new(),
            sent: Vec::new(),
            polls: 0,
        }
    }
}

/// Controller handle used by tests to drive a [`ScriptedSession`] from the outside.
pub struct ScriptedSessionController {
    state: Arc<Mutex<InternalState>>,
}

impl ScriptedSessionController {
    /// Queue an event delivered verbatim.
    pub async fn push_event(&self, event: Event) {
        self.state.lock().await.queue.push_back(Scripted::Verbatim(event));
    }

    /// Queue an event whose messages answer the request sent last.
    ///
    /// The correlation id is bound when the event is polled, so events can be
    /// scripted before the request exists. The ids already on `messages` are
    /// replaced.
    pub async fn push_for_current(&self, kind: EventKind, messages: Vec<Message>) {
        self.state
            .lock()
            .await
            .queue
            .push_back(Scripted::ForCurrent(kind, messages));
    }

    /// Set how subsequent `open` calls behave.
    pub async fn set_open_behavior(&self, behavior: OpenBehavior) {
        self.state.lock().await.open_behavior = behavior;
    }

    /// Target of the last `open` call that started the session.
    pub async fn opened_with(&self) -> Option<ConnectionConfig> {
        self.state.lock().await.opened_with.clone()
    }

    /// Requests sent so far, with the ids they were given.
    pub async fn sent_requests(&self) -> Vec<(CorrelationId, Request)> {
        self.state.lock().await.sent.clone()
    }

    /// Number of `poll` calls answered so far.
    pub async fn poll_count(&self) -> usize {
        self.state.lock().await.polls
    }

    /// Events still waiting to be polled.
    pub async fn pending_events(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Drop queued events and the request log.
    pub async fn clear(&self) {
        let mut guard = self.state.lock().await;
        guard.queue.clear();
        guard.sent.clear();
        guard.polls = 0;
    }
}

/// A gateway that defers all behavior to an external controller.
///
/// An empty queue makes `poll` wait out its timeout and return a timeout event.
pub struct ScriptedSession {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl ScriptedSession {
    /// Create a scripted session and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn SessionGateway>, ScriptedSessionController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = ScriptedSessionController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn SessionGateway>, controller)
    }
}

#[async_trait]
impl SessionGateway for ScriptedSession {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn open(&self, connection: &ConnectionConfig) -> Result<(), BlpError> {
        let mut guard = self.state.lock().await;
        if guard.active {
            return Ok(());
        }
        match guard.open_behavior.clone() {
            OpenBehavior::Succeed => {
                guard.active = true;
                guard.opened_with = Some(connection.clone());
                Ok(())
            }
            OpenBehavior::ConnectionFailed(msg) => Err(BlpError::connection_failed(self.name, msg)),
            OpenBehavior::ServiceUnavailable(service) => {
                Err(BlpError::service_unavailable(service))
            }
        }
    }

    async fn close(&self) -> Result<(), BlpError> {
        self.state.lock().await.active = false;
        Ok(())
    }

    async fn is_active(&self) -> bool {
        self.state.lock().await.active
    }

    async fn send(&self, request: &Request) -> Result<CorrelationId, BlpError> {
        let mut guard = self.state.lock().await;
        if !guard.active {
            return Err(BlpError::NotConnected);
        }
        let cid = CorrelationId::new(guard.next_cid);
        guard.next_cid += 1;
        guard.current = Some(cid);
        guard.sent.push((cid, request.clone()));
        Ok(cid)
    }

    async fn poll(&self, timeout: Duration) -> Result<Event, BlpError> {
        // Take the next event without holding the lock across the sleep
        let next = {
            let mut guard = self.state.lock().await;
            if !guard.active {
                return Err(BlpError::NotConnected);
            }
            guard.polls += 1;
            let current = guard.current;
            guard.queue.pop_front().map(|s| match s {
                Scripted::Verbatim(event) => event,
                Scripted::ForCurrent(kind, messages) => Event {
                    kind,
                    messages: messages
                        .into_iter()
                        .map(|mut m| {
                            m.correlation_ids = current.into_iter().collect();
                            m
                        })
                        .collect(),
                },
            })
        };
        match next {
            Some(event) => Ok(event),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(Event::timeout())
            }
        }
    }
}
