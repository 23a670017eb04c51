//! WebSocket transport client.
//!
//! # Connection lifecycle
//!
//! ```text
//! ┌──────────────┐  start   ┌────────────┐  open   ┌──────┐
//! │ Disconnected │─────────>│ Connecting │────────>│ Open │
//! └──────────────┘          └────────────┘         └──────┘
//!         ▲                      │ error               │ stop / error /
//!         │                      │                     │ close
//!         └──────────────────────┴─────────────────────┘
//! ```
//!
//! Each `start` spawns one connection task owning the socket. `start` while
//! Connecting or Open first closes the previous connection and waits for its
//! task to finish, so two live sockets never coexist. Reaching Disconnected
//! always publishes a [`Disconnected`] bus event; there is no automatic
//! reconnect.
//!
//! Outbound intents arrive over the bus (the client subscribes to
//! [`Intent`] at construction) and are forwarded to the connection task over
//! an unbounded channel, but only while the link is Open: a stale or not yet
//! open link drops the intent. At-most-once, best-effort — a stale hold
//! state is worthless to the server.

use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError},
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use holdwire_bus::MessageBus;
use holdwire_proto::{Category, Intent, RoomStats, ServerMessage};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::{ClientError, Connected, Disconnected, Endpoints};

/// Connection lifecycle state, as observed by `send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No live socket.
    Disconnected,
    /// Socket dial in progress.
    Connecting,
    /// Socket open, frames can flow.
    Open,
}

/// How long to wait for the peer to acknowledge our Close frame.
const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

type SharedState = Arc<StdMutex<LinkState>>;

fn set_state(state: &SharedState, value: LinkState) {
    *state.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

/// Handle to one spawned connection task.
struct Conn {
    outbound: mpsc::UnboundedSender<Intent>,
    shutdown: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

/// Transport client owning at most one persistent connection.
pub struct NetClient {
    endpoints: Endpoints,
    client_id: String,
    bus: MessageBus,
    http: reqwest::Client,
    state: SharedState,
    conn: Mutex<Option<Conn>>,
}

impl NetClient {
    /// Create a client and register it on the bus as the consumer of
    /// outbound [`Intent`]s.
    pub fn new(endpoints: Endpoints, client_id: impl Into<String>, bus: MessageBus) -> Arc<Self> {
        let client = Arc::new(Self {
            endpoints,
            client_id: client_id.into(),
            bus: bus.clone(),
            http: reqwest::Client::new(),
            state: Arc::new(StdMutex::new(LinkState::Disconnected)),
            conn: Mutex::new(None),
        });

        let weak = Arc::downgrade(&client);
        bus.subscribe::<Intent, _, _>(move |intent| {
            let weak = weak.clone();
            async move {
                if let Some(client) = weak.upgrade() {
                    client.send(intent).await;
                }
                Ok(())
            }
        });

        client
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the gameplay connection for `category`, closing any previous
    /// connection first.
    ///
    /// Success and failure both surface asynchronously as [`Connected`] /
    /// [`Disconnected`] bus events; the only synchronous error is a
    /// malformed endpoint.
    pub async fn start(&self, init_data: &str, category: Category) -> Result<(), ClientError> {
        // Never hold two live sockets: tear the old one down and wait for
        // its task to finish before dialing.
        self.stop().await;

        let url = self.gameplay_url(init_data, category)?;
        set_state(&self.state, LinkState::Connecting);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_connection(
            url,
            self.bus.clone(),
            Arc::clone(&self.state),
            outbound_rx,
            shutdown_rx,
        ));

        *self.conn.lock().await = Some(Conn { outbound: outbound_tx, shutdown: shutdown_tx, task });
        Ok(())
    }

    /// Close the active connection if any; a no-op when already
    /// Disconnected.
    pub async fn stop(&self) {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            // The task may already be gone after a transport error; both
            // results are fine.
            let _ = conn.shutdown.send(());
            let _ = conn.task.await;
        }
    }

    /// Forward an outbound intent to the wire if the link is Open;
    /// silently drop it otherwise. Never fails.
    pub async fn send(&self, intent: Intent) {
        if self.state() != LinkState::Open {
            debug!(phase = intent.phase.as_str(), "link not open, dropping intent");
            return;
        }
        let guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            if conn.outbound.send(intent).is_err() {
                debug!("connection task gone, dropping intent");
            }
        }
    }

    /// Fetch room statistics for `category` over HTTP and publish them on
    /// the bus. Failures are logged and dropped.
    pub async fn fetch_room_stats(&self, category: Category) {
        match self.room_stats(category).await {
            Ok(stats) => {
                if let Err(error) = self.bus.publish(stats).await {
                    warn!(%error, "room stats delivery failed");
                }
            },
            Err(error) => warn!(%error, "room stats fetch failed"),
        }
    }

    async fn room_stats(&self, category: Category) -> Result<RoomStats, ClientError> {
        let url = format!("{}/room/stats", self.endpoints.http);
        let stats = self
            .http
            .get(url)
            .query(&[("clientId", self.client_id.as_str()), ("category", category.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(stats)
    }

    fn gameplay_url(&self, init_data: &str, category: Category) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.endpoints.ws)?;
        url.query_pairs_mut()
            .append_pair("initData", init_data)
            .append_pair("category", category.as_str())
            .append_pair("clientId", &self.client_id);
        Ok(url)
    }
}

/// One connection's life, from dial to Disconnected event.
async fn run_connection(
    url: Url,
    bus: MessageBus,
    state: SharedState,
    mut outbound_rx: mpsc::UnboundedReceiver<Intent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    // The dial must stay interruptible: a peer that accepts TCP but never
    // answers the handshake would otherwise pin this task, and stop()
    // awaits it.
    let dial = tokio::select! {
        _ = &mut shutdown_rx => {
            debug!("shutdown while dialing");
            set_state(&state, LinkState::Disconnected);
            publish_event(&bus, Disconnected).await;
            return;
        },
        dial = connect_async(url.as_str()) => dial,
    };
    let ws = match dial {
        Ok((ws, _)) => ws,
        Err(error) => {
            warn!(%error, "connection failed");
            set_state(&state, LinkState::Disconnected);
            publish_event(&bus, Disconnected).await;
            return;
        },
    };

    set_state(&state, LinkState::Open);
    publish_event(&bus, Connected).await;

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                let _ = sink.send(Message::Close(None)).await;
                // Drain until the peer acknowledges the close, so the next
                // connection never overlaps this one on the server side. A
                // peer that never acknowledges must not pin the task.
                let drain = async {
                    while let Some(frame) = stream.next().await {
                        if frame.is_err() {
                            break;
                        }
                    }
                };
                if tokio::time::timeout(CLOSE_DRAIN_TIMEOUT, drain).await.is_err() {
                    debug!("close handshake timed out, dropping the socket");
                }
                break;
            },

            maybe_intent = outbound_rx.recv() => match maybe_intent {
                Some(intent) => match intent.encode() {
                    Ok(text) => {
                        if let Err(error) = sink.send(Message::text(text)).await {
                            warn!(%error, "send failed, dropping intent");
                            break;
                        }
                    },
                    // Caught locally, never propagated to the producer.
                    Err(error) => warn!(%error, "unserializable intent dropped"),
                },
                None => break,
            },

            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch_frame(&bus, text.as_str()).await,
                Some(Ok(Message::Ping(payload))) => {
                    let _ = sink.send(Message::Pong(payload)).await;
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {},
                Some(Err(error)) => {
                    warn!(%error, "transport error");
                    break;
                },
            },
        }
    }

    set_state(&state, LinkState::Disconnected);
    publish_event(&bus, Disconnected).await;
}

/// Decode one inbound frame and publish it on the channel of its kind.
///
/// Malformed frames and unknown kinds are dropped without disturbing the
/// read loop.
pub(crate) async fn dispatch_frame(bus: &MessageBus, text: &str) {
    match ServerMessage::decode(text) {
        Ok(Some(message)) => {
            let delivered = match message {
                ServerMessage::Update(update) => bus.publish(update).await,
                ServerMessage::Record(record) => bus.publish(record).await,
                ServerMessage::Error(error) => bus.publish(error).await,
            };
            if let Err(error) = delivered {
                warn!(%error, "subscriber failed while handling inbound frame");
            }
        },
        Ok(None) => debug!("ignoring frame with unknown kind"),
        Err(error) => warn!(%error, "dropping malformed frame"),
    }
}

async fn publish_event<M>(bus: &MessageBus, event: M)
where
    M: Clone + Send + Sync + 'static,
{
    if let Err(error) = bus.publish(event).await {
        warn!(%error, "lifecycle event delivery failed");
    }
}
