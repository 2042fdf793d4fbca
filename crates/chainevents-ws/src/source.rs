//! `WsLogSource`: a [`LogSource`] over one JSON-RPC WebSocket connection.
//!
//! A background task owns the socket. Callers talk to it through a command
//! channel; responses are matched back by request id and `logs`
//! notifications are routed by subscription id into the matching feed.
//!
//! When the connection drops, every open feed is failed with a transport
//! error and in-flight requests are rejected. The task then reconnects with
//! exponential backoff so later queries and subscriptions can succeed.
//! Feeds are not silently re-subscribed: logs emitted while disconnected
//! would be lost without the consumer noticing.

use crate::config::WsConfig;
use crate::wire::{self, Incoming};
use async_trait::async_trait;
use chainevents_core::{
    live_feed, FeedSender, FilterCriteria, HistoricalLogs, LiveFeed, LogSource, RawLog,
    ReleaseHandle, SourceError,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Reply<T> = oneshot::Sender<Result<T, SourceError>>;

/// Command sent from callers to the background task.
#[derive(Debug)]
pub(crate) enum Command {
    Call {
        method: &'static str,
        params: Value,
        reply: Reply<Value>,
    },
    Subscribe {
        key: u64,
        criteria: FilterCriteria,
        feed: FeedSender,
        reply: Reply<String>,
    },
    /// The consumer released the feed registered under `key`.
    Release { key: u64 },
    Close,
}

#[derive(Debug)]
enum Pending {
    Call(Reply<Value>),
    Subscribe {
        key: u64,
        criteria: FilterCriteria,
        feed: FeedSender,
        reply: Reply<String>,
    },
    Unsubscribe(String),
}

#[derive(Debug)]
struct Feed {
    key: u64,
    criteria: FilterCriteria,
    sender: FeedSender,
}

/// Bookkeeping for one connection: in-flight requests and open feeds.
///
/// Socket-free so it can be exercised without a node.
#[derive(Debug, Default)]
pub(crate) struct State {
    next_id: u64,
    pending: HashMap<u64, Pending>,
    /// server subscription id -> feed
    feeds: HashMap<String, Feed>,
    /// release key -> server subscription id
    keys: HashMap<u64, String>,
}

impl State {
    fn request(&mut self, method: &str, params: Value, pending: Pending) -> String {
        self.next_id += 1;
        let id = self.next_id;
        self.pending.insert(id, pending);
        wire::request(id, method, params)
    }

    fn unsubscribe(&mut self, sub_id: String) -> String {
        let params = json!([sub_id]);
        self.request("eth_unsubscribe", params, Pending::Unsubscribe(sub_id))
    }

    /// Turn a caller command into the frame to send, if any.
    pub(crate) fn outgoing(&mut self, cmd: Command) -> Option<String> {
        match cmd {
            Command::Call {
                method,
                params,
                reply,
            } => Some(self.request(method, params, Pending::Call(reply))),
            Command::Subscribe {
                key,
                criteria,
                feed,
                reply,
            } => {
                let params = json!(["logs", criteria.to_rpc_filter()]);
                Some(self.request(
                    "eth_subscribe",
                    params,
                    Pending::Subscribe {
                        key,
                        criteria,
                        feed,
                        reply,
                    },
                ))
            }
            Command::Release { key } => {
                let sub_id = self.keys.remove(&key)?;
                self.feeds.remove(&sub_id);
                debug!(subscription = %sub_id, "feed released, unsubscribing");
                Some(self.unsubscribe(sub_id))
            }
            Command::Close => None,
        }
    }

    /// Handle a text frame from the node. May produce a frame to send back.
    pub(crate) fn incoming(&mut self, text: &str) -> Option<String> {
        match wire::classify(text) {
            Incoming::Notification {
                subscription,
                result,
            } => self.notify(subscription, result),
            Incoming::Response { id, result } => self.respond(id, result),
            Incoming::Unrecognised(reason) => {
                debug!(%reason, "ignoring unrecognised message");
                None
            }
        }
    }

    fn notify(&mut self, sub_id: String, result: Value) -> Option<String> {
        let Some(feed) = self.feeds.get(&sub_id) else {
            trace!(subscription = %sub_id, "notification for unknown subscription");
            return None;
        };
        match wire::parse_log(result) {
            Ok(log) => {
                if feed.criteria.matches(&log) && feed.sender.send(log).is_err() {
                    trace!(subscription = %sub_id, "consumer gone, awaiting release");
                }
                None
            }
            Err(err) => {
                warn!(subscription = %sub_id, error = %err, "malformed log notification");
                let feed = self.feeds.remove(&sub_id)?;
                self.keys.remove(&feed.key);
                feed.sender.fail(err);
                Some(self.unsubscribe(sub_id))
            }
        }
    }

    fn respond(&mut self, id: u64, result: Result<Value, SourceError>) -> Option<String> {
        let Some(pending) = self.pending.remove(&id) else {
            trace!(id, "response to unknown request");
            return None;
        };
        match pending {
            Pending::Call(reply) => {
                let _ = reply.send(result);
                None
            }
            Pending::Subscribe {
                key,
                criteria,
                feed,
                reply,
            } => {
                let sub_id = match result.and_then(subscription_id) {
                    Ok(sub_id) => sub_id,
                    Err(err) => {
                        let _ = reply.send(Err(err));
                        return None;
                    }
                };
                if reply.send(Ok(sub_id.clone())).is_err() {
                    // The caller timed out; nobody will consume this feed.
                    debug!(subscription = %sub_id, "late subscription, unsubscribing");
                    return Some(self.unsubscribe(sub_id));
                }
                self.keys.insert(key, sub_id.clone());
                self.feeds.insert(
                    sub_id,
                    Feed {
                        key,
                        criteria,
                        sender: feed,
                    },
                );
                None
            }
            Pending::Unsubscribe(sub_id) => {
                match result {
                    Ok(_) => trace!(subscription = %sub_id, "unsubscribed"),
                    Err(err) => debug!(subscription = %sub_id, error = %err, "eth_unsubscribe failed"),
                }
                None
            }
        }
    }

    /// Fail everything tied to the current connection.
    pub(crate) fn disconnect(&mut self, err: SourceError) {
        for (_, pending) in self.pending.drain() {
            match pending {
                Pending::Call(reply) => {
                    let _ = reply.send(Err(err.clone()));
                }
                Pending::Subscribe { reply, .. } => {
                    let _ = reply.send(Err(err.clone()));
                }
                Pending::Unsubscribe(_) => {}
            }
        }
        for (_, feed) in self.feeds.drain() {
            feed.sender.fail(err.clone());
        }
        self.keys.clear();
    }

    pub(crate) fn open_feeds(&self) -> usize {
        self.feeds.len()
    }
}

fn subscription_id(result: Value) -> Result<String, SourceError> {
    match result {
        Value::String(id) => Ok(id),
        other => Err(SourceError::InvalidResponse(format!(
            "eth_subscribe returned {other}"
        ))),
    }
}

/// Reject a command that arrived while no connection is available.
fn reject(cmd: Command, err: &SourceError) {
    match cmd {
        Command::Call { reply, .. } => {
            let _ = reply.send(Err(err.clone()));
        }
        Command::Subscribe { reply, .. } => {
            let _ = reply.send(Err(err.clone()));
        }
        Command::Release { .. } | Command::Close => {}
    }
}

enum Exit {
    Closed,
    Disconnected(String),
}

/// Log source backed by a WebSocket JSON-RPC endpoint.
pub struct WsLogSource {
    url: String,
    config: WsConfig,
    cmd_tx: mpsc::UnboundedSender<Command>,
    next_key: AtomicU64,
}

impl WsLogSource {
    /// Connect to `config.url` and start the background task.
    ///
    /// The first connection attempt is made here so a bad endpoint is
    /// reported to the caller instead of retried forever.
    pub async fn connect(config: WsConfig) -> Result<Self, SourceError> {
        let parsed = url::Url::parse(&config.url)
            .map_err(|e| SourceError::Transport(format!("invalid url {:?}: {e}", config.url)))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(SourceError::Transport(format!(
                "unsupported scheme {:?}, expected ws or wss",
                parsed.scheme()
            )));
        }

        info!(url = %config.url, "connecting via WebSocket");
        let (socket, _) = connect_async(config.url.as_str())
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(ws_task(config.clone(), socket, cmd_rx));

        Ok(Self {
            url: config.url.clone(),
            config,
            cmd_tx,
            next_key: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn send(&self, cmd: Command) -> Result<(), SourceError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| SourceError::Transport("WS task closed".into()))
    }

    async fn await_reply<T>(
        &self,
        rx: oneshot::Receiver<Result<T, SourceError>>,
    ) -> Result<T, SourceError> {
        match time::timeout(self.config.request_timeout(), rx).await {
            Err(_) => Err(SourceError::Timeout {
                ms: self.config.request_timeout_ms,
            }),
            Ok(Err(_)) => Err(SourceError::Transport("WS response dropped".into())),
            Ok(Ok(result)) => result,
        }
    }

    /// Issue an arbitrary JSON-RPC call on the connection.
    pub async fn call(&self, method: &'static str, params: Value) -> Result<Value, SourceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Call {
            method,
            params,
            reply,
        })?;
        self.await_reply(rx).await
    }

    /// Current head block number (`eth_blockNumber`).
    pub async fn block_number(&self) -> Result<u64, SourceError> {
        match self.call("eth_blockNumber", json!([])).await? {
            Value::String(n) => wire::parse_hex_u64(&n),
            other => Err(SourceError::InvalidResponse(format!(
                "eth_blockNumber returned {other}"
            ))),
        }
    }
}

impl std::fmt::Debug for WsLogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsLogSource").field("url", &self.url).finish()
    }
}

impl Drop for WsLogSource {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(Command::Close);
    }
}

#[async_trait]
impl LogSource for WsLogSource {
    async fn query_logs(&self, criteria: &FilterCriteria) -> Result<HistoricalLogs, SourceError> {
        let result = self
            .call("eth_getLogs", json!([criteria.to_rpc_filter()]))
            .await?;
        let mut logs: Vec<RawLog> = wire::parse_logs(result)?
            .into_iter()
            .filter(|log| criteria.matches(log))
            .collect();
        logs.sort_by_key(RawLog::position);
        debug!(event = criteria.event(), logs = logs.len(), "eth_getLogs returned");
        // eth_getLogs holds nothing on the node side.
        Ok(HistoricalLogs::new(logs))
    }

    async fn subscribe_logs(&self, criteria: &FilterCriteria) -> Result<LiveFeed, SourceError> {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        let (sender, mut feed) = live_feed(ReleaseHandle::noop());
        let (reply, rx) = oneshot::channel();
        self.send(Command::Subscribe {
            key,
            criteria: criteria.clone(),
            feed: sender,
            reply,
        })?;
        let sub_id = self.await_reply(rx).await?;
        debug!(event = criteria.event(), subscription = %sub_id, "logs subscription opened");

        let cmd_tx = self.cmd_tx.clone();
        feed.release = ReleaseHandle::new(move || {
            let _ = cmd_tx.send(Command::Release { key });
        });
        Ok(feed)
    }
}

/// Background task that owns the WebSocket connection.
async fn ws_task(config: WsConfig, socket: Socket, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
    let mut state = State::default();
    let mut socket = Some(socket);

    loop {
        let ws = match socket.take() {
            Some(ws) => ws,
            None => match reconnect(&config, &mut cmd_rx).await {
                Some(ws) => ws,
                None => return,
            },
        };

        match serve(ws, &mut state, &mut cmd_rx).await {
            Exit::Closed => {
                state.disconnect(SourceError::Closed);
                debug!(url = %config.url, "WS task closed");
                return;
            }
            Exit::Disconnected(reason) => {
                warn!(url = %config.url, %reason, feeds = state.open_feeds(), "WS disconnected");
                state.disconnect(SourceError::Transport(reason));
            }
        }
    }
}

async fn serve(
    ws: Socket,
    state: &mut State,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> Exit {
    let (mut sink, mut stream) = ws.split();

    loop {
        let frame = tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                None | Some(Command::Close) => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Exit::Closed;
                }
                Some(cmd) => state.outgoing(cmd),
            },
            msg = stream.next() => match msg {
                None => return Exit::Disconnected("stream closed".into()),
                Some(Err(e)) => return Exit::Disconnected(e.to_string()),
                Some(Ok(Message::Text(text))) => state.incoming(text.as_str()),
                Some(Ok(Message::Close(_))) => return Exit::Disconnected("closed by peer".into()),
                Some(Ok(_)) => None,
            },
        };

        if let Some(frame) = frame {
            if let Err(e) = sink.send(Message::Text(frame.into())).await {
                return Exit::Disconnected(e.to_string());
            }
        }
    }
}

/// Reconnect with exponential backoff. Commands that arrive meanwhile are
/// rejected; returns `None` once the source is closed.
async fn reconnect(
    config: &WsConfig,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> Option<Socket> {
    let offline = SourceError::Transport("WS reconnecting".into());
    let mut backoff = config.reconnect_initial();

    loop {
        let sleep = time::sleep(backoff);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    None | Some(Command::Close) => return None,
                    Some(cmd) => reject(cmd, &offline),
                },
                _ = &mut sleep => break,
            }
        }

        info!(url = %config.url, "reconnecting via WebSocket");
        match connect_async(config.url.as_str()).await {
            Ok((ws, _)) => return Some(ws),
            Err(e) => {
                backoff = (backoff * 2).min(config.reconnect_max());
                warn!(error = %e, "WS connect failed, retrying in {backoff:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};

    const TRANSFER: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    fn criteria() -> FilterCriteria {
        let sig: B256 = TRANSFER.parse().unwrap();
        FilterCriteria::for_signatures("Transfer", vec![sig])
            .at(Address::repeat_byte(0x01))
            .live()
    }

    fn notification(sub: &str, address: Address, block: u64) -> String {
        json!({
            "jsonrpc": "2.0",
            "method": "eth_subscription",
            "params": {
                "subscription": sub,
                "result": {
                    "address": address,
                    "topics": [TRANSFER],
                    "data": "0x",
                    "blockNumber": format!("{block:#x}"),
                    "logIndex": "0x0",
                    "transactionIndex": "0x0",
                }
            }
        })
        .to_string()
    }

    fn request_id(frame: &str) -> u64 {
        let v: Value = serde_json::from_str(frame).unwrap();
        v["id"].as_u64().unwrap()
    }

    /// Drive a subscribe command through to an open feed.
    fn open(state: &mut State, sub: &str) -> (LiveFeed, oneshot::Receiver<Result<String, SourceError>>) {
        let (sender, feed) = live_feed(ReleaseHandle::noop());
        let (reply, rx) = oneshot::channel();
        let frame = state
            .outgoing(Command::Subscribe {
                key: 1,
                criteria: criteria(),
                feed: sender,
                reply,
            })
            .unwrap();
        let v: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v["method"], "eth_subscribe");
        assert_eq!(v["params"][0], "logs");
        assert!(v["params"][1].get("fromBlock").is_none());

        let response = json!({"jsonrpc": "2.0", "id": request_id(&frame), "result": sub}).to_string();
        assert!(state.incoming(&response).is_none());
        (feed, rx)
    }

    #[test]
    fn subscription_routes_matching_logs() {
        let mut state = State::default();
        let (mut feed, mut rx) = open(&mut state, "0xabc");
        assert_eq!(rx.try_recv().unwrap().unwrap(), "0xabc");

        state.incoming(&notification("0xabc", Address::repeat_byte(0x01), 5));
        // Wrong emitter: filtered locally even if the node forwards it.
        state.incoming(&notification("0xabc", Address::repeat_byte(0x02), 6));
        state.incoming(&notification("0xother", Address::repeat_byte(0x01), 7));

        let log = feed.logs.try_recv().unwrap();
        assert_eq!(log.block_number, 5);
        assert!(feed.logs.try_recv().is_err());
    }

    #[test]
    fn release_sends_unsubscribe_once() {
        let mut state = State::default();
        let (_feed, _rx) = open(&mut state, "0xabc");

        let frame = state.outgoing(Command::Release { key: 1 }).unwrap();
        let v: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v["method"], "eth_unsubscribe");
        assert_eq!(v["params"][0], "0xabc");
        assert_eq!(state.open_feeds(), 0);

        assert!(state.outgoing(Command::Release { key: 1 }).is_none());
        let ack = json!({"jsonrpc": "2.0", "id": request_id(&frame), "result": true}).to_string();
        assert!(state.incoming(&ack).is_none());
    }

    #[test]
    fn late_subscription_is_torn_down() {
        let mut state = State::default();
        let (sender, _feed) = live_feed(ReleaseHandle::noop());
        let (reply, rx) = oneshot::channel();
        let frame = state
            .outgoing(Command::Subscribe {
                key: 9,
                criteria: criteria(),
                feed: sender,
                reply,
            })
            .unwrap();
        drop(rx);

        let response = json!({"jsonrpc": "2.0", "id": request_id(&frame), "result": "0xlate"}).to_string();
        let follow_up = state.incoming(&response).unwrap();
        assert!(follow_up.contains("eth_unsubscribe"));
        assert_eq!(state.open_feeds(), 0);
    }

    #[test]
    fn subscribe_error_reaches_caller() {
        let mut state = State::default();
        let (sender, _feed) = live_feed(ReleaseHandle::noop());
        let (reply, mut rx) = oneshot::channel();
        let frame = state
            .outgoing(Command::Subscribe {
                key: 1,
                criteria: criteria(),
                feed: sender,
                reply,
            })
            .unwrap();
        let response = json!({
            "jsonrpc": "2.0",
            "id": request_id(&frame),
            "error": {"code": -32601, "message": "notifications not supported"}
        })
        .to_string();
        state.incoming(&response);
        assert!(matches!(
            rx.try_recv().unwrap(),
            Err(SourceError::Rpc { code: -32601, .. })
        ));
        assert_eq!(state.open_feeds(), 0);
    }

    #[test]
    fn disconnect_fails_feeds_and_requests() {
        let mut state = State::default();
        let (mut feed, _rx) = open(&mut state, "0xabc");

        let (reply, mut call_rx) = oneshot::channel();
        state.outgoing(Command::Call {
            method: "eth_blockNumber",
            params: json!([]),
            reply,
        });

        state.disconnect(SourceError::Transport("reset".into()));
        assert_eq!(
            feed.errors.try_recv().unwrap(),
            SourceError::Transport("reset".into())
        );
        assert!(feed.logs.try_recv().is_err());
        assert!(matches!(call_rx.try_recv().unwrap(), Err(SourceError::Transport(_))));
        assert_eq!(state.open_feeds(), 0);
    }

    #[test]
    fn malformed_notification_fails_feed() {
        let mut state = State::default();
        let (mut feed, _rx) = open(&mut state, "0xabc");
        let bad = json!({
            "jsonrpc": "2.0",
            "method": "eth_subscription",
            "params": {"subscription": "0xabc", "result": {"address": "nope"}}
        })
        .to_string();
        let follow_up = state.incoming(&bad).unwrap();
        assert!(follow_up.contains("eth_unsubscribe"));
        assert!(matches!(
            feed.errors.try_recv().unwrap(),
            SourceError::InvalidResponse(_)
        ));
    }

    #[test]
    fn call_response_matched_by_id() {
        let mut state = State::default();
        let (a_tx, mut a_rx) = oneshot::channel();
        let (b_tx, mut b_rx) = oneshot::channel();
        let a = state
            .outgoing(Command::Call { method: "eth_blockNumber", params: json!([]), reply: a_tx })
            .unwrap();
        let b = state
            .outgoing(Command::Call { method: "eth_chainId", params: json!([]), reply: b_tx })
            .unwrap();
        assert_ne!(request_id(&a), request_id(&b));

        state.incoming(&json!({"jsonrpc": "2.0", "id": request_id(&b), "result": "0x1"}).to_string());
        assert_eq!(b_rx.try_recv().unwrap().unwrap(), json!("0x1"));
        assert!(a_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejects_non_ws_url() {
        let err = WsLogSource::connect(WsConfig::new("http://localhost:8545"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Transport(msg) if msg.contains("scheme")));
    }
}
