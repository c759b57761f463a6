//! Integration tests for the streaming session manager.
//!
//! Every test drives a real `StreamManager` over the in-memory scripted
//! transport, so handshake, replay, routing and reconnect behaviour are
//! exercised end to end without a network.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use jockmkt::application::stream::{SessionState, StreamManager};
use jockmkt::domain::{League, Record, Subscription};
use jockmkt::error::Error;
use jockmkt::infrastructure::config::stream::{
    DecodeFailurePolicy, ReplayPolicy, StreamConfig, UnsubscribePolicy,
};
use jockmkt::port::{ErrorAction, FrameCallback, MessageSink};
use jockmkt::testkit::config::fast_stream;
use jockmkt::testkit::consumer::{RecordingErrorHandler, RecordingSink};
use jockmkt::testkit::frames;
use jockmkt::testkit::token::StaticToken;
use jockmkt::testkit::transport::{Script, ScriptedConnector, TransportHandle};

const TOKEN: &str = "tok_test";

struct Harness {
    manager: StreamManager,
    transport: TransportHandle,
    sink: Arc<RecordingSink>,
    errors: Arc<RecordingErrorHandler>,
}

fn start(
    config: StreamConfig,
    connector: ScriptedConnector,
    subscriptions: Vec<Subscription>,
) -> Harness {
    start_with(
        config,
        connector,
        subscriptions,
        RecordingErrorHandler::new(),
        StaticToken::new(TOKEN),
    )
}

fn start_with(
    config: StreamConfig,
    connector: ScriptedConnector,
    subscriptions: Vec<Subscription>,
    handler: RecordingErrorHandler,
    tokens: StaticToken,
) -> Harness {
    let transport = connector.handle();
    let sink = Arc::new(RecordingSink::new());
    let errors = Arc::new(handler);
    let manager = StreamManager::create(
        config,
        Arc::new(connector),
        Arc::new(tokens),
        Some(sink.clone() as Arc<dyn MessageSink>),
        errors.clone(),
        subscriptions,
        None,
    )
    .unwrap();
    Harness {
        manager,
        transport,
        sink,
        errors,
    }
}

async fn wait_state(manager: &StreamManager, expected: SessionState) {
    tokio::time::timeout(Duration::from_secs(2), manager.wait_for(|s| *s == expected))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {expected:?}, at {:?}", manager.state()))
        .unwrap();
}

fn auth_frame() -> Value {
    json!({"action": "authenticate", "authentication": {"type": "token", "token": TOKEN}})
}

fn subscribe_frame(topic: &str, event_id: Option<&str>, league: Option<&str>) -> Value {
    json!({
        "action": "subscribe",
        "subscription": {"type": topic, "event_id": event_id, "league": league}
    })
}

fn unsubscribe_frame(topic: &str, event_id: Option<&str>, league: Option<&str>) -> Value {
    json!({
        "action": "unsubscribe",
        "subscription": {"type": topic, "event_id": event_id, "league": league}
    })
}

#[tokio::test]
async fn handshake_authenticates_then_replays_in_registration_order() {
    let h = start(
        fast_stream(),
        ScriptedConnector::new(),
        vec![
            Subscription::account(),
            Subscription::games(League::Nba).unwrap(),
            Subscription::event("evt_1").unwrap(),
        ],
    );
    wait_state(&h.manager, SessionState::Connected).await;

    assert_eq!(
        h.transport.sent_json(0),
        vec![
            auth_frame(),
            subscribe_frame("account", None, None),
            subscribe_frame("games", None, Some("nba")),
            subscribe_frame("event", Some("evt_1"), None),
        ]
    );
}

#[tokio::test]
async fn subscribe_sends_exactly_one_frame_per_call() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.manager
        .subscribe(Subscription::games(League::Nfl).unwrap())
        .await
        .unwrap();
    h.manager
        .subscribe_topic("event_activity", Some("evt_7"), None)
        .await
        .unwrap();
    h.manager.subscribe(Subscription::notification()).await.unwrap();

    assert_eq!(
        h.transport.sent_json(0),
        vec![
            auth_frame(),
            subscribe_frame("games", None, Some("nfl")),
            subscribe_frame("event_activity", Some("evt_7"), None),
            subscribe_frame("notification", None, None),
        ]
    );
}

#[tokio::test]
async fn invalid_topic_fails_without_sending_or_recording() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    let err = h
        .manager
        .subscribe_topic("orderbook", None, None)
        .await
        .unwrap_err();
    match err {
        Error::InvalidTopic { topic, valid } => {
            assert_eq!(topic, "orderbook");
            assert!(valid.contains("notification"));
        }
        other => panic!("expected InvalidTopic, got {other:?}"),
    }

    let err = h.manager.subscribe_topic("games", None, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidSubscription { .. }));

    assert_eq!(h.transport.sent(0).len(), 1);
    assert!(h.manager.subscriptions().is_empty());
}

#[tokio::test]
async fn reconnect_replays_every_subscription_before_routing() {
    let h = start(
        fast_stream(),
        ScriptedConnector::new(),
        vec![Subscription::account()],
    );
    wait_state(&h.manager, SessionState::Connected).await;
    h.manager
        .subscribe(Subscription::event("evt_2").unwrap())
        .await
        .unwrap();

    h.transport.fail("connection reset");
    assert_eq!(h.transport.wait_for_connections(2).await, 2);
    let replayed = h.transport.wait_for_sent(1, 3).await;
    assert_eq!(
        replayed,
        vec![
            auth_frame(),
            subscribe_frame("account", None, None),
            subscribe_frame("event", Some("evt_2"), None),
        ]
    );
    assert!(h.transport.is_closed(0));

    h.transport.push_json(&frames::balance("usd", 42));
    let delivered = h.sink.wait_for(1).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(h.manager.balances().get("usd"), Some(&dec!(42)));
    assert!(h.errors.wait_for("Connection").await);
}

#[tokio::test]
async fn static_replay_sends_only_the_construction_list() {
    let config = StreamConfig {
        replay: ReplayPolicy::Static,
        ..fast_stream()
    };
    let h = start(config, ScriptedConnector::new(), vec![Subscription::account()]);
    wait_state(&h.manager, SessionState::Connected).await;
    h.manager.subscribe(Subscription::notification()).await.unwrap();

    h.transport.fail("reset");
    h.transport.wait_for_connections(2).await;
    h.transport.wait_for_sent(1, 2).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(
        h.transport.sent_json(1),
        vec![auth_frame(), subscribe_frame("account", None, None)]
    );
}

#[tokio::test]
async fn prune_policy_drops_unsubscribed_entries_from_replay() {
    let config = StreamConfig {
        unsubscribe: UnsubscribePolicy::Prune,
        ..fast_stream()
    };
    let h = start(
        config,
        ScriptedConnector::new(),
        vec![Subscription::account(), Subscription::notification()],
    );
    wait_state(&h.manager, SessionState::Connected).await;
    h.manager.unsubscribe(Subscription::account()).await.unwrap();
    assert_eq!(
        h.transport.sent_json(0).last(),
        Some(&unsubscribe_frame("account", None, None))
    );

    h.transport.fail("reset");
    h.transport.wait_for_connections(2).await;
    h.transport.wait_for_sent(1, 2).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(
        h.transport.sent_json(1),
        vec![auth_frame(), subscribe_frame("notification", None, None)]
    );
}

#[tokio::test]
async fn retain_policy_replays_unsubscribed_entries() {
    let h = start(
        fast_stream(),
        ScriptedConnector::new(),
        vec![Subscription::account(), Subscription::notification()],
    );
    wait_state(&h.manager, SessionState::Connected).await;
    h.manager.unsubscribe(Subscription::account()).await.unwrap();

    h.transport.fail("reset");
    h.transport.wait_for_connections(2).await;
    let replayed = h.transport.wait_for_sent(1, 3).await;
    assert_eq!(
        replayed,
        vec![
            auth_frame(),
            subscribe_frame("account", None, None),
            subscribe_frame("notification", None, None),
        ]
    );
}

#[tokio::test]
async fn unsubscribe_all_walks_the_registry_in_order() {
    let h = start(
        fast_stream(),
        ScriptedConnector::new(),
        vec![
            Subscription::account(),
            Subscription::games(League::Mlb).unwrap(),
        ],
    );
    wait_state(&h.manager, SessionState::Connected).await;
    h.manager.unsubscribe_all().await.unwrap();

    let sent = h.transport.sent_json(0);
    assert_eq!(
        sent[3..],
        [
            unsubscribe_frame("account", None, None),
            unsubscribe_frame("games", None, Some("mlb")),
        ]
    );
}

#[tokio::test]
async fn unsubscribe_all_under_prune_sends_one_frame_per_subscription() {
    let config = StreamConfig {
        unsubscribe: UnsubscribePolicy::Prune,
        ..fast_stream()
    };
    let h = start(
        config,
        ScriptedConnector::new(),
        vec![
            Subscription::account(),
            Subscription::notification(),
            Subscription::account(),
        ],
    );
    wait_state(&h.manager, SessionState::Connected).await;
    h.manager.unsubscribe_all().await.unwrap();

    let sent = h.transport.sent_json(0);
    assert_eq!(
        sent[4..],
        [
            unsubscribe_frame("account", None, None),
            unsubscribe_frame("notification", None, None),
        ]
    );
    assert!(h.manager.subscriptions().is_empty());
}

#[tokio::test]
async fn sustained_failure_stops_after_five_connection_attempts() {
    let h = start(
        fast_stream(),
        ScriptedConnector::with_fallback(Script::Refuse),
        vec![Subscription::account()],
    );
    wait_state(&h.manager, SessionState::Failed).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.transport.connect_calls(), 5);
    assert_eq!(h.manager.state(), SessionState::Failed);
    assert_eq!(h.errors.count("ReconnectExhausted"), 1);
    assert_eq!(h.errors.count("Connection("), 5);
}

#[tokio::test]
async fn explicit_reconnect_restarts_a_failed_session() {
    let connector = ScriptedConnector::with_fallback(Script::Accept).with_script([
        Script::Refuse,
        Script::Refuse,
        Script::Refuse,
        Script::Refuse,
        Script::Refuse,
    ]);
    let h = start(fast_stream(), connector, vec![Subscription::account()]);
    wait_state(&h.manager, SessionState::Failed).await;

    h.manager.reconnect().unwrap();
    wait_state(&h.manager, SessionState::Connected).await;
    assert_eq!(h.transport.connect_calls(), 6);
    assert_eq!(
        h.transport.sent_json(0),
        vec![auth_frame(), subscribe_frame("account", None, None)]
    );
}

#[tokio::test]
async fn rejected_authentication_closes_and_reconnects() {
    let connector = ScriptedConnector::new().with_script([Script::RejectAuth]);
    let h = start(fast_stream(), connector, vec![Subscription::account()]);
    wait_state(&h.manager, SessionState::Connected).await;

    assert_eq!(h.transport.connections(), 2);
    assert!(h.transport.is_closed(0));
    assert_eq!(h.transport.sent_json(0), vec![auth_frame()]);
    assert_eq!(h.errors.count("Authentication"), 1);
    assert_eq!(
        h.transport.sent_json(1),
        vec![auth_frame(), subscribe_frame("account", None, None)]
    );
}

#[tokio::test]
async fn missing_acknowledgment_times_out() {
    let connector = ScriptedConnector::new().with_script([Script::SilentAuth]);
    let h = start(fast_stream(), connector, vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    assert_eq!(h.errors.count("HandshakeTimeout"), 1);
    assert_eq!(h.transport.connections(), 2);
}

#[tokio::test]
async fn rejected_credentials_never_open_a_socket() {
    let h = start_with(
        fast_stream(),
        ScriptedConnector::new(),
        vec![],
        RecordingErrorHandler::new(),
        StaticToken::unauthorized(),
    );
    wait_state(&h.manager, SessionState::Failed).await;

    assert_eq!(h.transport.connect_calls(), 0);
    assert_eq!(h.errors.count("Unauthorized"), 5);
}

#[tokio::test]
async fn balance_frame_updates_table_and_reaches_sink() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.transport.push_json(&json!({"object": "balance", "balance": {"currency": "usd", "buying_power": 500}}));
    let delivered = h.sink.wait_for(1).await;

    assert_eq!(h.manager.balances().get("usd"), Some(&dec!(500)));
    match delivered[0].record() {
        Record::Balance(balance) => assert_eq!(balance.buying_power, Some(dec!(500))),
        other => panic!("expected balance, got {other:?}"),
    }
}

#[tokio::test]
async fn balances_survive_reconnects() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;
    h.transport.push_json(&frames::balance("usd", 10));
    h.sink.wait_for(1).await;

    h.transport.fail("reset");
    h.transport.wait_for_connections(2).await;
    h.transport.wait_for_sent(1, 1).await;
    wait_state(&h.manager, SessionState::Connected).await;
    h.transport.push_json(&frames::balance("ctk_abc", 3));
    h.sink.wait_for(2).await;

    let balances = h.manager.balances();
    assert_eq!(balances.get("usd"), Some(&dec!(10)));
    assert_eq!(balances.get("ctk_abc"), Some(&dec!(3)));
}

#[tokio::test]
async fn orders_split_by_limit_price() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.transport.push_json(&frames::own_order("ord_1"));
    h.transport.push_json(&frames::public_order("ord_2"));
    let delivered = h.sink.wait_for(2).await;

    assert!(matches!(delivered[0].record(), Record::Order(order) if order.id == "ord_1"));
    assert!(matches!(delivered[1].record(), Record::PublicOrder(order) if order.id == "ord_2"));
}

#[tokio::test]
async fn subscription_ack_passes_through_unchanged() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    let ack = frames::subscription_ack("account");
    h.transport.push_json(&ack);
    let delivered = h.sink.wait_for(1).await;

    assert_eq!(serde_json::to_value(&delivered[0]).unwrap(), ack);
}

#[tokio::test]
async fn unknown_tag_is_reported_and_later_frames_still_flow() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.transport.push_json(&frames::unknown("mystery"));
    h.transport.push_json(&frames::notification("hello"));
    let delivered = h.sink.wait_for(1).await;

    assert_eq!(delivered.len(), 1);
    assert!(matches!(delivered[0].record(), Record::Notification(_)));
    assert_eq!(h.errors.count("UnknownMessageType"), 1);
    assert_eq!(h.manager.state(), SessionState::Connected);
    assert_eq!(h.transport.connections(), 1);
}

#[tokio::test]
async fn terminate_policy_closes_without_reconnecting() {
    let config = StreamConfig {
        decode_failure: DecodeFailurePolicy::Terminate,
        ..fast_stream()
    };
    let h = start(config, ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.transport.push_json(&frames::unknown("mystery"));
    wait_state(&h.manager, SessionState::Closed).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(h.transport.is_closed(0));
    assert_eq!(h.transport.connect_calls(), 1);
    assert_eq!(h.errors.count("UnknownMessageType"), 1);
}

#[tokio::test]
async fn error_frame_goes_to_handler_and_connection_stays_open() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.transport.push_json(&frames::error("bad subscription"));
    h.transport.push_json(&frames::notification("still here"));
    h.sink.wait_for(1).await;

    assert_eq!(h.errors.count("Stream("), 1);
    assert_eq!(h.sink.len(), 1);
    assert_eq!(h.transport.connections(), 1);
}

#[tokio::test]
async fn handler_can_request_a_reconnect() {
    let h = start_with(
        fast_stream(),
        ScriptedConnector::new(),
        vec![Subscription::account()],
        RecordingErrorHandler::with_action(ErrorAction::Reconnect),
        StaticToken::new(TOKEN),
    );
    wait_state(&h.manager, SessionState::Connected).await;

    h.transport.push_json(&frames::error("server says reconnect"));
    assert_eq!(h.transport.wait_for_connections(2).await, 2);
    let replayed = h.transport.wait_for_sent(1, 2).await;
    assert_eq!(replayed[1], subscribe_frame("account", None, None));
}

#[tokio::test]
async fn clean_close_waits_for_explicit_reconnect() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![Subscription::account()]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.transport.close(Some("going away"));
    wait_state(&h.manager, SessionState::Closed).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.transport.connect_calls(), 1);
    assert!(h.errors.errors().is_empty());

    h.manager.reconnect().unwrap();
    h.transport.wait_for_connections(2).await;
    let replayed = h.transport.wait_for_sent(1, 2).await;
    assert_eq!(replayed[1], subscribe_frame("account", None, None));
}

#[tokio::test]
async fn send_without_connection_polls_then_fails() {
    let config = StreamConfig {
        send_retry_interval_ms: 10,
        send_max_retries: 3,
        ..fast_stream()
    };
    let h = start(config, ScriptedConnector::with_fallback(Script::Refuse), vec![]);

    let started = Instant::now();
    let err = h.manager.send(&json!({"action": "ping"})).await.unwrap_err();

    assert!(matches!(err, Error::NotConnected));
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[tokio::test]
async fn subscribe_before_handshake_is_sent_once_by_the_replay() {
    let config = StreamConfig {
        send_retry_interval_ms: 10,
        send_max_retries: 50,
        ..fast_stream()
    };
    let connector = ScriptedConnector::new().with_script([Script::Refuse, Script::Refuse]);
    let h = start(config, connector, vec![Subscription::account()]);

    h.manager.subscribe(Subscription::notification()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(
        h.transport.sent_json(0),
        vec![
            auth_frame(),
            subscribe_frame("account", None, None),
            subscribe_frame("notification", None, None),
        ]
    );
    assert_eq!(h.transport.connect_calls(), 3);
}

#[tokio::test]
async fn first_subscribe_during_startup_produces_one_frame() {
    let config = StreamConfig {
        send_retry_interval_ms: 10,
        send_max_retries: 50,
        ..fast_stream()
    };
    let connector = ScriptedConnector::new().with_script([Script::Refuse]);
    let h = start(config, connector, vec![]);

    h.manager.subscribe(Subscription::notification()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let sent = h.transport.sent_json(0);
    let notification = subscribe_frame("notification", None, None);
    assert_eq!(sent.iter().filter(|frame| **frame == notification).count(), 1);
    assert_eq!(sent, vec![auth_frame(), notification]);
}

#[tokio::test]
async fn static_replay_sends_startup_subscribe_after_the_handshake() {
    let config = StreamConfig {
        replay: ReplayPolicy::Static,
        send_retry_interval_ms: 10,
        send_max_retries: 50,
        ..fast_stream()
    };
    let connector = ScriptedConnector::new().with_script([Script::Refuse]);
    let h = start(config, connector, vec![Subscription::account()]);

    h.manager.subscribe(Subscription::notification()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(
        h.transport.sent_json(0),
        vec![
            auth_frame(),
            subscribe_frame("account", None, None),
            subscribe_frame("notification", None, None),
        ]
    );
}

#[tokio::test]
async fn reconnect_requested_while_connecting_keeps_the_new_connection() {
    let h = start(
        fast_stream(),
        ScriptedConnector::with_fallback(Script::SilentAuth),
        vec![Subscription::account()],
    );
    assert_eq!(h.transport.wait_for_connections(1).await, 1);
    assert_eq!(h.manager.state(), SessionState::Connecting);

    h.manager.reconnect().unwrap();
    h.transport.push(r#"{"status":"success"}"#);
    wait_state(&h.manager, SessionState::Connected).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(h.manager.state(), SessionState::Connected);
    assert_eq!(h.transport.connect_calls(), 1);
    assert!(!h.transport.is_closed(0));
}

#[tokio::test]
async fn callback_receives_raw_frame_text() {
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<String>();
    let callback: FrameCallback = Arc::new(move |raw| {
        let raw_tx = raw_tx.clone();
        async move {
            let _ = raw_tx.send(raw);
        }
        .boxed()
    });

    let connector = ScriptedConnector::new();
    let transport = connector.handle();
    let manager = StreamManager::create(
        fast_stream(),
        Arc::new(connector),
        Arc::new(StaticToken::new(TOKEN)),
        None,
        Arc::new(RecordingErrorHandler::new()),
        vec![],
        Some(callback),
    )
    .unwrap();
    wait_state(&manager, SessionState::Connected).await;

    let raw = r#"{"object":"notification","notification":{"title":"raw"}}"#;
    transport.push(raw);
    let received = tokio::time::timeout(Duration::from_secs(2), raw_rx.recv())
        .await
        .unwrap();
    assert_eq!(received.as_deref(), Some(raw));
}

#[tokio::test]
async fn cancel_closes_the_socket_and_stops_the_session() {
    let h = start(fast_stream(), ScriptedConnector::new(), vec![]);
    wait_state(&h.manager, SessionState::Connected).await;

    h.manager.cancel().await;
    h.manager.cancel().await;

    assert_eq!(h.manager.state(), SessionState::Cancelled);
    assert!(h.transport.is_closed(0));
    assert!(matches!(h.manager.reconnect(), Err(Error::SessionClosed)));

    h.transport.push_json(&frames::notification("late"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(h.sink.is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected_at_creation() {
    let config = StreamConfig {
        ws_url: "https://api.jockmkt.net/streaming/".into(),
        ..fast_stream()
    };
    let result = StreamManager::create(
        config,
        Arc::new(ScriptedConnector::new()),
        Arc::new(StaticToken::new(TOKEN)),
        None,
        Arc::new(RecordingErrorHandler::new()),
        vec![],
        None,
    );
    assert!(matches!(result, Err(Error::Config(_))));
}
