//! Delivery semantics tests for the wormhole core
//!
//! Two wormholes over one shared store and one signal hub stand in for
//! two processes sharing a container directory and a notification
//! center.

use crate::signal::api::LocalSignalHub;
use crate::storage::api::{MemoryStore, MessageStore};
use crate::wormhole::api::{Wormhole, WormholeError};
use std::sync::{Arc, Mutex};

/// Batches a listener received, in invocation order
type Received = Arc<Mutex<Vec<Vec<Vec<u8>>>>>;

fn recorder() -> (Received, impl FnMut(Vec<Vec<u8>>) + Send + 'static) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    (received, move |batch| sink.lock().unwrap().push(batch))
}

fn single_process() -> Wormhole {
    let hub = LocalSignalHub::new();
    Wormhole::new(Arc::new(MemoryStore::new()), Box::new(hub.endpoint()))
}

fn two_processes() -> (Wormhole, Wormhole) {
    let hub = LocalSignalHub::new();
    let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
    let a = Wormhole::new(Arc::clone(&store), Box::new(hub.endpoint()));
    let b = Wormhole::new(store, Box::new(hub.endpoint()));
    (a, b)
}

#[test]
fn test_replay_on_listen_delivers_one_ordered_batch() {
    let wormhole = single_process();

    wormhole.send("a", b"x").unwrap();
    wormhole.send("a", b"y").unwrap();

    let (received, callback) = recorder();
    wormhole.listen("a", callback);

    let batches = received.lock().unwrap();
    assert_eq!(batches.len(), 1, "Replay must arrive as a single batch");
    assert_eq!(batches[0], vec![b"x".to_vec(), b"y".to_vec()]);
    drop(batches);

    assert_eq!(wormhole.queued_count("a"), 0);
}

#[test]
fn test_live_delivery_after_listen() {
    let (sender, receiver) = two_processes();

    let (received, callback) = recorder();
    receiver.listen("a", callback);

    sender.send("a", b"x").unwrap();

    let batches = received.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec![b"x".to_vec()]);
    drop(batches);

    assert_eq!(receiver.queued_count("a"), 0);
}

#[test]
fn test_ordering_across_many_sends() {
    let (sender, receiver) = two_processes();

    for i in 0..10u32 {
        sender.send("a", &i.to_be_bytes()).unwrap();
    }

    let (received, callback) = recorder();
    receiver.listen("a", callback);

    let batches = received.lock().unwrap();
    let flat: Vec<Vec<u8>> = batches.iter().flatten().cloned().collect();
    let expected: Vec<Vec<u8>> = (0..10u32).map(|i| i.to_be_bytes().to_vec()).collect();
    assert_eq!(flat, expected);
}

#[test]
fn test_no_loss_or_duplication_under_listener_replacement() {
    let wormhole = single_process();

    wormhole.send("a", b"x").unwrap();

    let (first, callback) = recorder();
    wormhole.listen("a", callback);
    let (second, callback) = recorder();
    wormhole.listen("a", callback);

    let first_count: usize = first.lock().unwrap().iter().flatten().count();
    let second_count: usize = second.lock().unwrap().iter().flatten().count();
    assert_eq!(
        first_count + second_count,
        1,
        "Exactly one listener receives the message, exactly once"
    );
}

#[test]
fn test_isolation_across_identifiers() {
    let (sender, receiver) = two_processes();

    sender.send("a", b"x").unwrap();
    sender.send("b", b"y").unwrap();

    let (received, callback) = recorder();
    receiver.listen("b", callback);

    let batches = received.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec![b"y".to_vec()]);
    drop(batches);

    // "a" still queued, untouched.
    assert_eq!(receiver.queued_count("a"), 1);
}

#[test]
fn test_clear_messages_prevents_delivery() {
    let wormhole = single_process();

    wormhole.send("a", b"x").unwrap();
    wormhole.clear_messages("a");

    let (received, callback) = recorder();
    wormhole.listen("a", callback);

    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn test_stop_listening_is_idempotent() {
    let wormhole = single_process();

    wormhole.stop_listening("never-listened");

    let (_, callback) = recorder();
    wormhole.listen("a", callback);
    wormhole.stop_listening("a");
    wormhole.stop_listening("a");

    assert!(!wormhole.is_listening("a"));
}

#[test]
fn test_messages_queue_while_stopped_and_replay_on_relisten() {
    let (sender, receiver) = two_processes();

    let (first, callback) = recorder();
    receiver.listen("a", callback);
    receiver.stop_listening("a");

    sender.send("a", b"x").unwrap();
    sender.send("a", b"y").unwrap();

    assert!(first.lock().unwrap().is_empty());
    assert_eq!(receiver.queued_count("a"), 2);

    let (second, callback) = recorder();
    receiver.listen("a", callback);

    let batches = second.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec![b"x".to_vec(), b"y".to_vec()]);
}

#[test]
fn test_signals_without_listener_leave_queue_intact() {
    let (sender, receiver) = two_processes();

    // Nobody listens; the broadcast is dropped but the queue survives.
    sender.send("a", b"x").unwrap();

    assert_eq!(receiver.messages("a"), vec![b"x".to_vec()]);
}

#[test]
fn test_messages_is_a_non_destructive_peek() {
    let wormhole = single_process();

    wormhole.send("a", b"x").unwrap();
    wormhole.send("a", b"y").unwrap();

    assert_eq!(wormhole.messages("a"), vec![b"x".to_vec(), b"y".to_vec()]);
    assert_eq!(wormhole.messages("a"), vec![b"x".to_vec(), b"y".to_vec()]);
    assert_eq!(wormhole.queued_count("a"), 2);
}

#[test]
fn test_next_message_polls_oldest_first() {
    let wormhole = single_process();

    wormhole.send("a", b"x").unwrap();
    wormhole.send("a", b"y").unwrap();

    assert_eq!(wormhole.next_message("a").unwrap(), b"x");
    assert_eq!(wormhole.next_message("a").unwrap(), b"y");
    assert!(wormhole.next_message("a").is_none());
}

#[test]
fn test_send_rejects_invalid_identifier() {
    let wormhole = single_process();

    match wormhole.send("bad/id", b"x") {
        Err(WormholeError::InvalidIdentifier { .. }) => {}
        other => panic!("Expected InvalidIdentifier, got {:?}", other),
    }
    match wormhole.send("", b"x") {
        Err(WormholeError::InvalidIdentifier { .. }) => {}
        other => panic!("Expected InvalidIdentifier, got {:?}", other),
    }
}

#[test]
fn test_listener_may_send_reentrantly() {
    let hub = LocalSignalHub::new();
    let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
    let wormhole = Arc::new(Wormhole::new(
        Arc::clone(&store),
        Box::new(hub.endpoint()),
    ));

    let (replies, callback) = recorder();
    wormhole.listen("reply", callback);

    // The "request" listener answers on another identifier from inside
    // its own callback.
    let responder = Arc::clone(&wormhole);
    wormhole.listen("request", move |batch| {
        for payload in batch {
            let mut answer = b"ack:".to_vec();
            answer.extend_from_slice(&payload);
            responder.send("reply", &answer).unwrap();
        }
    });

    wormhole.send("request", b"ping").unwrap();

    let batches = replies.lock().unwrap();
    let flat: Vec<Vec<u8>> = batches.iter().flatten().cloned().collect();
    assert_eq!(flat, vec![b"ack:ping".to_vec()]);
}

#[test]
fn test_listener_sending_to_its_own_identifier_does_not_deadlock() {
    let hub = LocalSignalHub::new();
    let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
    let wormhole = Arc::new(Wormhole::new(store, Box::new(hub.endpoint())));

    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let echoer = Arc::clone(&wormhole);
    wormhole.listen("echo", move |batch| {
        // Echo exactly once, or the channel would ring forever.
        if batch.contains(&b"start".to_vec()) {
            echoer.send("echo", b"again").unwrap();
        }
        sink.lock().unwrap().push(batch);
    });

    wormhole.send("echo", b"start").unwrap();

    let batches = received.lock().unwrap();
    let flat: Vec<Vec<u8>> = batches.iter().flatten().cloned().collect();
    assert_eq!(flat, vec![b"start".to_vec(), b"again".to_vec()]);
}

#[test]
fn test_coalesced_signals_still_deliver_everything() {
    // A transport that drops every broadcast models maximal coalescing
    // plus loss; a later listen must still recover every message.
    struct MuteTransport;
    impl crate::signal::api::SignalTransport for MuteTransport {
        fn broadcast(&self, _name: &str) -> crate::signal::api::SignalResult<()> {
            Ok(())
        }
        fn subscribe(&self, _name: &str, _callback: crate::signal::api::SignalCallback) {}
        fn unsubscribe(&self, _name: &str) {}
    }

    let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
    let sender = Wormhole::new(Arc::clone(&store), Box::new(MuteTransport));
    let receiver = Wormhole::new(store, Box::new(MuteTransport));

    sender.send("a", b"one").unwrap();
    sender.send("a", b"two").unwrap();
    sender.send("a", b"three").unwrap();

    let (received, callback) = recorder();
    receiver.listen("a", callback);

    let batches = received.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0],
        vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
    );
}
