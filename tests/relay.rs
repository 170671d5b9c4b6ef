use chat_relay::conversation;
use chat_relay::history::{ MemoryMessageStore, MessageStore };
use chat_relay::models::chat::{ PullRequest, SendRequest };
use chat_relay::service::Relay;
use std::sync::atomic::{ AtomicI64, Ordering };
use std::sync::Arc;

/// Relay whose clock advances one second per send.
fn ticking_relay(store: Arc<MemoryMessageStore>) -> Relay {
    let now = Arc::new(AtomicI64::new(1_700_000_000));
    Relay::with_clock(store, Arc::new(move || now.fetch_add(1, Ordering::SeqCst)))
}

fn send(chat: &str, sender: &str, text: &str) -> SendRequest {
    SendRequest {
        chat: chat.to_string(),
        sender: sender.to_string(),
        text: text.to_string(),
    }
}

fn pull(chat: &str, cursor: i64, limit: i32, reverse: bool) -> PullRequest {
    PullRequest {
        chat: chat.to_string(),
        cursor,
        limit,
        reverse,
    }
}

#[tokio::test]
async fn send_succeeds_and_lands_under_canonical_key() {
    let store = Arc::new(MemoryMessageStore::new());
    let relay = ticking_relay(store.clone());

    let resp = relay.send(send("alice:bob", "alice", "hi")).await;
    assert_eq!(resp.code, 0);
    assert_eq!(resp.message, "Success: Sent message alice:bob");

    assert_eq!(conversation::derive("alice:bob").unwrap(), "alice:bob");
    assert_eq!(store.fetch_all("alice:bob").await.unwrap().len(), 1);
}

#[tokio::test]
async fn both_directions_share_history() {
    let store = Arc::new(MemoryMessageStore::new());
    let relay = ticking_relay(store.clone());

    assert_eq!(relay.send(send("alice:bob", "alice", "hi bob")).await.code, 0);
    assert_eq!(relay.send(send("Bob:Alice", "Bob", "hi alice")).await.code, 0);

    let resp = relay.pull(pull("bob:alice", 0, 10, false)).await;
    assert_eq!(resp.code, 0);
    let texts: Vec<&str> = resp.messages
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts, vec!["hi bob", "hi alice"]);
    assert!(resp.messages.iter().all(|m| m.chat == "bob:alice"));
}

#[tokio::test]
async fn stranger_is_rejected_without_side_effect() {
    let store = Arc::new(MemoryMessageStore::new());
    let relay = ticking_relay(store.clone());

    let resp = relay.send(send("alice:bob", "carol", "hi")).await;
    assert_eq!(resp.code, 3);
    assert!(resp.message.contains("carol"));
    assert!(store.fetch_all("alice:bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn fifteen_messages_page_as_ten_then_five() {
    let store = Arc::new(MemoryMessageStore::new());
    let relay = ticking_relay(store);
    for i in 0..15 {
        let sender = if i % 2 == 0 { "alice" } else { "bob" };
        assert_eq!(relay.send(send("alice:bob", sender, &format!("msg {}", i))).await.code, 0);
    }

    let first = relay.pull(pull("alice:bob", 0, 10, false)).await;
    assert_eq!(first.code, 0);
    assert_eq!(first.messages.len(), 10);
    assert!(first.has_more);
    assert_eq!(first.next_cursor, 10);

    let second = relay.pull(pull("alice:bob", first.next_cursor, 10, false)).await;
    assert_eq!(second.messages.len(), 5);
    assert!(!second.has_more);
    assert_eq!(second.next_cursor, 20);
    assert_eq!(second.messages[4].text, "msg 14");

    let newest = relay.pull(pull("alice:bob", 0, 3, true)).await;
    let texts: Vec<&str> = newest.messages
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts, vec!["msg 14", "msg 13", "msg 12"]);
    assert!(newest.has_more);
}

#[tokio::test]
async fn empty_chat_pulls_nothing() {
    let relay = ticking_relay(Arc::new(MemoryMessageStore::new()));
    let resp = relay.pull(pull("nobody:here", 0, 0, false)).await;
    assert_eq!(resp.code, 0);
    assert!(resp.messages.is_empty());
    assert!(!resp.has_more);
    assert_eq!(resp.next_cursor, 10);
}

#[tokio::test]
async fn pull_errors_carry_codes() {
    let relay = ticking_relay(Arc::new(MemoryMessageStore::new()));
    assert_eq!(relay.send(send("alice:bob", "alice", "hi")).await.code, 0);

    let missing = relay.pull(pull("", 0, 10, false)).await;
    assert_eq!(missing.code, 4);

    let malformed = relay.pull(pull("alice", 0, 10, false)).await;
    assert_eq!(malformed.code, 1);

    let past_end = relay.pull(pull("alice:bob", 5, 10, false)).await;
    assert_eq!(past_end.code, 5);
    assert!(past_end.messages.is_empty());
    assert!(!past_end.has_more);
}

#[tokio::test]
async fn same_second_sends_overwrite() {
    let store = Arc::new(MemoryMessageStore::new());
    let relay = Relay::with_clock(store.clone(), Arc::new(|| 42));

    assert_eq!(relay.send(send("alice:bob", "alice", "first")).await.code, 0);
    assert_eq!(relay.send(send("alice:bob", "bob", "second")).await.code, 0);

    let resp = relay.pull(pull("alice:bob", 0, 10, false)).await;
    assert_eq!(resp.messages.len(), 1);
    assert_eq!(resp.messages[0].text, "second");
    assert_eq!(resp.messages[0].send_time, 42);
}
