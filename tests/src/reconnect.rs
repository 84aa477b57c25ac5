use agora_client::{
    api::{ClientCommand, Inbound, TaggedMessage},
    ConnState,
};
use agora_mock_server::MockServer;

use crate::harness::{connect_user, person, reply_to, wait_for_state};

#[tokio::test(start_paused = true)]
async fn reconnect_marks_counters_stale_until_bootstrap_lands() {
    let server = MockServer::new();
    let alice = person(1, "alice", false);
    let alice_id = alice.id;
    let mut client = connect_user(&server, alice).await;

    client.server.deliver_reply(alice_id, reply_to(alice_id, 10, 1));
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::NewReply(_))))
        .await;
    client.dispatcher.send(ClientCommand::GetUnreadCount);
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::UnreadCounts(_))))
        .await;
    assert!(client.session.counters.inbox.is_authoritative());

    client.server.break_connections();
    client
        .pump_until(|msg| matches!(msg, Inbound::Reconnect))
        .await;
    // Stale, still displaying the last known value.
    assert!(!client.session.counters.inbox.is_authoritative());
    assert_eq!(client.session.counters.inbox.get(), 1);

    // The session re-issued its fetches on the reconnect event.
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::UnreadCounts(_))))
        .await;
    assert!(client.session.counters.inbox.is_authoritative());
    assert_eq!(client.session.counters.inbox.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn commands_while_disconnected_are_lost_not_queued() {
    let server = MockServer::new();
    let alice = person(1, "alice", false);
    let alice_id = alice.id;
    let mut client = connect_user(&server, alice).await;

    client.server.deliver_reply(alice_id, reply_to(alice_id, 10, 1));
    let delivered = client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::NewReply(_))))
        .await;
    let comment_id = match delivered {
        Inbound::Message(TaggedMessage::NewReply(reply)) => reply.comment.id,
        other => panic!("unexpected message {other:?}"),
    };

    client.server.break_connections();
    wait_for_state(&client.dispatcher, ConnState::Disconnected).await;
    client.dispatcher.send(ClientCommand::MarkReplyAsRead { comment_id });

    client
        .pump_until(|msg| matches!(msg, Inbound::Reconnect))
        .await;
    let counts = client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::UnreadCounts(_))))
        .await;
    // The mark never reached the server; the bootstrap shows the truth.
    assert!(matches!(
        counts,
        Inbound::Message(TaggedMessage::UnreadCounts(c)) if c.replies == 1
    ));
    assert_eq!(client.session.counters.inbox.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn live_delivery_resumes_after_reconnect() {
    let server = MockServer::new();
    let alice = person(1, "alice", false);
    let alice_id = alice.id;
    let mut client = connect_user(&server, alice).await;

    client.server.break_connections();
    client
        .pump_until(|msg| matches!(msg, Inbound::Reconnect))
        .await;

    client.server.deliver_reply(alice_id, reply_to(alice_id, 10, 1));
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::NewReply(_))))
        .await;
    assert_eq!(client.session.inbox.len(), 1);
    assert_eq!(client.session.inbox.unread_count().total(), 1);
}
