use agora_client::api::{ClientCommand, Inbound, TaggedMessage, UnreadCount};
use agora_mock_server::MockServer;

use crate::harness::{
    connect_session, connect_user, create_and_login, mention_to, message_to, person, reply_to,
};

#[tokio::test(start_paused = true)]
async fn bootstrap_populates_inbox_and_counters() {
    let server = MockServer::new();
    let alice = person(1, "alice", false);
    let alice_id = alice.id;
    let token = create_and_login(&server, &alice);

    // Activity that happened before this device connected.
    server.deliver_reply(alice_id, reply_to(alice_id, 10, 1));
    server.deliver_reply(alice_id, reply_to(alice_id, 11, 2));
    server.deliver_mention(alice_id, mention_to(alice_id, 12, 3));
    server.deliver_message(alice_id, message_to(alice_id, 13, 4));

    let mut client = connect_session(&server, alice, token).await;
    client.session.bootstrap();
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::Messages(_))))
        .await;

    assert_eq!(client.session.inbox.len(), 4);
    assert_eq!(client.session.counters.inbox.get(), 4);
    assert!(client.session.counters.inbox.is_authoritative());
}

#[tokio::test(start_paused = true)]
async fn live_reply_then_read_confirmation() {
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
    assert_eq!(client.session.counters.inbox.get(), 1);

    client.dispatcher.send(ClientCommand::MarkReplyAsRead { comment_id });
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::ReplyMarkedRead { .. })))
        .await;
    assert_eq!(client.session.counters.inbox.get(), 0);

    // The server agrees.
    client.dispatcher.send(ClientCommand::GetUnreadCount);
    let counts = client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::UnreadCounts(_))))
        .await;
    assert_eq!(
        counts,
        Inbound::Message(TaggedMessage::UnreadCounts(UnreadCount {
            replies: 0,
            mentions: 0,
            messages: 0,
        }))
    );
}

#[tokio::test(start_paused = true)]
async fn mark_all_read_is_optimistic_and_server_confirms() {
    let server = MockServer::new();
    let alice = person(1, "alice", false);
    let alice_id = alice.id;
    let mut client = connect_user(&server, alice).await;

    client.server.deliver_reply(alice_id, reply_to(alice_id, 10, 1));
    client.server.deliver_reply(alice_id, reply_to(alice_id, 11, 2));
    client.server.deliver_message(alice_id, message_to(alice_id, 12, 3));
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::NewMessage(_))))
        .await;
    assert_eq!(client.session.counters.inbox.get(), 3);

    client.session.mark_all_read();
    // Counter zeroes immediately, before the confirmation arrives.
    assert_eq!(client.session.counters.inbox.get(), 0);
    assert_eq!(client.session.inbox.unread_count().total(), 0);

    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::AllMarkedRead)))
        .await;
    client.dispatcher.send(ClientCommand::GetUnreadCount);
    client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::UnreadCounts(_))))
        .await;
    assert_eq!(client.session.counters.inbox.get(), 0);
    assert!(client.session.counters.inbox.is_authoritative());
}

#[tokio::test(start_paused = true)]
async fn not_authenticated_forces_logout() {
    let server = MockServer::new();
    let mut client = connect_user(&server, person(1, "alice", false)).await;

    client.server.unauth(client.token).unwrap();
    client.dispatcher.send(ClientCommand::GetUnreadCount);
    client
        .pump_until(|msg| matches!(msg, Inbound::Error(_)))
        .await;
    assert!(client.session.is_logged_out());
}

#[tokio::test(start_paused = true)]
async fn every_subscriber_sees_the_same_order() {
    let server = MockServer::new();
    let alice = person(1, "alice", false);
    let alice_id = alice.id;
    let mut client = connect_user(&server, alice).await;
    let mut second = client.dispatcher.subscribe();

    client.server.deliver_reply(alice_id, reply_to(alice_id, 10, 1));
    client.server.deliver_message(alice_id, message_to(alice_id, 11, 2));

    let first_order = vec![client.pump_one().await, client.pump_one().await];
    let second_order = vec![
        second.recv().await.unwrap(),
        second.recv().await.unwrap(),
    ];
    assert_eq!(first_order, second_order);
    assert!(matches!(
        first_order[0],
        Inbound::Message(TaggedMessage::NewReply(_))
    ));
}
