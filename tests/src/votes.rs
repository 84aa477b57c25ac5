use agora_client::{
    api::{ClientCommand, Inbound, PostId, TaggedMessage, VoteState},
    VoteCell,
};
use agora_mock_server::MockServer;

use crate::harness::{connect_user, person};

#[tokio::test(start_paused = true)]
async fn vote_round_trip_settles_the_cell() {
    let server = MockServer::new();
    let mut client = connect_user(&server, person(1, "alice", false)).await;
    let post_id = PostId::stub();
    let mut cell = VoteCell::new(VoteState::default());

    let requested = cell.click_upvote();
    assert_eq!(requested, 1);
    assert!(cell.in_flight());
    client
        .dispatcher
        .send(ClientCommand::CreatePostLike { post_id, score: requested });

    let confirmed = client
        .pump_until(|msg| matches!(msg, Inbound::Message(TaggedMessage::PostLikeConfirmed { .. })))
        .await;
    let votes = match confirmed {
        Inbound::Message(TaggedMessage::PostLikeConfirmed { votes, .. }) => votes,
        other => panic!("unexpected message {other:?}"),
    };
    cell.confirm(votes);

    assert!(!cell.in_flight());
    assert_eq!(
        cell.current(),
        VoteState {
            score: 1,
            upvotes: 1,
            downvotes: 0,
            my_vote: 1,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn rapid_opposite_votes_settle_on_the_last_request() {
    let server = MockServer::new();
    let mut client = connect_user(&server, person(1, "alice", false)).await;
    let post_id = PostId::stub();
    let mut cell = VoteCell::new(VoteState::default());

    let up = cell.click_upvote();
    client
        .dispatcher
        .send(ClientCommand::CreatePostLike { post_id, score: up });
    let down = cell.click_downvote();
    client
        .dispatcher
        .send(ClientCommand::CreatePostLike { post_id, score: down });

    // Both confirmations land; the later one wins wholesale.
    for _ in 0..2 {
        let confirmed = client
            .pump_until(|msg| {
                matches!(msg, Inbound::Message(TaggedMessage::PostLikeConfirmed { .. }))
            })
            .await;
        if let Inbound::Message(TaggedMessage::PostLikeConfirmed { votes, .. }) = confirmed {
            cell.confirm(votes);
        }
    }

    assert_eq!(
        cell.current(),
        VoteState {
            score: -1,
            upvotes: 0,
            downvotes: 1,
            my_vote: -1,
        }
    );
}
