use crate::{
    AuthToken, CommentId, CommentRecord, Error, MentionId, MentionView, MessageId, MessageView,
    PostId, ReplyView, UnreadCount, VoteState,
};

/// Operation tags shared by outgoing commands and inbound messages. A widget
/// subscribed to the shared stream owns a subset of these and must ignore
/// the rest.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum UserOperation {
    CreatePostLike,
    CreateCommentLike,
    CreateComment,
    EditComment,
    DeleteComment,
    CreatePrivateMessage,
    MarkReplyAsRead,
    MarkMentionAsRead,
    MarkMessageAsRead,
    MarkAllAsRead,
    GetReplies,
    GetMentions,
    GetMessages,
    GetUnreadCount,
    GetReportCount,
    GetApplicationCount,
}

/// An outgoing command. Fire-and-forget: the caller gets no handle back, the
/// response (if any) arrives later on the shared stream, matched by item id.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum ClientCommand {
    CreatePostLike { post_id: PostId, score: i8 },
    CreateCommentLike { comment_id: CommentId, score: i8 },
    CreateComment { comment: CommentRecord },
    EditComment { comment_id: CommentId, content: String },
    DeleteComment { comment_id: CommentId },
    MarkReplyAsRead { comment_id: CommentId },
    MarkMentionAsRead { mention_id: MentionId },
    MarkMessageAsRead { message_id: MessageId },
    MarkAllAsRead,
    GetReplies,
    GetMentions,
    GetMessages,
    GetUnreadCount,
    GetReportCount,
    GetApplicationCount,
}

impl ClientCommand {
    pub fn operation(&self) -> UserOperation {
        match self {
            ClientCommand::CreatePostLike { .. } => UserOperation::CreatePostLike,
            ClientCommand::CreateCommentLike { .. } => UserOperation::CreateCommentLike,
            ClientCommand::CreateComment { .. } => UserOperation::CreateComment,
            ClientCommand::EditComment { .. } => UserOperation::EditComment,
            ClientCommand::DeleteComment { .. } => UserOperation::DeleteComment,
            ClientCommand::MarkReplyAsRead { .. } => UserOperation::MarkReplyAsRead,
            ClientCommand::MarkMentionAsRead { .. } => UserOperation::MarkMentionAsRead,
            ClientCommand::MarkMessageAsRead { .. } => UserOperation::MarkMessageAsRead,
            ClientCommand::MarkAllAsRead => UserOperation::MarkAllAsRead,
            ClientCommand::GetReplies => UserOperation::GetReplies,
            ClientCommand::GetMentions => UserOperation::GetMentions,
            ClientCommand::GetMessages => UserOperation::GetMessages,
            ClientCommand::GetUnreadCount => UserOperation::GetUnreadCount,
            ClientCommand::GetReportCount => UserOperation::GetReportCount,
            ClientCommand::GetApplicationCount => UserOperation::GetApplicationCount,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self {
            ClientCommand::CreatePostLike { score, .. }
            | ClientCommand::CreateCommentLike { score, .. } => match score {
                -1..=1 => Ok(()),
                _ => Err(Error::Unknown(format!("invalid vote score {score}"))),
            },
            ClientCommand::CreateComment { comment } => comment.validate(),
            ClientCommand::EditComment { content, .. } => crate::validate_content(content),
            _ => Ok(()),
        }
    }
}

/// A command as it travels over the transport, with the session's auth token
/// attached.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommandEnvelope {
    pub auth: Option<AuthToken>,
    pub command: ClientCommand,
}

/// A tagged server-to-client message.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum TaggedMessage {
    PostLikeConfirmed { post_id: PostId, votes: VoteState },
    CommentLikeConfirmed { comment_id: CommentId, votes: VoteState },
    CommentCreated(CommentRecord),
    CommentEdited { comment_id: CommentId, content: String },
    CommentDeleted { comment_id: CommentId },
    NewReply(ReplyView),
    NewMention(MentionView),
    NewMessage(MessageView),
    ReplyMarkedRead { comment_id: CommentId },
    MentionMarkedRead { mention_id: MentionId },
    MessageMarkedRead { message_id: MessageId },
    AllMarkedRead,
    Replies(Vec<ReplyView>),
    Mentions(Vec<MentionView>),
    Messages(Vec<MessageView>),
    UnreadCounts(UnreadCount),
    ReportCount(u64),
    ApplicationCount(u64),
}

impl TaggedMessage {
    /// The operation this message confirms or announces.
    pub fn operation(&self) -> UserOperation {
        match self {
            TaggedMessage::PostLikeConfirmed { .. } => UserOperation::CreatePostLike,
            TaggedMessage::CommentLikeConfirmed { .. } => UserOperation::CreateCommentLike,
            TaggedMessage::CommentCreated(_)
            | TaggedMessage::NewReply(_)
            | TaggedMessage::NewMention(_) => UserOperation::CreateComment,
            TaggedMessage::CommentEdited { .. } => UserOperation::EditComment,
            TaggedMessage::CommentDeleted { .. } => UserOperation::DeleteComment,
            TaggedMessage::NewMessage(_) => UserOperation::CreatePrivateMessage,
            TaggedMessage::ReplyMarkedRead { .. } => UserOperation::MarkReplyAsRead,
            TaggedMessage::MentionMarkedRead { .. } => UserOperation::MarkMentionAsRead,
            TaggedMessage::MessageMarkedRead { .. } => UserOperation::MarkMessageAsRead,
            TaggedMessage::AllMarkedRead => UserOperation::MarkAllAsRead,
            TaggedMessage::Replies(_) => UserOperation::GetReplies,
            TaggedMessage::Mentions(_) => UserOperation::GetMentions,
            TaggedMessage::Messages(_) => UserOperation::GetMessages,
            TaggedMessage::UnreadCounts(_) => UserOperation::GetUnreadCount,
            TaggedMessage::ReportCount(_) => UserOperation::GetReportCount,
            TaggedMessage::ApplicationCount(_) => UserOperation::GetApplicationCount,
        }
    }
}

/// What a subscriber receives from the dispatcher, in exact receipt order.
/// `Reconnect` is synthetic: the dispatcher emits it when the connection
/// comes back after a drop, before any new server message.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Inbound {
    Message(TaggedMessage),
    Error(Error),
    Reconnect,
}
