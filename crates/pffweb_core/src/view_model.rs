use crate::{Message, MessageBody, SearchFailure};

/// Everything a renderer needs to draw the results area.
///
/// `load_more` is only present when the rendered result set can be extended,
/// so the affordance is always attached to the markup it belongs to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchViewModel {
    pub input: String,
    pub term: Option<String>,
    pub messages: Vec<Message>,
    pub total_matches: usize,
    pub loading: bool,
    pub load_more: Option<LoadMore>,
    pub error: Option<ErrorView>,
    pub opened: Option<OpenedMessageView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMore {
    pub next_offset: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub message: String,
    pub can_retry: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessageView {
    pub id: String,
    /// `None` while the body is being located.
    pub body: Option<Result<MessageBody, SearchFailure>>,
}
