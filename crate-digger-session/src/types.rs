use std::fmt;

use futures::future::BoxFuture;

/// Identity of one outbound message a session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a chat user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Page through the items with prev/next.
    PaginatedList,
    /// Pick exactly one item from a menu.
    SingleChoice,
    /// Show one random item; reroll it or commit to it.
    RerollPick,
}

/// Per-kind session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Zero-based page of a paginated list.
    Page(usize),
    /// Single choice waiting for a selection.
    Pending,
    /// Index of the item currently shown by a reroll pick.
    Current(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Prev,
    Next,
    /// Zero-based index into the session items.
    Select(usize),
    Reroll,
    Commit,
}

impl ActionKind {
    /// Component id used in rendered views.
    pub fn component_id(&self) -> &'static str {
        match self {
            ActionKind::Prev => "prev",
            ActionKind::Next => "next",
            ActionKind::Select(_) => "select",
            ActionKind::Reroll => "reroll",
            ActionKind::Commit => "commit",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Select(index) => write!(f, "select {}", index + 1),
            other => f.write_str(other.component_id()),
        }
    }
}

/// One button press or menu pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub actor: ActorId,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(actor: ActorId, kind: ActionKind) -> Self {
        Self { actor, kind }
    }
}

/// An action addressed to a surface, as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundAction {
    pub surface: SurfaceId,
    pub action: Action,
}

/// Text a session is rendered with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presentation {
    pub title: String,
    /// Shown above a selection menu.
    pub prompt: String,
    /// Label of the commit button of a reroll pick. No commit control is
    /// rendered, and commit actions are refused, when this is `None`.
    pub commit_label: Option<String>,
}

impl Presentation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_commit(mut self, label: impl Into<String>) -> Self {
        self.commit_label = Some(label.into());
        self
    }
}

/// Why a session stopped accepting actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    Selected,
    Committed,
    Stopped,
    TimedOut,
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminalReason::Selected => "selected",
            TerminalReason::Committed => "committed",
            TerminalReason::Stopped => "stopped",
            TerminalReason::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}

/// Handed to the completion callback once a session ends.
#[derive(Debug, Clone)]
pub struct Termination<T> {
    pub surface: SurfaceId,
    pub owner: ActorId,
    pub reason: TerminalReason,
    /// The selected or committed item. `None` for stop and timeout.
    pub item: Option<T>,
}

/// Completion callback. Runs exactly once per session, whatever the reason;
/// the returned note is shown in place of the controls after a selection or
/// commit.
pub type OnTerminal<T> = Box<dyn FnOnce(Termination<T>) -> BoxFuture<'static, Option<String>> + Send>;
