//! Interactive sessions bound to one outbound message.
//!
//! A [`SessionController`] renders a paginated list, a single-choice menu or
//! a reroll pick through an abstract [`Transport`], accepts actions from the
//! session owner only, and closes the session on completion, explicit stop
//! or timeout. Live sessions are tracked in a [`SessionStore`] keyed by the
//! surface they were rendered on.

pub mod controller;
pub mod error;
pub mod item;
pub mod store;
pub mod transport;
pub mod types;
pub mod view;

pub use controller::{SessionController, SessionRequest};
pub use error::{SessionError, TransportError};
pub use item::SessionItem;
pub use store::{Session, SessionStore};
pub use transport::Transport;
pub use types::{
    Action, ActionKind, ActorId, InboundAction, OnTerminal, Presentation, SessionKind,
    SessionState, SurfaceId, TerminalReason, Termination,
};
pub use view::{Button, Component, SelectMenu, SelectOption, View};
