//! The per-session state machine.
//!
//! Actions on one session are serialized by its cell lock. The lock covers
//! the state transition and view computation only; transport calls and
//! completion callbacks run after it is released. Views carry a revision
//! number so a slow edit can never overwrite a newer one.

use std::future::Future;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use rand::seq::SliceRandom;
use tokio::sync::MutexGuard;
use tokio::time::Duration;

use crate::error::SessionError;
use crate::item::SessionItem;
use crate::store::{Session, SessionCell, SessionStore, initial_state};
use crate::transport::Transport;
use crate::types::{
    Action, ActionKind, ActorId, InboundAction, OnTerminal, Presentation, SessionKind,
    SessionState, SurfaceId, TerminalReason, Termination,
};
use crate::view::{Layout, View, page_count};

const NOT_OWNER: &str = "You can't control this session.";

/// Everything needed to open a session.
pub struct SessionRequest<T> {
    pub kind: SessionKind,
    pub items: Vec<T>,
    pub owner: ActorId,
    pub ttl: Duration,
    pub presentation: Presentation,
    pub on_terminal: Option<OnTerminal<T>>,
}

impl<T: SessionItem> SessionRequest<T> {
    pub fn new(kind: SessionKind, items: Vec<T>, owner: ActorId, ttl: Duration) -> Self {
        Self {
            kind,
            items,
            owner,
            ttl,
            presentation: Presentation::default(),
            on_terminal: None,
        }
    }

    pub fn presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    /// Run `f` once when the session ends.
    pub fn on_terminal<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce(Termination<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        self.on_terminal = Some(Box::new(move |t| Box::pin(f(t))));
        self
    }
}

/// Result of applying one action to a session's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Update(SessionState),
    Finish(TerminalReason, Option<usize>),
}

pub struct SessionController<T, X> {
    store: Arc<SessionStore<T>>,
    transport: Arc<X>,
    page_size: usize,
}

impl<T, X> Clone for SessionController<T, X> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            transport: Arc::clone(&self.transport),
            page_size: self.page_size,
        }
    }
}

impl<T: SessionItem, X: Transport> SessionController<T, X> {
    pub fn new(store: Arc<SessionStore<T>>, transport: Arc<X>, page_size: usize) -> Self {
        Self {
            store,
            transport,
            page_size: page_size.max(1),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore<T>> {
        &self.store
    }

    pub fn transport(&self) -> &Arc<X> {
        &self.transport
    }

    /// Render a new session in reply to `reply_to` and register it.
    ///
    /// The session times out `ttl` after it is registered. Activity does not
    /// extend the deadline.
    pub async fn start(&self, reply_to: SurfaceId, request: SessionRequest<T>) -> Result<SurfaceId, SessionError> {
        let SessionRequest {
            kind,
            items,
            owner,
            ttl,
            presentation,
            on_terminal,
        } = request;
        if items.is_empty() {
            return Err(SessionError::EmptyItems);
        }

        let items: Arc<[T]> = items.into();
        let state = initial_state(kind, items.len());
        let view = Layout {
            kind,
            presentation: &presentation,
            items: &items,
            page_size: self.page_size,
        }
        .active(state);
        let surface = self.transport.send_view(reply_to, &view).await?;

        let mut session = Session::new(surface, owner, kind, items, ttl, presentation, state);
        session.cell.get_mut().on_terminal = on_terminal;
        let session = self.store.insert(session).inspect_err(|e| log::error!("{e}"))?;
        log::info!(
            "Started {:?} session on {} for {} ({} item(s), {}s)",
            kind,
            surface,
            session.owner(),
            session.items().len(),
            ttl.as_secs()
        );

        // The timer is spawned under the cell lock, so it cannot expire the
        // session before its abort handle is stored.
        let mut cell = session.cell.lock().await;
        if cell.terminal.is_none() {
            let controller = self.clone();
            let timed = Arc::clone(&session);
            let timer = tokio::spawn(async move {
                tokio::time::sleep_until(timed.deadline()).await;
                controller.expire(&timed).await;
            });
            cell.timer = Some(timer.abort_handle());
        }
        Ok(surface)
    }

    /// Apply one action from `action.actor` to the session on `surface`.
    ///
    /// Rejections meant for the actor alone (not the owner, bad selection,
    /// action not offered) are sent as a notice and returned as errors that
    /// report [`SessionError::is_actor_facing`].
    pub async fn handle_action(&self, surface: SurfaceId, action: Action) -> Result<(), SessionError> {
        let session = self.store.get(surface).ok_or(SessionError::NotFound(surface))?;
        if action.actor != *session.owner() {
            self.notice(surface, &action.actor, NOT_OWNER).await;
            return Err(SessionError::Unauthorized { actor: action.actor });
        }

        let mut cell = session.cell.lock().await;
        if cell.terminal.is_some() || !self.store.is_live(surface, &session) {
            return Err(SessionError::NotFound(surface));
        }

        match self.advance(&session, cell.state, action.kind) {
            Err(err) => {
                drop(cell);
                self.notice(surface, &action.actor, &err.to_string()).await;
                Err(err)
            }
            Ok(Step::Update(state)) => {
                cell.state = state;
                cell.revision += 1;
                let revision = cell.revision;
                let view = self.layout(&session).active(state);
                drop(cell);

                log::debug!("Session {}: {} -> {:?}", surface, action.kind, state);
                self.publish(&session, revision, &view).await;
                Ok(())
            }
            Ok(Step::Finish(reason, chosen)) => {
                self.finish(&session, cell, reason, chosen).await;
                Ok(())
            }
        }
    }

    /// End the session on `surface` early. Returns `false` if there was no
    /// live session.
    pub async fn stop(&self, surface: SurfaceId) -> bool {
        let Some(session) = self.store.get(surface) else {
            return false;
        };
        let cell = session.cell.lock().await;
        if cell.terminal.is_some() || !self.store.is_live(surface, &session) {
            return false;
        }
        self.finish(&session, cell, TerminalReason::Stopped, None).await;
        true
    }

    /// Feed inbound actions to their sessions until the stream ends.
    ///
    /// Actions for different sessions run concurrently. Actions for one
    /// session are applied in arrival order.
    pub async fn run<S>(&self, actions: S)
    where
        S: Stream<Item = InboundAction>,
    {
        actions
            .for_each_concurrent(None, |inbound| self.dispatch(inbound))
            .await;
    }

    /// Handle one inbound action, logging instead of returning failures.
    pub async fn dispatch(&self, inbound: InboundAction) {
        let InboundAction { surface, action } = inbound;
        let kind = action.kind;
        match self.handle_action(surface, action).await {
            Ok(()) => {}
            Err(e) if e.is_actor_facing() => log::debug!("Rejected {} on {}: {}", kind, surface, e),
            Err(e) => log::warn!("Action {} on {} failed: {}", kind, surface, e),
        }
    }

    async fn expire(&self, session: &Arc<Session<T>>) {
        let cell = session.cell.lock().await;
        if cell.terminal.is_some() || !self.store.is_live(session.surface(), session) {
            return;
        }
        self.finish(session, cell, TerminalReason::TimedOut, None).await;
    }

    fn advance(&self, session: &Session<T>, state: SessionState, action: ActionKind) -> Result<Step, SessionError> {
        let len = session.items().len();
        let step = match (session.kind(), state, action) {
            (SessionKind::PaginatedList, SessionState::Page(page), ActionKind::Prev) => {
                Step::Update(SessionState::Page(page.saturating_sub(1)))
            }
            (SessionKind::PaginatedList, SessionState::Page(page), ActionKind::Next) => {
                let last = page_count(len, self.page_size) - 1;
                Step::Update(SessionState::Page((page + 1).min(last)))
            }
            (SessionKind::SingleChoice, _, ActionKind::Select(index)) => {
                if index >= len {
                    return Err(SessionError::InvalidSelection { index, len });
                }
                Step::Finish(TerminalReason::Selected, Some(index))
            }
            (SessionKind::RerollPick, SessionState::Current(current), ActionKind::Reroll) => {
                Step::Update(SessionState::Current(reroll(session.items(), current)))
            }
            (SessionKind::RerollPick, SessionState::Current(current), ActionKind::Commit)
                if session.presentation().commit_label.is_some() =>
            {
                Step::Finish(TerminalReason::Committed, Some(current))
            }
            (_, _, action) => return Err(SessionError::UnsupportedAction(action)),
        };
        Ok(step)
    }

    /// Mark the session terminal, run its callback, drop it from the store
    /// and publish the final view. Consumes the held cell lock.
    async fn finish(
        &self,
        session: &Arc<Session<T>>,
        mut cell: MutexGuard<'_, SessionCell<T>>,
        reason: TerminalReason,
        chosen: Option<usize>,
    ) {
        let surface = session.surface();
        cell.terminal = Some(reason);
        if let Some(timer) = cell.timer.take() {
            // The timer task itself calls finish on timeout.
            if reason != TerminalReason::TimedOut {
                timer.abort();
            }
        }
        let callback = cell.on_terminal.take();
        cell.revision += 1;
        let revision = cell.revision;
        let state = cell.state;
        drop(cell);

        let note = match callback {
            Some(callback) => {
                callback(Termination {
                    surface,
                    owner: session.owner().clone(),
                    reason,
                    item: chosen.and_then(|i| session.items().get(i).cloned()),
                })
                .await
            }
            None => None,
        };
        self.store.remove_if_same(surface, session);

        let view = self.layout(session).closed(state, reason, chosen, note);
        self.publish(session, revision, &view).await;
        session.mark_closed();
        log::info!("Session {} {}", surface, reason);
    }

    /// Hand `view` to the transport unless a newer revision got there first.
    async fn publish(&self, session: &Session<T>, revision: u64, view: &View) {
        let mut rendered = session.rendered.lock().await;
        if revision <= *rendered {
            log::debug!("Skipping stale view r{} for {}", revision, session.surface());
            return;
        }
        if let Err(e) = self.transport.edit_view(session.surface(), view).await {
            log::warn!("Failed to update session view {}: {}", session.surface(), e);
        }
        *rendered = revision;
    }

    async fn notice(&self, surface: SurfaceId, actor: &ActorId, text: &str) {
        if let Err(e) = self.transport.notify(surface, actor, text).await {
            log::warn!("Failed to notify {} on {}: {}", actor, surface, e);
        }
    }

    fn layout<'a>(&self, session: &'a Session<T>) -> Layout<'a, T> {
        Layout {
            kind: session.kind(),
            presentation: session.presentation(),
            items: session.items(),
            page_size: self.page_size,
        }
    }
}

/// Pick uniformly among the items whose key differs from the current one.
/// Stays put when there is no such item.
fn reroll<T: SessionItem>(items: &[T], current: usize) -> usize {
    let current_key = items.get(current).map(SessionItem::key);
    let choices: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| Some(item.key()) != current_key)
        .map(|(i, _)| i)
        .collect();
    choices.choose(&mut rand::thread_rng()).copied().unwrap_or(current)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
