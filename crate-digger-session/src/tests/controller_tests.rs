use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::time::Instant;

use super::*;
use crate::error::TransportError;

/// Transport fake that records every call with the (paused) clock time.
#[derive(Default)]
struct RecordingTransport {
    next_surface: AtomicU64,
    fail_edits: AtomicBool,
    sent: Mutex<Vec<(SurfaceId, View)>>,
    edits: Mutex<Vec<(Instant, SurfaceId, View)>>,
    notices: Mutex<Vec<(SurfaceId, ActorId, String)>>,
}

impl RecordingTransport {
    fn edits(&self) -> Vec<(Instant, SurfaceId, View)> {
        self.edits.lock().unwrap().clone()
    }

    fn notices(&self) -> Vec<(SurfaceId, ActorId, String)> {
        self.notices.lock().unwrap().clone()
    }

    /// The view currently shown on `surface`.
    fn current_view(&self, surface: SurfaceId) -> View {
        let edited = self
            .edits
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(_, s, _)| *s == surface)
            .map(|(_, _, v)| v.clone());
        edited.unwrap_or_else(|| {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .find(|(s, _)| *s == surface)
                .map(|(_, v)| v.clone())
                .expect("surface was never sent")
        })
    }
}

impl Transport for RecordingTransport {
    async fn send_view(&self, _reply_to: SurfaceId, view: &View) -> Result<SurfaceId, TransportError> {
        let surface = SurfaceId(100 + self.next_surface.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push((surface, view.clone()));
        Ok(surface)
    }

    async fn edit_view(&self, surface: SurfaceId, view: &View) -> Result<(), TransportError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected("message deleted".into()));
        }
        self.edits.lock().unwrap().push((Instant::now(), surface, view.clone()));
        Ok(())
    }

    async fn notify(&self, surface: SurfaceId, actor: &ActorId, text: &str) -> Result<(), TransportError> {
        self.notices
            .lock()
            .unwrap()
            .push((surface, actor.clone(), text.to_string()));
        Ok(())
    }
}

type Controller = SessionController<String, RecordingTransport>;
type Terminations = Arc<Mutex<Vec<Termination<String>>>>;

const TTL: Duration = Duration::from_secs(60);
const REQUEST: SurfaceId = SurfaceId(1);

fn controller() -> Controller {
    SessionController::new(
        Arc::new(SessionStore::new()),
        Arc::new(RecordingTransport::default()),
        10,
    )
}

fn alice() -> ActorId {
    ActorId::new("alice")
}

fn bob() -> ActorId {
    ActorId::new("bob")
}

fn items(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Item {i}")).collect()
}

fn act(actor: ActorId, kind: ActionKind) -> Action {
    Action::new(actor, kind)
}

/// A request whose callback records each termination and returns `note`.
fn recorded(
    kind: SessionKind,
    items: Vec<String>,
    presentation: Presentation,
    note: Option<&str>,
) -> (SessionRequest<String>, Terminations) {
    let log: Terminations = Arc::default();
    let sink = Arc::clone(&log);
    let note = note.map(String::from);
    let request = SessionRequest::new(kind, items, alice(), TTL)
        .presentation(presentation)
        .on_terminal(move |t| async move {
            sink.lock().unwrap().push(t);
            note
        });
    (request, log)
}

async fn state(c: &Controller, surface: SurfaceId) -> SessionState {
    c.store().get(surface).expect("session should be live").state().await
}

// -- Paginated list --

#[tokio::test(start_paused = true)]
async fn test_paginated_next_clamps_at_last_page() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL)
        .presentation(Presentation::new("The Collection"));
    let surface = c.start(REQUEST, request).await.unwrap();
    assert_eq!(c.transport().current_view(surface).title, "The Collection (Page 1/3)");

    c.handle_action(surface, act(alice(), ActionKind::Next)).await.unwrap();
    assert_eq!(state(&c, surface).await, SessionState::Page(1));

    c.handle_action(surface, act(alice(), ActionKind::Next)).await.unwrap();
    assert_eq!(state(&c, surface).await, SessionState::Page(2));

    c.handle_action(surface, act(alice(), ActionKind::Next)).await.unwrap();
    assert_eq!(state(&c, surface).await, SessionState::Page(2));

    let view = c.transport().current_view(surface);
    assert_eq!(view.title, "The Collection (Page 3/3)");
    assert!(!view.button(ActionKind::Next).unwrap().enabled);
    assert!(view.button(ActionKind::Prev).unwrap().enabled);
}

#[tokio::test(start_paused = true)]
async fn test_prev_at_first_page_is_noop() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();

    c.handle_action(surface, act(alice(), ActionKind::Prev)).await.unwrap();
    assert_eq!(state(&c, surface).await, SessionState::Page(0));
    assert!(!c.transport().current_view(surface).button(ActionKind::Prev).unwrap().enabled);
}

#[tokio::test(start_paused = true)]
async fn test_list_rejects_select() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(5), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();

    let err = c
        .handle_action(surface, act(alice(), ActionKind::Select(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::UnsupportedAction(ActionKind::Select(0))));
    assert!(err.is_actor_facing());
    assert_eq!(state(&c, surface).await, SessionState::Page(0));
}

// -- Authorization --

#[tokio::test(start_paused = true)]
async fn test_non_owner_cannot_act() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();

    let err = c.handle_action(surface, act(bob(), ActionKind::Next)).await.unwrap_err();
    assert!(matches!(err, SessionError::Unauthorized { ref actor } if *actor == bob()));

    assert_eq!(state(&c, surface).await, SessionState::Page(0));
    assert!(c.transport().edits().is_empty());
    let notices = c.transport().notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, surface);
    assert_eq!(notices[0].1, bob());
}

#[tokio::test(start_paused = true)]
async fn test_non_owner_cannot_select() {
    let c = controller();
    let (request, log) = recorded(SessionKind::SingleChoice, items(3), Presentation::new("Pick"), None);
    let surface = c.start(REQUEST, request).await.unwrap();

    let err = c
        .handle_action(surface, act(bob(), ActionKind::Select(0)))
        .await
        .unwrap_err();
    assert!(err.is_actor_facing());
    assert_eq!(state(&c, surface).await, SessionState::Pending);
    assert!(log.lock().unwrap().is_empty());
}

// -- Single choice --

#[tokio::test(start_paused = true)]
async fn test_single_choice_select_invokes_callback_once() {
    let c = controller();
    let (request, log) = recorded(
        SessionKind::SingleChoice,
        items(3),
        Presentation::new("Which one?").with_prompt("Several records match."),
        Some("Play logged"),
    );
    let surface = c.start(REQUEST, request).await.unwrap();
    assert_eq!(c.transport().current_view(surface).select_menu().unwrap().options.len(), 3);

    c.handle_action(surface, act(alice(), ActionKind::Select(2))).await.unwrap();

    assert!(c.store().get(surface).is_none());
    {
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].reason, TerminalReason::Selected);
        assert_eq!(log[0].item.as_deref(), Some("Item 3"));
        assert_eq!(log[0].owner, alice());
    }

    let view = c.transport().current_view(surface);
    assert_eq!(view.body, "Play logged");
    assert!(view.components.is_empty());

    let err = c
        .handle_action(surface, act(alice(), ActionKind::Select(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotFound(s) if s == surface));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_select_is_rejected() {
    let c = controller();
    let (request, log) = recorded(SessionKind::SingleChoice, items(3), Presentation::new("Pick"), None);
    let surface = c.start(REQUEST, request).await.unwrap();

    let err = c
        .handle_action(surface, act(alice(), ActionKind::Select(3)))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidSelection { index: 3, len: 3 }));

    assert_eq!(state(&c, surface).await, SessionState::Pending);
    assert!(log.lock().unwrap().is_empty());
    let notices = c.transport().notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].1, alice());
    assert!(c.transport().edits().is_empty());

    // Still usable afterwards.
    c.handle_action(surface, act(alice(), ActionKind::Select(0))).await.unwrap();
    assert_eq!(log.lock().unwrap()[0].item.as_deref(), Some("Item 1"));
}

// -- Reroll pick --

#[tokio::test(start_paused = true)]
async fn test_reroll_with_one_item_is_stable() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::RerollPick, items(1), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();

    c.handle_action(surface, act(alice(), ActionKind::Reroll)).await.unwrap();
    assert_eq!(state(&c, surface).await, SessionState::Current(0));
    assert_eq!(c.transport().current_view(surface).body, "Item 1");
}

#[tokio::test(start_paused = true)]
async fn test_reroll_always_changes_pick() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::RerollPick, items(2), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();

    let mut previous = state(&c, surface).await;
    for _ in 0..10 {
        c.handle_action(surface, act(alice(), ActionKind::Reroll)).await.unwrap();
        let current = state(&c, surface).await;
        assert_ne!(current, previous);
        previous = current;
    }
}

#[tokio::test(start_paused = true)]
async fn test_reroll_with_identical_keys_keeps_pick() {
    let c = controller();
    let request = SessionRequest::new(
        SessionKind::RerollPick,
        vec!["Same".to_string(), "Same".to_string()],
        alice(),
        TTL,
    );
    let surface = c.start(REQUEST, request).await.unwrap();
    let before = state(&c, surface).await;

    c.handle_action(surface, act(alice(), ActionKind::Reroll)).await.unwrap();
    assert_eq!(state(&c, surface).await, before);
}

#[tokio::test(start_paused = true)]
async fn test_commit_requires_commit_control() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::RerollPick, items(3), alice(), TTL)
        .presentation(Presentation::new("Random Store"));
    let surface = c.start(REQUEST, request).await.unwrap();

    let err = c.handle_action(surface, act(alice(), ActionKind::Commit)).await.unwrap_err();
    assert!(matches!(err, SessionError::UnsupportedAction(ActionKind::Commit)));
    assert!(c.store().get(surface).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_commit_ends_session_with_current_item() {
    let c = controller();
    let (request, log) = recorded(
        SessionKind::RerollPick,
        items(4),
        Presentation::new("Random Pick").with_commit("Play"),
        Some("Play logged"),
    );
    let surface = c.start(REQUEST, request).await.unwrap();
    let SessionState::Current(current) = state(&c, surface).await else {
        panic!("reroll session should start on an item");
    };

    c.handle_action(surface, act(alice(), ActionKind::Commit)).await.unwrap();

    let log = log.lock().unwrap().clone();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].reason, TerminalReason::Committed);
    assert_eq!(log[0].item, Some(format!("Item {}", current + 1)));

    let view = c.transport().current_view(surface);
    assert_eq!(view.body, format!("Item {}\n\nPlay logged", current + 1));
    assert!(view.components.is_empty());
    assert!(c.store().is_empty());
}

// -- Timeout and stop --

#[tokio::test(start_paused = true)]
async fn test_timeout_renders_disabled_view_after_ttl() {
    let c = controller();
    let (request, log) = recorded(SessionKind::PaginatedList, items(25), Presentation::new("The Collection"), None);
    let started = Instant::now();
    let surface = c.start(REQUEST, request).await.unwrap();

    tokio::time::sleep(TTL - Duration::from_secs(1)).await;
    assert!(c.transport().edits().is_empty());
    assert!(c.store().get(surface).is_some());

    tokio::time::sleep(Duration::from_secs(2)).await;
    let edits = c.transport().edits();
    assert_eq!(edits.len(), 1);
    let (at, edited, view) = &edits[0];
    assert_eq!(*edited, surface);
    assert!(*at - started >= TTL);
    assert_eq!(view.title, "The Collection (Page 1/3)");
    assert_eq!(view.components.len(), 2);
    assert!(!view.is_interactive());

    assert!(c.store().get(surface).is_none());
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].reason, TerminalReason::TimedOut);
    assert_eq!(log[0].item, None);
}

#[tokio::test(start_paused = true)]
async fn test_activity_does_not_extend_deadline() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL);
    let started = Instant::now();
    let surface = c.start(REQUEST, request).await.unwrap();

    tokio::time::sleep(Duration::from_secs(50)).await;
    c.handle_action(surface, act(alice(), ActionKind::Next)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(c.store().get(surface).is_none());
    let (at, _, view) = c.transport().edits().last().cloned().unwrap();
    assert!(at - started < TTL + Duration::from_secs(1));
    assert!(view.title.ends_with("(Page 2/3)"));
    assert!(!view.is_interactive());
}

#[tokio::test(start_paused = true)]
async fn test_commit_cancels_timeout() {
    let c = controller();
    let (request, log) = recorded(
        SessionKind::RerollPick,
        items(3),
        Presentation::new("Random Pick").with_commit("Play"),
        None,
    );
    let surface = c.start(REQUEST, request).await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    c.handle_action(surface, act(alice(), ActionKind::Commit)).await.unwrap();
    tokio::time::sleep(TTL * 2).await;

    assert_eq!(c.transport().edits().len(), 1);
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].reason, TerminalReason::Committed);
}

#[tokio::test(start_paused = true)]
async fn test_stop_closes_session() {
    let c = controller();
    let (request, log) = recorded(SessionKind::PaginatedList, items(25), Presentation::new("Want List"), None);
    let surface = c.start(REQUEST, request).await.unwrap();

    assert!(c.stop(surface).await);
    assert!(c.store().is_empty());
    assert!(!c.transport().current_view(surface).is_interactive());
    assert_eq!(log.lock().unwrap()[0].reason, TerminalReason::Stopped);

    assert!(!c.stop(surface).await);
    let err = c.handle_action(surface, act(alice(), ActionKind::Next)).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)));

    // The cancelled timer never fires.
    tokio::time::sleep(TTL * 2).await;
    assert_eq!(c.transport().edits().len(), 1);
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_closed_resolves_after_final_view() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::SingleChoice, items(2), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();
    let session = c.store().get(surface).unwrap();

    c.handle_action(surface, act(alice(), ActionKind::Select(1))).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), session.closed())
        .await
        .expect("session should be closed");
    assert_eq!(session.terminal_reason().await, Some(TerminalReason::Selected));
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_timeout_runs_slow_callback_to_completion() {
    let c = controller();
    let finished: Terminations = Arc::default();
    let sink = Arc::clone(&finished);
    let request = SessionRequest::new(SessionKind::SingleChoice, items(2), alice(), Duration::ZERO)
        .on_terminal(move |t| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            sink.lock().unwrap().push(t);
            Some("Too slow".to_string())
        });
    let surface = c.start(REQUEST, request).await.unwrap();
    let session = c.store().get(surface).unwrap();

    tokio::time::timeout(Duration::from_secs(1), session.closed())
        .await
        .expect("session should time out");
    assert!(c.store().is_empty());
    assert!(!c.transport().current_view(surface).is_interactive());
    let finished = finished.lock().unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].reason, TerminalReason::TimedOut);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_zero_ttl_sessions_always_close() {
    let c = controller();
    let count = Arc::new(AtomicU64::new(0));
    for _ in 0..100 {
        let seen = Arc::clone(&count);
        let request = SessionRequest::new(SessionKind::PaginatedList, items(3), alice(), Duration::ZERO)
            .on_terminal(move |_| async move {
                seen.fetch_add(1, Ordering::SeqCst);
                None
            });
        c.start(REQUEST, request).await.unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while count.load(Ordering::SeqCst) < 100 || !c.store().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("every session should time out");
    assert_eq!(count.load(Ordering::SeqCst), 100);
}

// -- Concurrency --

#[tokio::test(start_paused = true)]
async fn test_concurrent_actions_serialize() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();

    let (a, b) = tokio::join!(
        c.handle_action(surface, act(alice(), ActionKind::Next)),
        c.handle_action(surface, act(alice(), ActionKind::Next)),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(state(&c, surface).await, SessionState::Page(2));
    assert!(c.transport().current_view(surface).title.ends_with("(Page 3/3)"));
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_independent() {
    let c = controller();
    let first = c
        .start(REQUEST, SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL))
        .await
        .unwrap();
    let second = c
        .start(REQUEST, SessionRequest::new(SessionKind::PaginatedList, items(25), bob(), TTL))
        .await
        .unwrap();
    assert_ne!(first, second);

    c.handle_action(first, act(alice(), ActionKind::Next)).await.unwrap();
    assert_eq!(state(&c, first).await, SessionState::Page(1));
    assert_eq!(state(&c, second).await, SessionState::Page(0));
    assert_eq!(c.store().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_run_applies_stream_in_order() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();

    let inbound = |actor: ActorId, kind: ActionKind| InboundAction {
        surface,
        action: Action::new(actor, kind),
    };
    let actions = futures::stream::iter(vec![
        inbound(alice(), ActionKind::Next),
        inbound(bob(), ActionKind::Next),
        inbound(alice(), ActionKind::Next),
        inbound(alice(), ActionKind::Prev),
    ]);
    c.run(actions).await;

    assert_eq!(state(&c, surface).await, SessionState::Page(1));
    assert_eq!(c.transport().notices().len(), 1);
}

// -- Failures --

#[tokio::test(start_paused = true)]
async fn test_empty_items_are_rejected() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::SingleChoice, Vec::new(), alice(), TTL);

    let err = c.start(REQUEST, request).await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyItems));
    assert!(c.transport().sent.lock().unwrap().is_empty());
    assert!(c.store().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_edit_does_not_block_transition() {
    let c = controller();
    let request = SessionRequest::new(SessionKind::PaginatedList, items(25), alice(), TTL);
    let surface = c.start(REQUEST, request).await.unwrap();
    c.transport().fail_edits.store(true, Ordering::SeqCst);

    c.handle_action(surface, act(alice(), ActionKind::Next)).await.unwrap();
    assert_eq!(state(&c, surface).await, SessionState::Page(1));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_surface_is_not_found() {
    let c = controller();
    let err = c
        .handle_action(SurfaceId(999), act(alice(), ActionKind::Next))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotFound(SurfaceId(999))));
    assert!(c.transport().notices().is_empty());
}
