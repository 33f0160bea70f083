//! Terminal front end for interactive sessions.
//!
//! Views are printed to stdout as they change and actions are read line by
//! line from stdin. A line may start with `@handle` to act as someone else,
//! which is how non-owner rejections can be tried locally.

use std::sync::atomic::{AtomicU64, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate_digger_session::{
    Action, ActionKind, ActorId, Component, InboundAction, SessionController, SessionItem,
    SurfaceId, Transport, TransportError, View,
};

use crate::error::CliError;

/// Surface of the command invocation itself; sessions reply to it.
pub(crate) const COMMAND_SURFACE: SurfaceId = SurfaceId(0);

pub(crate) struct TerminalTransport {
    next_surface: AtomicU64,
}

impl TerminalTransport {
    pub(crate) fn new() -> Self {
        Self {
            next_surface: AtomicU64::new(COMMAND_SURFACE.0 + 1),
        }
    }
}

impl Transport for TerminalTransport {
    async fn send_view(&self, reply_to: SurfaceId, view: &View) -> Result<SurfaceId, TransportError> {
        let surface = SurfaceId(self.next_surface.fetch_add(1, Ordering::Relaxed));
        log::debug!("Rendering {} in reply to {}", surface, reply_to);
        println!("{}", render(surface, view));
        Ok(surface)
    }

    async fn edit_view(&self, surface: SurfaceId, view: &View) -> Result<(), TransportError> {
        if surface.0 >= self.next_surface.load(Ordering::Relaxed) {
            return Err(TransportError::UnknownSurface(surface));
        }
        println!("{}", render(surface, view));
        Ok(())
    }

    async fn notify(&self, surface: SurfaceId, actor: &ActorId, text: &str) -> Result<(), TransportError> {
        println!(
            "  {} {}",
            format!("[{surface}, only visible to @{actor}]").if_supports_color(Stdout, |t| t.dimmed()),
            text.if_supports_color(Stdout, |t| t.yellow()),
        );
        Ok(())
    }
}

/// Plain-text rendering of a view.
pub(crate) fn render(surface: SurfaceId, view: &View) -> String {
    let mut out = format!(
        "\n{} {}\n",
        format!("[{surface}]").if_supports_color(Stdout, |t| t.dimmed()),
        view.title.if_supports_color(Stdout, |t| t.bold()),
    );
    if !view.body.is_empty() {
        out.push_str(&view.body);
        out.push('\n');
    }

    for component in &view.components {
        match component {
            Component::Button(button) if button.enabled => {
                out.push_str(&format!("  [{}]", button.label));
            }
            Component::Button(button) => {
                out.push_str(&format!("  ({})", button.label));
            }
            Component::Select(menu) => {
                if !menu.enabled {
                    out.push_str(&format!("  ({})", menu.placeholder));
                    continue;
                }
                out.push_str(&format!("  {}:\n", menu.placeholder));
                for option in &menu.options {
                    out.push_str(&format!("    {}) {}\n", option.index + 1, option.label));
                }
            }
        }
    }
    if view.is_interactive() {
        out.push_str(&format!(
            "\n  {}",
            "next/prev, a number, reroll, play, or stop".if_supports_color(Stdout, |t| t.dimmed())
        ));
    }
    out
}

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Act(Action),
    Stop(ActorId),
}

/// Parse a line typed by `default_actor`. Returns a usage hint on failure.
pub(crate) fn parse_input(line: &str, default_actor: &ActorId) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(mut word) = words.next() else {
        return Ok(None);
    };

    let mut actor = default_actor.clone();
    if let Some(handle) = word.strip_prefix('@') {
        if handle.is_empty() {
            return Err("Expected a handle after '@'".to_string());
        }
        actor = ActorId::new(handle);
        word = words.next().ok_or("Expected an action after the handle")?;
    }
    if let Some(extra) = words.next() {
        return Err(format!("Unexpected input '{extra}'"));
    }

    let kind = match word.to_lowercase().as_str() {
        "n" | "next" => ActionKind::Next,
        "p" | "prev" | "previous" => ActionKind::Prev,
        "r" | "reroll" => ActionKind::Reroll,
        "play" | "commit" => ActionKind::Commit,
        "q" | "stop" => return Ok(Some(Input::Stop(actor))),
        other => match other.parse::<usize>() {
            Ok(0) => return Err("Choices start at 1".to_string()),
            Ok(n) => ActionKind::Select(n - 1),
            Err(_) => return Err(format!("Unknown action '{word}'")),
        },
    };
    Ok(Some(Input::Act(Action::new(actor, kind))))
}

/// Feed stdin to the session on `surface` until it closes. End of input
/// stops the session.
pub(crate) async fn drive<T: SessionItem>(
    controller: &SessionController<T, TerminalTransport>,
    surface: SurfaceId,
    requester: &ActorId,
) -> Result<(), CliError> {
    let Some(session) = controller.store().get(surface) else {
        return Ok(());
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = session.closed() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    controller.stop(surface).await;
                    break;
                };
                match parse_input(&line, requester) {
                    Ok(None) => {}
                    Ok(Some(Input::Act(action))) => {
                        controller.dispatch(InboundAction { surface, action }).await;
                    }
                    Ok(Some(Input::Stop(actor))) if actor == *session.owner() => {
                        controller.stop(surface).await;
                    }
                    Ok(Some(Input::Stop(actor))) => {
                        let notice = controller
                            .transport()
                            .notify(surface, &actor, "Only the session owner can stop it.")
                            .await;
                        if let Err(e) = notice {
                            log::warn!("Failed to notify {}: {}", actor, e);
                        }
                    }
                    Err(hint) => eprintln!("  {}", hint.if_supports_color(Stdout, |t| t.red())),
                }
            }
        }
    }

    session.closed().await;
    Ok(())
}
