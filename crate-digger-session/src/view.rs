//! Transport-neutral view model and the session renderer.

use crate::item::SessionItem;
use crate::types::{ActionKind, Presentation, SessionKind, SessionState, TerminalReason};

/// Everything a transport needs to draw one session message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: String,
    pub body: String,
    pub components: Vec<Component>,
}

impl View {
    /// True when at least one control still accepts input.
    pub fn is_interactive(&self) -> bool {
        self.components.iter().any(Component::is_enabled)
    }

    pub fn button(&self, action: ActionKind) -> Option<&Button> {
        self.components.iter().find_map(|c| match c {
            Component::Button(b) if b.action == action => Some(b),
            _ => None,
        })
    }

    pub fn select_menu(&self) -> Option<&SelectMenu> {
        self.components.iter().find_map(|c| match c {
            Component::Select(menu) => Some(menu),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Button(Button),
    Select(SelectMenu),
}

impl Component {
    pub fn is_enabled(&self) -> bool {
        match self {
            Component::Button(b) => b.enabled,
            Component::Select(menu) => menu.enabled,
        }
    }

    fn disable(&mut self) {
        match self {
            Component::Button(b) => b.enabled = false,
            Component::Select(menu) => menu.enabled = false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub action: ActionKind,
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMenu {
    pub placeholder: String,
    pub options: Vec<SelectOption>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Zero-based item index sent back with [`ActionKind::Select`].
    pub index: usize,
    pub label: String,
}

const EMPTY_PAGE: &str = "No items found on this page.";

/// Number of pages needed for `len` items. Never zero.
pub(crate) fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Renders one session's frozen items.
pub(crate) struct Layout<'a, T> {
    pub kind: SessionKind,
    pub presentation: &'a Presentation,
    pub items: &'a [T],
    pub page_size: usize,
}

impl<T: SessionItem> Layout<'_, T> {
    /// The view of a session that still accepts actions.
    pub fn active(&self, state: SessionState) -> View {
        match (self.kind, state) {
            (SessionKind::PaginatedList, SessionState::Page(page)) => self.page(page),
            (SessionKind::RerollPick, SessionState::Current(index)) => self.pick(index),
            _ => self.menu(),
        }
    }

    /// The final view after a session ends.
    ///
    /// A selection or commit replaces the controls with the completion
    /// note. A stop or timeout keeps the last content with every control
    /// disabled.
    pub fn closed(
        &self,
        state: SessionState,
        reason: TerminalReason,
        chosen: Option<usize>,
        note: Option<String>,
    ) -> View {
        match reason {
            TerminalReason::Selected | TerminalReason::Committed => {
                let label = chosen.and_then(|i| self.items.get(i)).map(SessionItem::label);
                let body = match (reason, label, note) {
                    (TerminalReason::Committed, Some(label), Some(note)) => format!("{label}\n\n{note}"),
                    (_, _, Some(note)) => note,
                    (_, Some(label), None) => label,
                    (_, None, None) => String::new(),
                };
                View {
                    title: self.presentation.title.clone(),
                    body,
                    components: Vec::new(),
                }
            }
            TerminalReason::Stopped | TerminalReason::TimedOut => {
                let mut view = self.active(state);
                view.components.iter_mut().for_each(Component::disable);
                view
            }
        }
    }

    fn page(&self, page: usize) -> View {
        let size = self.page_size.max(1);
        let pages = page_count(self.items.len(), size);
        let start = page * size;

        let body = self
            .items
            .iter()
            .enumerate()
            .skip(start)
            .take(size)
            .map(|(i, item)| format!("{}. {}", i + 1, item.label()))
            .collect::<Vec<_>>()
            .join("\n");

        View {
            title: format!("{} (Page {}/{})", self.presentation.title, page + 1, pages),
            body: if body.is_empty() { EMPTY_PAGE.to_string() } else { body },
            components: vec![
                Component::Button(Button {
                    action: ActionKind::Prev,
                    label: "Previous".to_string(),
                    enabled: page > 0,
                }),
                Component::Button(Button {
                    action: ActionKind::Next,
                    label: "Next".to_string(),
                    enabled: page + 1 < pages,
                }),
            ],
        }
    }

    fn menu(&self) -> View {
        let options = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| SelectOption {
                index,
                label: item.label(),
            })
            .collect();

        View {
            title: self.presentation.title.clone(),
            body: self.presentation.prompt.clone(),
            components: vec![Component::Select(SelectMenu {
                placeholder: "Select an option".to_string(),
                options,
                enabled: true,
            })],
        }
    }

    fn pick(&self, index: usize) -> View {
        let mut components = Vec::with_capacity(2);
        if let Some(label) = &self.presentation.commit_label {
            components.push(Component::Button(Button {
                action: ActionKind::Commit,
                label: label.clone(),
                enabled: true,
            }));
        }
        components.push(Component::Button(Button {
            action: ActionKind::Reroll,
            label: "Reroll".to_string(),
            enabled: true,
        }));

        View {
            title: self.presentation.title.clone(),
            body: self.items.get(index).map(SessionItem::label).unwrap_or_default(),
            components,
        }
    }
}
