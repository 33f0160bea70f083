//! Read-only mapping from chat handles to collection members.

use std::collections::HashMap;

/// Maps a chat handle (e.g. a username on the chat service) to the member name
/// used in the collection store.
///
/// Built once from configuration and handed to whoever needs it. Handle and
/// member lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    by_handle: HashMap<String, String>,
}

impl UserDirectory {
    pub fn new<I, H, M>(entries: I) -> Self
    where
        I: IntoIterator<Item = (H, M)>,
        H: Into<String>,
        M: Into<String>,
    {
        let by_handle = entries
            .into_iter()
            .map(|(h, m)| (h.into().to_lowercase(), m.into()))
            .collect();
        Self { by_handle }
    }

    /// Member name for a chat handle.
    pub fn resolve(&self, handle: &str) -> Option<&str> {
        self.by_handle
            .get(&handle.to_lowercase())
            .map(String::as_str)
    }

    /// Whether `name` is one of the configured member names.
    pub fn is_member(&self, name: &str) -> bool {
        self.by_handle
            .values()
            .any(|m| m.eq_ignore_ascii_case(name))
    }

    /// The canonical spelling of a member name, if configured.
    pub fn member(&self, name: &str) -> Option<&str> {
        self.by_handle
            .values()
            .find(|m| m.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Sorted `(handle, member)` pairs.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .by_handle
            .iter()
            .map(|(h, m)| (h.as_str(), m.as_str()))
            .collect();
        entries.sort();
        entries
    }
}
