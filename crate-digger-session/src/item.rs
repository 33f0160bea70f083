use crate_digger_core::{Location, Vinyl, WantItem, normalize};

/// Something a session can show.
pub trait SessionItem: Clone + Send + Sync + 'static {
    /// One-line display text.
    fn label(&self) -> String;

    /// Identity used to tell two items apart when rerolling. Items with the
    /// same key count as the same pick.
    fn key(&self) -> String {
        self.label()
    }
}

impl SessionItem for String {
    fn label(&self) -> String {
        self.clone()
    }
}

fn record_key(artist: &str, album: &str) -> String {
    format!("{}\u{1f}{}", normalize(artist), normalize(album))
}

impl SessionItem for Vinyl {
    fn label(&self) -> String {
        format!("{} - {}", self.artist, self.album)
    }

    fn key(&self) -> String {
        record_key(&self.artist, &self.album)
    }
}

impl SessionItem for WantItem {
    fn label(&self) -> String {
        match self.notes.as_deref().filter(|n| !n.is_empty()) {
            Some(notes) => format!("{} - {} ({})", self.artist, self.album, notes),
            None => format!("{} - {}", self.artist, self.album),
        }
    }

    fn key(&self) -> String {
        record_key(&self.artist, &self.album)
    }
}

impl SessionItem for Location {
    fn label(&self) -> String {
        match self.address.as_deref().filter(|a| !a.is_empty()) {
            Some(address) => format!("{} ({})", self.name, address),
            None => self.name.clone(),
        }
    }

    fn key(&self) -> String {
        normalize(&self.name)
    }
}
