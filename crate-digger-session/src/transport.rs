use std::future::Future;

use crate::error::TransportError;
use crate::types::{ActorId, SurfaceId};
use crate::view::View;

/// The chat side of a session: where views are rendered and where
/// actor-only notices go.
pub trait Transport: Send + Sync + 'static {
    /// Post a new view in reply to `reply_to` and return its surface.
    fn send_view(
        &self,
        reply_to: SurfaceId,
        view: &View,
    ) -> impl Future<Output = Result<SurfaceId, TransportError>> + Send;

    /// Replace the view on an existing surface.
    fn edit_view(
        &self,
        surface: SurfaceId,
        view: &View,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Show `text` to `actor` only, never on the shared view.
    fn notify(
        &self,
        surface: SurfaceId,
        actor: &ActorId,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
