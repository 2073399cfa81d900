//! Engine operations over events and calendars.
//!
//! Both services follow the same per-request discipline: store mutation
//! first, cache invalidation second (entity keys inside the cached
//! repository decorators, list keys here), live fan-out last. A store
//! failure aborts before any invalidation or notification; cache and
//! fan-out failures are logged and degraded, never surfaced.

mod calendar;
mod event;

pub use calendar::{CalendarService, EXPANSION_HORIZON_DAYS};
pub use event::EventService;

use gather_core::calendar::CalendarOwner;
use gather_core::notify::{ChangeNotification, Channel, Fanout};

/// The live channel a calendar owner listens on.
fn owner_channel(owner: CalendarOwner) -> Channel {
    match owner {
        CalendarOwner::User(id) => Channel::User(id),
        CalendarOwner::Community(id) => Channel::Community(id),
    }
}

/// Publishes fire-and-forget; a fan-out failure degrades to a warning.
async fn publish_degraded(
    fanout: &dyn Fanout,
    channels: &[Channel],
    notification: &ChangeNotification,
) {
    if let Err(err) = fanout.publish(channels, notification).await {
        tracing::warn!(
            kind = notification.kind(),
            error = %err,
            "Failed to publish change notification"
        );
    }
}
