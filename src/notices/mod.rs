//! User-facing notifications.
//!
//! Operations in this crate report their outcomes (workflow started, import
//! failed, channel error, workflow completed) as [`Notice`]s queued on a
//! [`NoticeBus`]. A UI shell polls [`NoticeBus::drain`] to render toasts;
//! headless hosts hand a [`NoticeSink`] to [`NoticeBus::forward_to`] for
//! background delivery.

mod bus;
mod notice;
mod sink;

pub use bus::NoticeBus;
pub use notice::{Notice, NoticeLevel};
pub use sink::{MemorySink, NoticeSink, StdErrSink};
