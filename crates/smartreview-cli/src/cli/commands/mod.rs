pub mod auth;
pub mod install;
pub mod key;

use smartreview_core::notice::{NoticeLevel, NoticeReceiver};

/// Prints every notice the controllers queued.
/// Errors go to stderr so scripts can separate them.
pub(crate) fn drain_notices(rx: &mut NoticeReceiver) {
    while let Ok(notice) = rx.try_recv() {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}", notice.message),
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("✗ {}", notice.message),
        }
    }
}
