// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop toast adapter using notify-rust.
//!
//! Toasts are best-effort by contract: a failed or slow notification must
//! never hold up the alert pipeline, so the actual send is fire-and-forget
//! on tokio's blocking pool. On macOS, `mac-notification-sys` looks up a
//! bundle identifier via AppleScript on first use, which blocks forever in
//! daemon processes without Automation permissions; pre-setting the bundle
//! at construction bypasses the lookup.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let title = title.to_string();
        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            match notify_rust::Notification::new()
                .appname("Sentinel")
                .summary(&title)
                .body(&message)
                .show()
            {
                Ok(_) => {
                    tracing::debug!(%title, "desktop toast sent");
                }
                Err(e) => {
                    tracing::warn!(%title, error = %e, "desktop toast failed");
                }
            }
        });
        Ok(())
    }
}
