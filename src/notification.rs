//! User-facing messages: log output and freedesktop D-Bus notifications.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use zbus::{Connection, proxy};

/// Upper bound on [`DesktopNotifier::flush`].
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user, e.g. "Maximum of 4 photos reached."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub summary: String,
    pub body: String,
}

impl Notice {
    pub fn info(summary: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            summary: summary.into(),
            body: body.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            summary: summary.into(),
            body: body.into(),
        }
    }

    pub fn error(summary: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            summary: summary.into(),
            body: body.into(),
        }
    }
}

/// Delivers notices to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Info => log::info!("{}: {}", notice.summary, notice.body),
            NoticeLevel::Warning => log::warn!("{}: {}", notice.summary, notice.body),
            NoticeLevel::Error => log::error!("{}: {}", notice.summary, notice.body),
        }
    }
}

/// Logs every notice and also shows it as a desktop notification.
///
/// Deliveries run on the runtime; call [`DesktopNotifier::flush`] before the
/// runtime shuts down or pending ones are dropped.
pub struct DesktopNotifier {
    runtime_handle: tokio::runtime::Handle,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl DesktopNotifier {
    pub fn new(runtime_handle: tokio::runtime::Handle) -> Self {
        Self {
            runtime_handle,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    fn take_pending(&self) -> Vec<JoinHandle<()>> {
        match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Waits for every notification sent so far, up to [`FLUSH_TIMEOUT`].
    pub async fn flush(&self) {
        let pending = self.take_pending();
        if pending.is_empty() {
            return;
        }
        log::debug!("Waiting for {} desktop notifications", pending.len());
        if tokio::time::timeout(FLUSH_TIMEOUT, join_all(pending))
            .await
            .is_err()
        {
            log::warn!("Desktop notifications still pending after {FLUSH_TIMEOUT:?}");
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &Notice) {
        LogNotifier.notify(notice);
        let icon = match notice.level {
            NoticeLevel::Info => "camera-photo",
            NoticeLevel::Warning => "dialog-warning",
            NoticeLevel::Error => "dialog-error",
        };
        let handle = send_notification_async(
            &self.runtime_handle,
            notice.summary.clone(),
            notice.body.clone(),
            Some(icon.to_string()),
        );
        self.track(handle);
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice.clone()),
            Err(poisoned) => poisoned.into_inner().push(notice.clone()),
        }
    }
}

/// D-Bus interface for freedesktop Notifications.
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Send a notification.
    ///
    /// # Returns
    /// Notification ID
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: Vec<&str>,
        hints: HashMap<&str, zbus::zvariant::Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Send a system notification.
pub async fn send_notification(summary: &str, body: &str, icon: Option<&str>) -> Result<(), String> {
    let connection = Connection::session()
        .await
        .map_err(|e| format!("Failed to connect to session bus: {}", e))?;

    let proxy = NotificationsProxy::new(&connection)
        .await
        .map_err(|e| format!("Failed to create notifications proxy: {}", e))?;

    proxy
        .notify(
            "Photobooth",
            0,
            icon.unwrap_or("camera-photo"),
            summary,
            body,
            vec![],
            HashMap::new(),
            3000,
        )
        .await
        .map_err(|e| format!("Failed to send notification: {}", e))?;

    Ok(())
}

/// Send a notification in the background (non-blocking); failures are logged.
pub fn send_notification_async(
    runtime_handle: &tokio::runtime::Handle,
    summary: String,
    body: String,
    icon: Option<String>,
) -> JoinHandle<()> {
    runtime_handle.spawn(async move {
        if let Err(e) = send_notification(&summary, &body, icon.as_deref()).await {
            log::warn!("Failed to send notification: {}", e);
        }
    })
}
