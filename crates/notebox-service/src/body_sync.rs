use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use notebox_core::vfs::FileStore;
use notebox_core::workspace::apply_op;
use notebox_core::BodyPlan;

use crate::protocol::Notification;

/// A committed body plan waiting for its file operations
pub struct PendingPlan {
    pub fs: Arc<dyn FileStore>,
    pub plan: BodyPlan,
}

/// Handle used by request handlers to queue body I/O
#[derive(Clone)]
pub struct BodySync {
    sender: UnboundedSender<PendingPlan>,
    notifications: UnboundedSender<Notification>,
}

impl BodySync {
    pub fn new(
        sender: UnboundedSender<PendingPlan>,
        notifications: UnboundedSender<Notification>,
    ) -> Self {
        Self {
            sender,
            notifications,
        }
    }

    /// Push a notification straight to the client
    pub fn report(&self, notification: Notification) {
        let _ = self.notifications.send(notification);
    }

    /// Queue a plan; empty plans are dropped.
    pub fn dispatch(&self, fs: Arc<dyn FileStore>, plan: BodyPlan) {
        if plan.is_empty() {
            return;
        }
        if self.sender.send(PendingPlan { fs, plan }).is_err() {
            log::error!("Body worker stopped; dropping body plan");
        }
    }
}

/// Runs queued plans one after another, off the async runtime.
///
/// Plans run in the order their structural changes committed, so a save
/// queued before a move to trash always lands first.
pub struct BodyWorker {
    receiver: UnboundedReceiver<PendingPlan>,
    notifications: UnboundedSender<Notification>,
}

impl BodyWorker {
    pub fn new(
        receiver: UnboundedReceiver<PendingPlan>,
        notifications: UnboundedSender<Notification>,
    ) -> Self {
        Self {
            receiver,
            notifications,
        }
    }

    pub async fn start(mut self) {
        log::debug!("Body worker started");

        while let Some(pending) = self.receiver.recv().await {
            let produced = tokio::task::spawn_blocking(move || run_plan(pending)).await;
            match produced {
                Ok(notifications) => {
                    for notification in notifications {
                        // Receiver gone means the client disconnected
                        let _ = self.notifications.send(notification);
                    }
                }
                Err(e) => log::error!("Body worker task failed: {}", e),
            }
        }

        log::debug!("Body worker stopped");
    }
}

fn run_plan(pending: PendingPlan) -> Vec<Notification> {
    let PendingPlan { fs, plan } = pending;
    let mut notifications = Vec::new();

    for op in plan {
        let id = op.id().clone();
        match apply_op(&*fs, op) {
            Ok(Some(content)) => notifications.push(Notification::BodyLoaded { id, content }),
            Ok(None) => log::trace!("Body operation on {} done", id),
            Err(e) => {
                log::warn!("Body operation on {} failed: {}", id, e);
                notifications.push(Notification::BodyIoFailed {
                    id,
                    message: e.to_string(),
                });
            }
        }
    }

    notifications
}
