//! ClientShell - キャッシュとパネルを束ねるルート
//!
//! # 責務
//! - 起動時に 3 つのコレクションを読み込む
//! - パネルが発行した Signal を受けて該当コレクションを取り直す
//! - 共有の ApiClient / EventSink を注入したパネルを作る
//!
//! Signal の配送は broadcast、受信側は `SignalListener` のバックグラウンド
//! タスクで、`watch<bool>` の shutdown と `select!` で競合させる。

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::api::ApiClient;
use super::cache::CollectionCache;
use super::panel::{StaffPanel, TaskPanel};
use super::resolver::{AssignmentRow, RelationResolver};
use super::workflow::AssignmentWorkflow;
use crate::domain::{CollectionKind, Signal, StoreError};
use crate::impls::BroadcastEventSink;
use crate::ports::Transport;

/// ClientShell は clone して listener タスクと共有できる
#[derive(Clone)]
pub struct ClientShell {
    api: ApiClient,
    cache: Arc<CollectionCache>,
    events: Arc<BroadcastEventSink>,
}

impl ClientShell {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            api: ApiClient::new(transport),
            cache: Arc::new(CollectionCache::new()),
            events: Arc::new(BroadcastEventSink::default()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &CollectionCache {
        &self.cache
    }

    pub fn events(&self) -> &BroadcastEventSink {
        &self.events
    }

    /// 3 つのコレクションを読み込む
    ///
    /// 個々の失敗はログに残して続行し、失敗したものは前の内容のまま。
    /// 戻り値は失敗したコレクション。
    pub async fn load_all(&self) -> Vec<CollectionKind> {
        let mut failed = Vec::new();
        for kind in CollectionKind::ALL {
            if self.refresh(kind).await.is_err() {
                failed.push(kind);
            }
        }
        failed
    }

    /// `kind` を 1 回取り直す
    pub async fn refresh(&self, kind: CollectionKind) -> Result<usize, StoreError> {
        self.cache.load(&self.api, kind).await.inspect_err(|error| {
            warn!(collection = %kind, %error, "refresh failed, keeping previous contents");
        })
    }

    pub async fn handle_signal(&self, signal: Signal) -> Result<usize, StoreError> {
        debug!(%signal, "handling signal");
        self.refresh(signal.collection()).await
    }

    /// 表示用の assignment 一覧
    pub fn assignment_rows(&self) -> Vec<AssignmentRow> {
        let (staff, tasks) = (self.cache.staff(), self.cache.tasks());
        RelationResolver::new(&staff, &tasks).rows(&self.cache.assignments())
    }

    pub fn assignment_workflow(&self) -> AssignmentWorkflow {
        AssignmentWorkflow::new(self.api.clone(), self.events.clone())
    }

    pub fn staff_panel(&self) -> StaffPanel {
        StaffPanel::new(self.api.clone(), self.events.clone())
    }

    pub fn task_panel(&self) -> TaskPanel {
        TaskPanel::new(self.api.clone(), self.events.clone())
    }

    /// Signal を受けてリフレッシュするタスクを起動する
    ///
    /// 購読は呼び出し時点で始まるので、戻った後に発行された Signal は
    /// 取りこぼさない。
    pub fn spawn_signal_listener(&self) -> SignalListener {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let signals = self.events.subscribe();
        let shell = self.clone();

        let join = tokio::spawn(async move {
            listen(shell, signals, &mut shutdown_rx).await;
        });

        SignalListener { shutdown_tx, join }
    }
}

/// Signal listener handle.
/// - `request_shutdown()` で止まる（処理中のリフレッシュは最後まで行う）
/// - handle を drop しても止まる
/// - `shutdown_and_join()` で終了を待てる
pub struct SignalListener {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SignalListener {
    pub fn request_shutdown(&self) {
        // ignore send error: the listener may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn listen(
    shell: ClientShell,
    mut signals: broadcast::Receiver<Signal>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let received = tokio::select! {
            changed = shutdown_rx.changed() => {
                // handle が drop された（sender が無い）なら止まる
                if changed.is_err() {
                    break;
                }
                continue;
            }
            received = signals.recv() => received,
        };

        match received {
            Ok(signal) => {
                // 失敗は refresh 内でログ済み
                let _ = shell.handle_signal(signal).await;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // 取りこぼした Signal の中身は分からないので全部取り直す
                warn!(skipped, "signal listener lagged, reloading every collection");
                shell.load_all().await;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("signal listener stopped");
}
