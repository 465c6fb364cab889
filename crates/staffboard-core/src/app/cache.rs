//! CollectionCache - サーバ側コレクションのクライアント側ミラー
//!
//! # 設計原則
//! - `load()` はコレクションを丸ごと置き換える（マージも差分も無い）
//! - 取得に失敗したら前の内容をそのまま残す（リトライしない）
//! - 書き込むのは `load()` / `replace_*()` だけ、読む側は snapshot を受け取る
//!
//! 各コレクションは `watch` チャネルに載っているので、描画側は
//! `subscribe_*()` で置き換えの通知を受け取れる。

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::api::ApiClient;
use crate::domain::{Assignment, CollectionKind, Staff, StoreError, Task};

pub struct CollectionCache {
    staff: watch::Sender<Arc<[Staff]>>,
    tasks: watch::Sender<Arc<[Task]>>,
    assignments: watch::Sender<Arc<[Assignment]>>,
}

impl CollectionCache {
    pub fn new() -> Self {
        Self {
            staff: watch::channel(Arc::from(Vec::new())).0,
            tasks: watch::channel(Arc::from(Vec::new())).0,
            assignments: watch::channel(Arc::from(Vec::new())).0,
        }
    }

    pub fn staff(&self) -> Arc<[Staff]> {
        self.staff.borrow().clone()
    }

    pub fn tasks(&self) -> Arc<[Task]> {
        self.tasks.borrow().clone()
    }

    pub fn assignments(&self) -> Arc<[Assignment]> {
        self.assignments.borrow().clone()
    }

    pub fn subscribe_staff(&self) -> watch::Receiver<Arc<[Staff]>> {
        self.staff.subscribe()
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<Arc<[Task]>> {
        self.tasks.subscribe()
    }

    pub fn subscribe_assignments(&self) -> watch::Receiver<Arc<[Assignment]>> {
        self.assignments.subscribe()
    }

    pub fn replace_staff(&self, records: Vec<Staff>) {
        self.staff.send_replace(records.into());
    }

    pub fn replace_tasks(&self, records: Vec<Task>) {
        self.tasks.send_replace(records.into());
    }

    pub fn replace_assignments(&self, records: Vec<Assignment>) {
        self.assignments.send_replace(records.into());
    }

    /// staff の一覧を取得して置き換え、置き換え後の snapshot を返す
    pub async fn load_staff(&self, api: &ApiClient) -> Result<Arc<[Staff]>, StoreError> {
        let records: Arc<[Staff]> = api.list::<Staff>(CollectionKind::Staff).await?.into();
        self.staff.send_replace(records.clone());
        Ok(records)
    }

    pub async fn load_tasks(&self, api: &ApiClient) -> Result<Arc<[Task]>, StoreError> {
        let records: Arc<[Task]> = api.list::<Task>(CollectionKind::Task).await?.into();
        self.tasks.send_replace(records.clone());
        Ok(records)
    }

    pub async fn load_assignments(
        &self,
        api: &ApiClient,
    ) -> Result<Arc<[Assignment]>, StoreError> {
        let records: Arc<[Assignment]> = api
            .list::<Assignment>(CollectionKind::Assignment)
            .await?
            .into();
        self.assignments.send_replace(records.clone());
        Ok(records)
    }

    /// `kind` の一覧を取得してキャッシュを置き換え、件数を返す
    ///
    /// 失敗した場合はキャッシュに触れずにエラーを返す。
    pub async fn load(&self, api: &ApiClient, kind: CollectionKind) -> Result<usize, StoreError> {
        let count = match kind {
            CollectionKind::Staff => self.load_staff(api).await?.len(),
            CollectionKind::Task => self.load_tasks(api).await?.len(),
            CollectionKind::Assignment => self.load_assignments(api).await?.len(),
        };
        info!(collection = %kind, records = count, "collection replaced");
        Ok(count)
    }
}

impl Default for CollectionCache {
    fn default() -> Self {
        Self::new()
    }
}
