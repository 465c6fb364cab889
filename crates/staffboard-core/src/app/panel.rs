//! RecordPanel - staff / task 一覧のモーダル
//!
//! assignment と同じモーダル構造だが、変更後の扱いが違う。
//! - ステータスを確認せずに必ずリフレッシュを要求する（2xx 以外は warn だけ）
//! - リクエストの後は必ずモーダルを閉じてバッファを捨てる
//! - 変更はコレクションのルートに送り、item はボディの `id` で指定する

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::api::ApiClient;
use crate::domain::{
    Draft, ModalPhase, ModalState, Resource, Staff, StoreError, Task, WorkflowError,
};
use crate::ports::{ApiResponse, EventSink};

pub type PanelState<R> = ModalState<<R as Resource>::Draft, R>;

/// RecordPanel は 1 種類のレコード（staff または task）のコントローラ
pub struct RecordPanel<R: Resource> {
    api: ApiClient,
    events: Arc<dyn EventSink>,
    state: watch::Sender<PanelState<R>>,
}

pub type StaffPanel = RecordPanel<Staff>;
pub type TaskPanel = RecordPanel<Task>;

impl<R: Resource> RecordPanel<R> {
    pub fn new(api: ApiClient, events: Arc<dyn EventSink>) -> Self {
        Self {
            api,
            events,
            state: watch::channel(ModalState::Idle).0,
        }
    }

    pub fn state(&self) -> PanelState<R> {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> ModalPhase {
        self.state.borrow().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelState<R>> {
        self.state.subscribe()
    }

    pub fn open_add(&self) {
        self.state.send_replace(ModalState::Adding(R::Draft::default()));
    }

    pub fn open_edit(&self, record: &R) {
        self.state.send_replace(ModalState::Editing(record.clone()));
    }

    pub fn cancel(&self) {
        self.state.send_replace(ModalState::Idle);
    }

    /// add バッファを書き換える（Adding 以外ではエラー）
    pub fn edit_draft(&self, change: impl FnOnce(&mut R::Draft)) -> Result<(), WorkflowError> {
        let mut current = ModalPhase::Idle;
        let applied = self.state.send_if_modified(|state| match state {
            ModalState::Adding(draft) => {
                change(draft);
                true
            }
            other => {
                current = other.phase();
                false
            }
        });
        if applied {
            Ok(())
        } else {
            Err(WorkflowError::NothingStaged(current))
        }
    }

    /// edit バッファを書き換える（Editing 以外ではエラー）
    pub fn edit_record(&self, change: impl FnOnce(&mut R)) -> Result<(), WorkflowError> {
        let mut current = ModalPhase::Idle;
        let applied = self.state.send_if_modified(|state| match state {
            ModalState::Editing(record) => {
                change(record);
                true
            }
            other => {
                current = other.phase();
                false
            }
        });
        if applied {
            Ok(())
        } else {
            Err(WorkflowError::NothingStaged(current))
        }
    }

    /// バッファを送信してモーダルを閉じる
    ///
    /// レスポンスが得られれば（ステータスに関わらず）リフレッシュを要求して
    /// Idle に戻る。レスポンス自体が無い場合は状態を変えずにエラーを返す。
    pub async fn submit(&self) -> Result<ApiResponse, WorkflowError> {
        let response = match self.state() {
            ModalState::Idle => return Err(WorkflowError::NothingStaged(ModalPhase::Idle)),
            ModalState::Adding(draft) => {
                if let Some(field) = draft.missing_field() {
                    return Err(WorkflowError::MissingField(field));
                }
                self.api.create::<R>(&draft).await?
            }
            ModalState::Editing(record) => self.api.update(&record).await?,
        };

        self.settle("submit", &response);
        self.state.send_replace(ModalState::Idle);
        Ok(response)
    }

    /// レコードを削除してリフレッシュを要求する
    pub async fn remove(&self, id: R::Id) -> Result<ApiResponse, StoreError> {
        let response = self.api.delete::<R>(id).await?;
        self.settle("delete", &response);
        Ok(response)
    }

    fn settle(&self, action: &'static str, response: &ApiResponse) {
        let collection = R::COLLECTION;
        if response.is_success() {
            info!(%collection, action, status = response.status, "record change accepted");
        } else {
            warn!(
                %collection,
                action,
                status = response.status,
                body = %response.body,
                "record change status ignored"
            );
        }
        self.events.emit(collection.refresh_signal());
    }
}
