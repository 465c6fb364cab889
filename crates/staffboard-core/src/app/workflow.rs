//! AssignmentWorkflow - assignment の add / edit モーダルと変更リクエスト
//!
//! # 状態遷移
//! - open_add: → Adding（バッファは `{staff_id: "", task_id: "", status: "Pending"}`）
//! - open_edit: → Editing（バッファはレコードのコピー、キャッシュとは独立）
//! - cancel: → Idle（リクエストは送らない）
//! - submit 成功: `update-assignments` を発行して → Idle
//! - submit 失敗（2xx 以外）: error ログを出し、状態とバッファはそのまま
//!
//! 削除はモーダルとは独立で、レスポンスに関わらず必ず
//! `update-assignments` を 1 回発行する。
//!
//! # 楽観的更新はしない
//! 作成・更新が成功してもキャッシュには触れない。新しい内容は
//! リフレッシュ（一覧の取り直し）が終わって初めて見える。

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use super::api::ApiClient;
use crate::domain::{
    Assignment, AssignmentDraft, AssignmentField, AssignmentId, Draft, ModalPhase, ModalState,
    Signal, StoreError, WorkflowError,
};
use crate::ports::{ApiResponse, EventSink};

pub type AssignmentState = ModalState<AssignmentDraft, Assignment>;

/// Submitted は成功した送信の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// 作成（id はレスポンスに含まれていれば）
    Created { id: Option<AssignmentId> },
    Updated { id: AssignmentId },
}

/// AssignmentWorkflow は assignment パネルのコントローラ
///
/// # 使用例
/// ```ignore
/// let workflow = AssignmentWorkflow::new(api, events);
/// workflow.open_add();
/// workflow.edit(AssignmentField::from_input("staff_id", "3")?)?;
/// workflow.edit(AssignmentField::from_input("task_id", "7")?)?;
/// workflow.submit().await?;
/// ```
///
/// 状態は `watch` に載っていて、`subscribe()` で描画側が変更を受け取れる。
pub struct AssignmentWorkflow {
    api: ApiClient,
    events: Arc<dyn EventSink>,
    state: watch::Sender<AssignmentState>,
}

impl AssignmentWorkflow {
    pub fn new(api: ApiClient, events: Arc<dyn EventSink>) -> Self {
        Self {
            api,
            events,
            state: watch::channel(ModalState::Idle).0,
        }
    }

    /// 現在の状態（バッファ込み）の snapshot
    pub fn state(&self) -> AssignmentState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> ModalPhase {
        self.state.borrow().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<AssignmentState> {
        self.state.subscribe()
    }

    /// add モーダルを開く（既に開いているバッファは捨てる）
    pub fn open_add(&self) {
        self.state.send_replace(ModalState::Adding(AssignmentDraft::default()));
    }

    /// edit モーダルを開く（レコードをコピーしてバッファにする）
    pub fn open_edit(&self, record: &Assignment) {
        self.state.send_replace(ModalState::Editing(record.clone()));
    }

    pub fn cancel(&self) {
        self.state.send_replace(ModalState::Idle);
    }

    /// バッファの 1 フィールドを書き換える
    pub fn edit(&self, change: AssignmentField) -> Result<(), WorkflowError> {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            match state {
                ModalState::Idle => return false,
                ModalState::Adding(draft) => draft.apply(change),
                ModalState::Editing(record) => record.apply(change),
            }
            applied = true;
            true
        });
        if applied {
            Ok(())
        } else {
            Err(WorkflowError::NothingStaged(ModalPhase::Idle))
        }
    }

    /// バッファを送信する
    ///
    /// - Adding: `POST /api/assignment/`
    /// - Editing: `PUT /api/assignment/{id}/`
    ///
    /// レスポンスが得られなかった場合は `WorkflowError::Store` を返し、
    /// 状態は変えない。
    pub async fn submit(&self) -> Result<Submitted, WorkflowError> {
        let staged = self.state();
        match staged {
            ModalState::Idle => Err(WorkflowError::NothingStaged(ModalPhase::Idle)),
            ModalState::Adding(draft) => {
                if let Some(field) = draft.missing_field() {
                    return Err(WorkflowError::MissingField(field));
                }
                let response = self.api.create_assignment(&draft).await?;
                if !response.is_success() {
                    error!(
                        status = response.status,
                        body = %response.body,
                        "failed to create assignment"
                    );
                    return Err(WorkflowError::Rejected {
                        status: response.status,
                    });
                }

                let id = created_id(&response);
                info!(id = ?id.map(|id| id.get()), "assignment created");
                self.finish();
                Ok(Submitted::Created { id })
            }
            ModalState::Editing(record) => {
                let response = self.api.update_assignment(&record).await?;
                if !response.is_success() {
                    error!(
                        id = record.id.get(),
                        status = response.status,
                        body = %response.body,
                        "failed to update assignment"
                    );
                    return Err(WorkflowError::Rejected {
                        status: response.status,
                    });
                }

                info!(id = record.id.get(), "assignment updated");
                self.finish();
                Ok(Submitted::Updated { id: record.id })
            }
        }
    }

    /// assignment を削除する
    ///
    /// ステータスは見ない。レスポンスが得られた場合は必ずリフレッシュを
    /// 1 回要求する。
    pub async fn remove(&self, id: AssignmentId) -> Result<ApiResponse, StoreError> {
        let response = self.api.delete_assignment(id).await?;
        if !response.is_success() {
            warn!(id = id.get(), status = response.status, "assignment delete status ignored");
        }
        self.events.emit(Signal::UpdateAssignments);
        Ok(response)
    }

    fn finish(&self) {
        self.events.emit(Signal::UpdateAssignments);
        self.state.send_replace(ModalState::Idle);
    }
}

fn created_id(response: &ApiResponse) -> Option<AssignmentId> {
    response
        .body
        .get("id")
        .and_then(serde_json::Value::as_i64)
        .map(AssignmentId::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::cache::CollectionCache;
    use crate::domain::{CollectionKind, StaffId, TaskId};
    use crate::impls::{BroadcastEventSink, InMemoryBackend};
    use crate::ports::{FixedClock, Method};
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::json;
    use tokio::sync::broadcast;

    struct Fixture {
        backend: Arc<InMemoryBackend>,
        api: ApiClient,
        cache: CollectionCache,
        signals: broadcast::Receiver<Signal>,
        workflow: AssignmentWorkflow,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(InMemoryBackend::with_clock(Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ))));
        let api = ApiClient::new(backend.clone());
        let sink = Arc::new(BroadcastEventSink::default());
        let signals = sink.subscribe();
        let workflow = AssignmentWorkflow::new(api.clone(), sink);
        Fixture {
            backend,
            api,
            cache: CollectionCache::new(),
            signals,
            workflow,
        }
    }

    fn drain(signals: &mut broadcast::Receiver<Signal>) -> Vec<Signal> {
        let mut received = Vec::new();
        while let Ok(signal) = signals.try_recv() {
            received.push(signal);
        }
        received
    }

    fn input(field: &str, value: &str) -> AssignmentField {
        AssignmentField::from_input(field, value).unwrap()
    }

    #[test]
    fn open_add_resets_buffer_to_defaults() {
        let f = fixture();
        f.workflow.open_add();
        f.workflow.edit(input("status", "Completed")).unwrap();
        f.workflow.cancel();
        f.workflow.open_add();

        assert_eq!(f.workflow.state(), ModalState::Adding(AssignmentDraft::default()));
    }

    #[test]
    fn edit_while_idle_is_rejected() {
        let f = fixture();
        let err = f.workflow.edit(input("status", "Done")).unwrap_err();
        assert!(matches!(err, WorkflowError::NothingStaged(ModalPhase::Idle)));
    }

    #[tokio::test]
    async fn cancelled_edit_leaves_cached_record_untouched() {
        let mut f = fixture();
        let ana = f.backend.seed_staff("Ana", "Analyst").await;
        let report = f.backend.seed_task("Ship report", 1).await;
        f.backend.seed_assignment(ana, report, "Pending").await;
        f.cache.load(&f.api, CollectionKind::Assignment).await.unwrap();
        let before = f.cache.assignments()[0].clone();

        f.workflow.open_edit(&f.cache.assignments()[0]);
        f.workflow.edit(input("status", "Done")).unwrap();
        f.workflow.edit(input("staff_id", "")).unwrap();
        f.workflow.cancel();

        assert_eq!(f.cache.assignments()[0], before);
        assert_eq!(f.workflow.phase(), ModalPhase::Idle);
        assert!(drain(&mut f.signals).is_empty());
        // cancel ではリクエストを送らない（一覧取得の 1 件だけ）
        assert_eq!(f.backend.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn create_then_refresh_shows_server_assigned_record() {
        let mut f = fixture();
        f.backend.set_next_ids(3, 7, 42).await;
        f.backend.seed_staff("Ana", "Analyst").await;
        f.backend.seed_task("Ship report", 1).await;

        f.workflow.open_add();
        f.workflow.edit(input("staff_id", "3")).unwrap();
        f.workflow.edit(input("task_id", "7")).unwrap();
        assert_eq!(
            f.workflow.state(),
            ModalState::Adding(
                serde_json::from_value(json!({
                    "staff_id": "3",
                    "task_id": "7",
                    "status": "Pending",
                }))
                .unwrap()
            )
        );

        let submitted = f.workflow.submit().await.unwrap();
        assert_eq!(submitted, Submitted::Created { id: Some(AssignmentId::new(42)) });
        assert_eq!(f.workflow.phase(), ModalPhase::Idle);

        // 楽観的な挿入はしない
        assert!(f.cache.assignments().is_empty());
        assert_eq!(drain(&mut f.signals), vec![Signal::UpdateAssignments]);

        f.cache.load(&f.api, CollectionKind::Assignment).await.unwrap();
        let expected: Assignment = serde_json::from_value(json!({
            "id": 42,
            "staff_id": "3",
            "task_id": "7",
            "status": "Pending",
            "staff_name": "Ana",
            "task_title": "Ship report",
            "date_assigned": "2024-01-01",
        }))
        .unwrap();
        assert_eq!(f.cache.assignments().to_vec(), vec![expected]);
    }

    #[rstest]
    #[case::nothing_selected(&[], "staff_id")]
    #[case::task_missing(&[("staff_id", "1")], "task_id")]
    #[case::staff_cleared(&[("staff_id", "1"), ("task_id", "1"), ("staff_id", "")], "staff_id")]
    #[tokio::test]
    async fn create_requires_both_selections(
        #[case] edits: &[(&str, &str)],
        #[case] missing: &str,
    ) {
        let f = fixture();
        f.workflow.open_add();
        for (field, value) in edits {
            f.workflow.edit(input(field, value)).unwrap();
        }

        let err = f.workflow.submit().await.unwrap_err();

        assert!(matches!(err, WorkflowError::MissingField(field) if field == missing));
        assert_eq!(f.workflow.phase(), ModalPhase::Adding);
        assert!(f.backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_create_keeps_modal_and_buffer() {
        let mut f = fixture();
        f.workflow.open_add();
        // 存在しない staff / task → バックエンドは 400
        f.workflow.edit(input("staff_id", "3")).unwrap();
        f.workflow.edit(input("task_id", "7")).unwrap();
        let staged = f.workflow.state();

        let err = f.workflow.submit().await.unwrap_err();

        assert!(matches!(err, WorkflowError::Rejected { status: 400 }));
        assert_eq!(f.workflow.state(), staged);
        assert!(drain(&mut f.signals).is_empty());
    }

    #[tokio::test]
    async fn update_sends_full_record_to_item_path() {
        let mut f = fixture();
        f.backend.set_next_ids(1, 2, 5).await;
        let ana = f.backend.seed_staff("Ana", "Analyst").await;
        let report = f.backend.seed_task("Ship report", 1).await;
        f.backend.seed_assignment(ana, report, "Pending").await;
        f.cache.load(&f.api, CollectionKind::Assignment).await.unwrap();

        f.workflow.open_edit(&f.cache.assignments()[0]);
        f.workflow.edit(input("status", "Done")).unwrap();
        let submitted = f.workflow.submit().await.unwrap();

        assert_eq!(submitted, Submitted::Updated { id: AssignmentId::new(5) });
        assert_eq!(f.workflow.state(), ModalState::Idle);
        assert_eq!(f.workflow.state().editing(), None);
        assert_eq!(drain(&mut f.signals), vec![Signal::UpdateAssignments]);

        let requests = f.backend.requests().await;
        let put = requests.last().unwrap();
        assert_eq!(put.method, Method::Put);
        assert_eq!(put.path, "/api/assignment/5/");
        let body = put.body.as_ref().unwrap();
        assert_eq!(body["id"], json!(5));
        assert_eq!(body["status"], json!("Done"));
        assert_eq!(body["staff_id"], json!(1));
        assert_eq!(body["task_id"], json!(2));
    }

    #[tokio::test]
    async fn rejected_update_stays_in_editing_with_buffer() {
        let mut f = fixture();
        let record: Assignment = serde_json::from_value(json!({
            "id": 5, "staff_id": "1", "task_id": "2", "status": "Pending",
        }))
        .unwrap();
        f.backend.fail_next_mutation(500).await;

        f.workflow.open_edit(&record);
        f.workflow.edit(input("status", "Done")).unwrap();
        let err = f.workflow.submit().await.unwrap_err();

        assert!(matches!(err, WorkflowError::Rejected { status: 500 }));
        let buffer = f.workflow.state().editing().cloned().unwrap();
        assert_eq!(buffer.status, "Done");
        assert_eq!(buffer.staff_id, Some(StaffId::new(1)));
        assert_eq!(buffer.task_id, Some(TaskId::new(2)));
        assert!(drain(&mut f.signals).is_empty());

        let requests = f.backend.requests().await;
        assert_eq!(requests[0].path, "/api/assignment/5/");
        assert_eq!(requests[0].body.as_ref().unwrap()["status"], json!("Done"));
        assert_eq!(requests[0].body.as_ref().unwrap()["id"], json!(5));
    }

    #[tokio::test]
    async fn rejected_update_can_be_resubmitted() {
        let mut f = fixture();
        let ana = f.backend.seed_staff("Ana", "Analyst").await;
        let report = f.backend.seed_task("Ship report", 1).await;
        let id = f.backend.seed_assignment(ana, report, "Pending").await;
        f.cache.load(&f.api, CollectionKind::Assignment).await.unwrap();
        f.backend.fail_next_mutation(503).await;

        f.workflow.open_edit(&f.cache.assignments()[0]);
        f.workflow.edit(input("status", "Completed")).unwrap();
        assert!(f.workflow.submit().await.is_err());

        // 同じバッファのまま再送
        assert_eq!(f.workflow.submit().await.unwrap(), Submitted::Updated { id });
        assert_eq!(drain(&mut f.signals), vec![Signal::UpdateAssignments]);
        assert_eq!(f.backend.assignments().await[0].status, "Completed");
    }

    #[tokio::test]
    async fn submit_while_idle_sends_nothing() {
        let f = fixture();
        let err = f.workflow.submit().await.unwrap_err();
        assert!(matches!(err, WorkflowError::NothingStaged(ModalPhase::Idle)));
        assert!(f.backend.requests().await.is_empty());
    }

    #[rstest]
    #[case::ok(None)]
    #[case::not_found(Some(404))]
    #[case::server_error(Some(500))]
    #[tokio::test]
    async fn delete_always_requests_exactly_one_refresh(#[case] forced: Option<u16>) {
        let mut f = fixture();
        let ana = f.backend.seed_staff("Ana", "Analyst").await;
        let report = f.backend.seed_task("Ship report", 1).await;
        let id = f.backend.seed_assignment(ana, report, "Pending").await;
        if let Some(status) = forced {
            f.backend.fail_next_mutation(status).await;
        }

        let response = f.workflow.remove(id).await.unwrap();

        assert_eq!(response.status, forced.unwrap_or(200));
        assert_eq!(drain(&mut f.signals), vec![Signal::UpdateAssignments]);
        let requests = f.backend.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, format!("/api/assignment/{id}/"));
    }

    #[tokio::test]
    async fn delete_does_not_touch_the_modal() {
        let f = fixture();
        f.workflow.open_add();
        f.workflow.remove(AssignmentId::new(1)).await.unwrap();
        assert_eq!(f.workflow.phase(), ModalPhase::Adding);
    }

    #[tokio::test]
    async fn subscribers_are_notified_of_transitions() {
        let f = fixture();
        let mut state = f.workflow.subscribe();

        f.workflow.open_add();
        assert!(state.has_changed().unwrap());
        assert_eq!(state.borrow_and_update().phase(), ModalPhase::Adding);

        // Idle での edit は通知しない
        f.workflow.cancel();
        state.borrow_and_update();
        let _ = f.workflow.edit(input("status", "Done"));
        assert!(!state.has_changed().unwrap());
    }
}
