//! InMemoryBackend - REST バックエンドのエミュレーション（開発・テスト用）
//!
//! # 学習ポイント
//! - Transport trait の差し替えによるテスト
//! - tokio::sync::Mutex による状態の排他制御
//!
//! # 再現している挙動
//! - 一覧は `{data: [...]}`（挿入順）
//! - staff / task の PUT・DELETE はコレクションのルートに `id` 入りボディ
//! - assignment の PUT・DELETE は `/api/assignment/{id}/`
//! - assignment の作成・更新で `staff_name` / `task_title` を付与
//! - staff / task の削除は紐づく assignment も消す（cascade）
//! - 想定外のメソッド・パスは 405

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use crate::domain::{Assignment, AssignmentId, STATUS_PENDING, StaffId, StoreError, TaskId};
use crate::ports::{ApiRequest, ApiResponse, Clock, Method, SystemClock, Transport};

/// 保存されている staff / task は受け取った JSON をそのまま持つ
type Row = Map<String, Value>;

struct BackendState {
    staff: BTreeMap<i64, Row>,
    tasks: BTreeMap<i64, Row>,
    assignments: BTreeMap<i64, StoredAssignment>,
    next_staff_id: i64,
    next_task_id: i64,
    next_assignment_id: i64,
    /// 受け取ったリクエストの記録
    requests: Vec<ApiRequest>,
    /// 次の変更系リクエストを強制的にこのステータスで返す
    forced_status: Option<u16>,
}

#[derive(Debug, Clone)]
struct StoredAssignment {
    staff_id: i64,
    task_id: i64,
    status: String,
    date_assigned: chrono::NaiveDate,
}

impl BackendState {
    fn new() -> Self {
        Self {
            staff: BTreeMap::new(),
            tasks: BTreeMap::new(),
            assignments: BTreeMap::new(),
            next_staff_id: 1,
            next_task_id: 1,
            next_assignment_id: 1,
            requests: Vec::new(),
            forced_status: None,
        }
    }

    fn allocate_staff_id(&mut self) -> i64 {
        let id = self.next_staff_id;
        self.next_staff_id += 1;
        id
    }

    fn allocate_task_id(&mut self) -> i64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        id
    }

    fn allocate_assignment_id(&mut self) -> i64 {
        let id = self.next_assignment_id;
        self.next_assignment_id += 1;
        id
    }

    fn assignment_json(&self, id: i64, stored: &StoredAssignment) -> Value {
        let staff_name = self
            .staff
            .get(&stored.staff_id)
            .and_then(|row| row.get("name"))
            .cloned()
            .unwrap_or(Value::Null);
        let task_title = self
            .tasks
            .get(&stored.task_id)
            .and_then(|row| row.get("title"))
            .cloned()
            .unwrap_or(Value::Null);
        json!({
            "id": id,
            "staff_id": stored.staff_id,
            "task_id": stored.task_id,
            "staff_name": staff_name,
            "task_title": task_title,
            "status": stored.status,
            "date_assigned": stored.date_assigned,
        })
    }

    fn cascade_staff(&mut self, staff_id: i64) {
        self.assignments.retain(|_, a| a.staff_id != staff_id);
    }

    fn cascade_task(&mut self, task_id: i64) {
        self.assignments.retain(|_, a| a.task_id != task_id);
    }
}

/// InMemoryBackend は Transport を実装するバックエンドの代役
///
/// # 使用例
/// ```ignore
/// let backend = Arc::new(InMemoryBackend::new());
/// let ana = backend.seed_staff("Ana", "Analyst").await;
/// let client = ApiClient::new(backend.clone());
/// ```
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState::new())),
            clock,
        }
    }

    /// staff を直接登録して id を返す
    pub async fn seed_staff(&self, name: &str, role: &str) -> StaffId {
        let today = self.clock.today();
        let mut state = self.state.lock().await;
        let id = state.allocate_staff_id();
        let row = json!({
            "id": id,
            "name": name,
            "role": role,
            "is_active": true,
            "date_joined": today,
        });
        state.staff.insert(id, into_row(row));
        StaffId::new(id)
    }

    /// task を直接登録して id を返す
    pub async fn seed_task(&self, title: &str, priority: i32) -> TaskId {
        let today = self.clock.today();
        let mut state = self.state.lock().await;
        let id = state.allocate_task_id();
        let row = json!({
            "id": id,
            "title": title,
            "description": "",
            "priority": priority,
            "due_date": today,
        });
        state.tasks.insert(id, into_row(row));
        TaskId::new(id)
    }

    /// assignment を直接登録する（staff / task は存在している前提）
    pub async fn seed_assignment(
        &self,
        staff_id: StaffId,
        task_id: TaskId,
        status: &str,
    ) -> AssignmentId {
        let today = self.clock.today();
        let mut state = self.state.lock().await;
        let id = state.allocate_assignment_id();
        state.assignments.insert(
            id,
            StoredAssignment {
                staff_id: staff_id.get(),
                task_id: task_id.get(),
                status: status.to_string(),
                date_assigned: today,
            },
        );
        AssignmentId::new(id)
    }

    /// 次に採番する id を変更する
    pub async fn set_next_ids(&self, staff: i64, task: i64, assignment: i64) {
        let mut state = self.state.lock().await;
        state.next_staff_id = staff;
        state.next_task_id = task;
        state.next_assignment_id = assignment;
    }

    /// 次の変更系リクエスト（POST / PUT / DELETE）を `status` で失敗させる
    pub async fn fail_next_mutation(&self, status: u16) {
        self.state.lock().await.forced_status = Some(status);
    }

    /// これまでに受け取ったリクエスト
    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().await.requests.clone()
    }

    /// 現在の assignment を一覧と同じ形で返す
    pub async fn assignments(&self) -> Vec<Assignment> {
        let state = self.state.lock().await;
        state
            .assignments
            .iter()
            .filter_map(|(id, stored)| {
                serde_json::from_value(state.assignment_json(*id, stored)).ok()
            })
            .collect()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn into_row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn message(status: u16, text: &str) -> ApiResponse {
    ApiResponse::new(status, json!({ "message": text }))
}

fn error(status: u16, text: &str) -> ApiResponse {
    ApiResponse::new(status, json!({ "error": text }))
}

fn id_field(body: &Value, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// `/api/{collection}/` または `/api/{collection}/{id}/` を分解する
fn split_path(path: &str) -> Option<(&str, Option<&str>)> {
    let rest = path.strip_prefix("/api/")?;
    let mut segments = rest.trim_end_matches('/').split('/');
    let collection = segments.next().filter(|s| !s.is_empty())?;
    let item = segments.next();
    if segments.next().is_some() {
        return None;
    }
    Some((collection, item))
}

fn handle_record_collection(
    rows: &mut BTreeMap<i64, Row>,
    method: Method,
    body: Value,
    required: &[&str],
    allocate: impl FnOnce() -> i64,
) -> (ApiResponse, Option<i64>) {
    match method {
        Method::Get => {
            let data: Vec<Value> = rows.values().cloned().map(Value::Object).collect();
            (ApiResponse::new(200, json!({ "data": data })), None)
        }
        Method::Post => {
            if required.iter().any(|key| body.get(*key).is_none()) {
                return (error(400, "Invalid JSON data"), None);
            }
            let id = allocate();
            let mut row = into_row(body);
            row.insert("id".into(), json!(id));
            rows.insert(id, row);
            (ApiResponse::new(201, json!({ "message": "Created", "id": id })), None)
        }
        Method::Put => match id_field(&body, "id") {
            Some(id) if rows.contains_key(&id) => {
                let mut row = into_row(body);
                row.insert("id".into(), json!(id));
                rows.insert(id, row);
                (message(200, "Updated"), None)
            }
            _ => (error(404, "Not found"), None),
        },
        Method::Delete => match id_field(&body, "id") {
            Some(id) if rows.remove(&id).is_some() => (message(200, "Deleted"), Some(id)),
            _ => (error(404, "Not found"), None),
        },
    }
}

impl InMemoryBackend {
    fn route(&self, state: &mut BackendState, request: &ApiRequest) -> ApiResponse {
        let body = request.body.clone().unwrap_or(Value::Null);
        let Some((collection, item)) = split_path(&request.path) else {
            return error(405, "Method not allowed");
        };

        match (collection, item) {
            ("staff", None) => {
                let mut next = state.next_staff_id;
                let (response, deleted) = handle_record_collection(
                    &mut state.staff,
                    request.method,
                    body,
                    &["name", "role", "is_active", "date_joined"],
                    || {
                        let id = next;
                        next += 1;
                        id
                    },
                );
                state.next_staff_id = state.next_staff_id.max(next);
                if let Some(id) = deleted {
                    state.cascade_staff(id);
                }
                response
            }
            ("task", None) => {
                let mut next = state.next_task_id;
                let (response, deleted) = handle_record_collection(
                    &mut state.tasks,
                    request.method,
                    body,
                    &["title", "description", "priority", "due_date"],
                    || {
                        let id = next;
                        next += 1;
                        id
                    },
                );
                state.next_task_id = state.next_task_id.max(next);
                if let Some(id) = deleted {
                    state.cascade_task(id);
                }
                response
            }
            ("assignment", None) => match request.method {
                Method::Get => {
                    let data: Vec<Value> = state
                        .assignments
                        .iter()
                        .map(|(id, stored)| state.assignment_json(*id, stored))
                        .collect();
                    ApiResponse::new(200, json!({ "data": data }))
                }
                Method::Post => self.create_assignment(state, &body),
                _ => error(405, "Method not allowed"),
            },
            ("assignment", Some(raw_id)) => {
                let Ok(id) = raw_id.parse::<i64>() else {
                    return error(404, "Assignment not found");
                };
                match request.method {
                    Method::Put => update_assignment(state, id, &body),
                    Method::Delete => match state.assignments.remove(&id) {
                        Some(_) => message(200, "Assignment deleted successfully"),
                        None => error(404, "Assignment not found"),
                    },
                    _ => error(405, "Method not allowed"),
                }
            }
            _ => error(405, "Method not allowed"),
        }
    }

    fn create_assignment(&self, state: &mut BackendState, body: &Value) -> ApiResponse {
        let staff_id = id_field(body, "staff_id").filter(|id| state.staff.contains_key(id));
        let task_id = id_field(body, "task_id").filter(|id| state.tasks.contains_key(id));
        let (Some(staff_id), Some(task_id)) = (staff_id, task_id) else {
            return error(400, "Invalid staff or task ID");
        };
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or(STATUS_PENDING)
            .to_string();
        let stored = StoredAssignment {
            staff_id,
            task_id,
            status,
            date_assigned: self.clock.today(),
        };
        let id = state.allocate_assignment_id();
        let record = state.assignment_json(id, &stored);
        state.assignments.insert(id, stored);
        ApiResponse::new(201, record)
    }
}

fn update_assignment(state: &mut BackendState, id: i64, body: &Value) -> ApiResponse {
    let Some(mut stored) = state.assignments.get(&id).cloned() else {
        return error(404, "Assignment not found");
    };
    if body.get("staff_id").is_some() {
        match id_field(body, "staff_id").filter(|sid| state.staff.contains_key(sid)) {
            Some(staff_id) => stored.staff_id = staff_id,
            None => return error(400, "Invalid staff or task ID"),
        }
    }
    if body.get("task_id").is_some() {
        match id_field(body, "task_id").filter(|tid| state.tasks.contains_key(tid)) {
            Some(task_id) => stored.task_id = task_id,
            None => return error(400, "Invalid staff or task ID"),
        }
    }
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        stored.status = status.to_string();
    }
    let record = state.assignment_json(id, &stored);
    state.assignments.insert(id, stored);
    ApiResponse::new(200, record)
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, StoreError> {
        let mut state = self.state.lock().await;
        state.requests.push(request.clone());

        if request.method != Method::Get {
            if let Some(status) = state.forced_status.take() {
                return Ok(error(status, "forced failure"));
            }
        }
        Ok(self.route(&mut state, &request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::STATUS_COMPLETED;
    use crate::ports::FixedClock;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn backend() -> InMemoryBackend {
        InMemoryBackend::with_clock(Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )))
    }

    #[tokio::test]
    async fn create_assignment_fills_display_fields() {
        let backend = backend();
        let ana = backend.seed_staff("Ana", "Analyst").await;
        let report = backend.seed_task("Ship report", 1).await;

        let response = backend
            .execute(ApiRequest::post(
                "/api/assignment/",
                json!({ "staff_id": ana.to_string(), "task_id": report.get() }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body["staff_name"], json!("Ana"));
        assert_eq!(response.body["task_title"], json!("Ship report"));
        assert_eq!(response.body["status"], json!("Pending"));
        assert_eq!(response.body["date_assigned"], json!("2024-01-01"));
    }

    #[tokio::test]
    async fn create_assignment_rejects_unknown_staff() {
        let backend = backend();
        let report = backend.seed_task("Ship report", 1).await;
        let response = backend
            .execute(ApiRequest::post(
                "/api/assignment/",
                json!({ "staff_id": 99, "task_id": report.get() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status, 400);
        assert!(backend.assignments().await.is_empty());
    }

    #[tokio::test]
    async fn update_only_touches_fields_present() {
        let backend = backend();
        let ana = backend.seed_staff("Ana", "Analyst").await;
        let report = backend.seed_task("Ship report", 1).await;
        let id = backend.seed_assignment(ana, report, "Pending").await;

        let response = backend
            .execute(ApiRequest::put(
                format!("/api/assignment/{id}/"),
                json!({ "id": id.get(), "status": STATUS_COMPLETED }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let stored = backend.assignments().await;
        assert_eq!(stored[0].status, STATUS_COMPLETED);
        assert_eq!(stored[0].staff_id, Some(ana));
    }

    #[tokio::test]
    async fn deleting_staff_cascades_to_assignments() {
        let backend = backend();
        let ana = backend.seed_staff("Ana", "Analyst").await;
        let report = backend.seed_task("Ship report", 1).await;
        backend.seed_assignment(ana, report, "Pending").await;

        let response = backend
            .execute(ApiRequest::delete("/api/staff/", Some(json!({ "id": ana.get() }))))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert!(backend.assignments().await.is_empty());
    }

    #[rstest]
    #[case::assignment_item_get(ApiRequest::get("/api/assignment/1/"))]
    #[case::assignment_root_put(ApiRequest::put("/api/assignment/", json!({ "id": 1 })))]
    #[case::unknown_collection(ApiRequest::get("/api/project/"))]
    #[case::outside_api(ApiRequest::get("/index.html"))]
    #[tokio::test]
    async fn unsupported_routes_answer_405(#[case] request: ApiRequest) {
        let response = backend().execute(request).await.unwrap();
        assert_eq!(response.status, 405);
    }

    #[tokio::test]
    async fn forced_status_applies_to_next_mutation_only() {
        let backend = backend();
        backend.fail_next_mutation(503).await;

        let list = backend.execute(ApiRequest::get("/api/staff/")).await.unwrap();
        assert_eq!(list.status, 200);

        let first = backend
            .execute(ApiRequest::delete("/api/assignment/1/", None))
            .await
            .unwrap();
        let second = backend
            .execute(ApiRequest::delete("/api/assignment/1/", None))
            .await
            .unwrap();
        assert_eq!(first.status, 503);
        assert_eq!(second.status, 404);
        assert_eq!(backend.requests().await.len(), 3);
    }
}
