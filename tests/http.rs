use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    category: String,
    revision: u64,
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct CopyResponse {
    section: String,
    text: String,
    backend: String,
}

#[derive(Debug, Deserialize)]
struct VisitResponse {
    total: u64,
    is_new: bool,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    revision: u64,
    load_notice: Option<String>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("resume_vault_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/status")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    spawn_server_at(&unique_data_path()).await
}

async fn spawn_server_at(data_path: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_resume_vault"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_CLIPBOARD", "browser")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    #[cfg(unix)]
    cleanup::register(server.child.id());
    *guard = Some(Arc::clone(&server));
    server
}

async fn list(client: &Client, server: &TestServer, slug: &str) -> CategoryResponse {
    client
        .get(format!("{}/api/records/{slug}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create(client: &Client, server: &TestServer, slug: &str, fields: serde_json::Value) -> Record {
    let response = client
        .post(format!("{}/api/records/{slug}", server.base_url))
        .json(&serde_json::json!({ "fields": fields }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_record_lifecycle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server, "careers").await;
    let record = create(
        &client,
        &server,
        "careers",
        serde_json::json!({ "company": "Acme", "period": "2022.01~2023.01" }),
    )
    .await;
    assert_eq!(record.fields["company"], "Acme");
    assert_eq!(record.fields["salary"], "");

    let after_add = list(&client, &server, "careers").await;
    assert_eq!(after_add.category, "careers");
    assert_eq!(after_add.records.len(), before.records.len() + 1);
    assert_eq!(after_add.records.last().unwrap().id, record.id);

    let updated: CategoryResponse = client
        .patch(format!("{}/api/records/careers/{}", server.base_url, record.id))
        .json(&serde_json::json!({ "fields": { "position": "Lead" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stored = updated.records.iter().find(|r| r.id == record.id).unwrap();
    assert_eq!(stored.fields["position"], "Lead");
    assert_eq!(stored.fields["company"], "Acme");

    let ignored: CategoryResponse = client
        .patch(format!("{}/api/records/careers/does-not-exist", server.base_url))
        .json(&serde_json::json!({ "fields": { "position": "CEO" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ignored.revision, updated.revision);
    assert_eq!(ignored.records.len(), updated.records.len());

    let deleted: CategoryResponse = client
        .delete(format!("{}/api/records/careers/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted.records.len(), before.records.len());
    assert!(deleted.records.iter().all(|r| r.id != record.id));
}

#[tokio::test]
async fn http_rejects_unknown_fields_and_categories() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/records/awards", server.base_url))
        .json(&serde_json::json!({ "fields": { "hobby": "chess" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/api/records/hobbies", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_stale_revision_conflicts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let status: StatusResponse = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(status.load_notice.is_none());

    let before = list(&client, &server, "projects").await;
    let response = client
        .post(format!("{}/api/records/projects", server.base_url))
        .json(&serde_json::json!({
            "fields": { "projectName": "Atlas" },
            "expected_revision": status.revision + 100
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(list(&client, &server, "projects").await.records.len(), before.records.len());
}

#[tokio::test]
async fn http_export_and_copy() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let record = create(
        &client,
        &server,
        "certifications",
        serde_json::json!({ "type": "정보처리기사", "grade": "기사" }),
    )
    .await;

    let export = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(export.matches("[자격증]").count(), 1);
    assert!(export.contains("자격종류: 정보처리기사"));

    let copied: CopyResponse = client
        .post(format!("{}/api/copy/certifications/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(copied.section, "자격증");
    assert_eq!(copied.backend, "browser");
    assert!(copied.text.starts_with("자격종류: 정보처리기사\n자격등급: 기사"));

    let response = client
        .post(format!(
            "{}/api/copy/certifications/{}/registrationNumber",
            server.base_url, record.id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.unwrap().contains("비어있습니다"));

    let response = client
        .post(format!("{}/api/copy/certifications/{}/nope", server.base_url, record.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_visit_counts_once_per_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let signals = serde_json::json!({
        "user_agent": "integration-test",
        "language": "ko-KR",
        "screen_width": 1440,
        "screen_height": 900,
        "timezone_offset": -540,
        "canvas": "sample"
    });

    let first: VisitResponse = client
        .post(format!("{}/api/visit", server.base_url))
        .json(&signals)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let second: VisitResponse = client
        .post(format!("{}/api/visit", server.base_url))
        .json(&signals)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(first.total >= 1);
    assert!(!second.is_new);
    assert_eq!(second.total, first.total);
}

#[tokio::test]
async fn http_form_submit_edit_and_delete() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/forms/awards/submit", server.base_url))
        .form(&[("awardName", "Best Paper"), ("organization", "ACM")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let headers = response.headers().clone();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    let page = response.text().await.unwrap();
    assert!(page.contains("Best Paper"));

    let awards = list(&client, &server, "awards").await;
    let record = awards
        .records
        .iter()
        .find(|r| r.fields["awardName"] == "Best Paper")
        .expect("award saved");

    let page = client
        .post(format!("{}/forms/awards/edit/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("수상경력 수정"));

    let response = client
        .post(format!("{}/forms/awards/submit", server.base_url))
        .form(&[
            ("editing", record.id.as_str()),
            ("awardName", "Best Paper"),
            ("organization", "IEEE"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let awards = list(&client, &server, "awards").await;
    let edited = awards.records.iter().find(|r| r.id == record.id).unwrap();
    assert_eq!(edited.fields["organization"], "IEEE");
    assert_eq!(awards.records.iter().filter(|r| r.fields["awardName"] == "Best Paper").count(), 1);

    client
        .post(format!("{}/forms/awards/delete/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap();
    let awards = list(&client, &server, "awards").await;
    assert!(awards.records.iter().all(|r| r.id != record.id));
}

async fn page(client: &Client, server: &TestServer) -> String {
    client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_form_submit_from_another_mode_conflicts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let kept = create(&client, &server, "projects", serde_json::json!({ "projectName": "Keep me" })).await;
    client
        .post(format!("{}/forms/projects/edit/{}", server.base_url, kept.id))
        .send()
        .await
        .unwrap();
    let before = list(&client, &server, "projects").await;

    // A page still showing the create form posts while the category is being edited.
    let response = client
        .post(format!("{}/forms/projects/submit", server.base_url))
        .form(&[("editing", ""), ("projectName", "Brand new")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .post(format!("{}/forms/projects/submit", server.base_url))
        .form(&[("projectName", "Brand new")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let after = list(&client, &server, "projects").await;
    assert_eq!(after.revision, before.revision);
    assert_eq!(after.records.len(), before.records.len());
    let stored = after.records.iter().find(|r| r.id == kept.id).expect("record kept");
    assert_eq!(stored.fields["projectName"], "Keep me");
    assert!(page(&client, &server).await.contains("프로젝트 수정"));

    client
        .post(format!("{}/forms/projects/cancel", server.base_url))
        .send()
        .await
        .unwrap();

    // A page still showing an edit form posts after the edit was dropped.
    let response = client
        .post(format!("{}/forms/projects/submit", server.base_url))
        .form(&[("editing", kept.id.as_str()), ("projectName", "Renamed")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let after = list(&client, &server, "projects").await;
    assert_eq!(after.records.len(), before.records.len());
    assert!(after.records.iter().all(|r| r.fields["projectName"] != "Renamed"));
}

#[tokio::test]
async fn http_rejected_form_post_leaves_draft_untouched() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server, "overseas").await;
    let response = client
        .post(format!("{}/forms/overseas/submit", server.base_url))
        .form(&[("editing", ""), ("country", "Leaked"), ("hobby", "chess")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(!page(&client, &server).await.contains(r#"value="Leaked""#));
    assert_eq!(list(&client, &server, "overseas").await.records.len(), before.records.len());
}

#[tokio::test]
async fn http_deleting_the_edited_record_resets_the_form() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let record = create(&client, &server, "educations", serde_json::json!({ "courseName": "Rust" })).await;
    let html = client
        .post(format!("{}/forms/educations/edit/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("교육이력 수정"));

    let html = client
        .post(format!("{}/forms/educations/delete/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("교육이력 추가"));
    assert!(!html.contains("/forms/educations/cancel"));

    let record = create(&client, &server, "communities", serde_json::json!({ "activityName": "Meetup" })).await;
    client
        .post(format!("{}/forms/communities/edit/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap();
    assert!(page(&client, &server).await.contains("커뮤니티 활동 수정"));

    let response = client
        .delete(format!("{}/api/records/communities/{}", server.base_url, record.id))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = page(&client, &server).await;
    assert!(html.contains("커뮤니티 활동 추가"));
    assert!(!html.contains("/forms/communities/cancel"));
}

#[tokio::test]
async fn http_stale_revision_conflicts_on_update_and_delete() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let record = create(&client, &server, "it-skills", serde_json::json!({ "type": "Excel" })).await;
    let current = list(&client, &server, "it-skills").await;
    let stale = current.revision.saturating_sub(1);

    let response = client
        .patch(format!("{}/api/records/it-skills/{}", server.base_url, record.id))
        .json(&serde_json::json!({ "fields": { "type": "Word" }, "expected_revision": stale }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .delete(format!(
            "{}/api/records/it-skills/{}?expected_revision={stale}",
            server.base_url, record.id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let after = list(&client, &server, "it-skills").await;
    assert_eq!(after.revision, current.revision);
    let stored = after.records.iter().find(|r| r.id == record.id).expect("record kept");
    assert_eq!(stored.fields["type"], "Excel");

    let response = client
        .delete(format!(
            "{}/api/records/it-skills/{}?expected_revision={}",
            server.base_url, record.id, current.revision
        ))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn http_malformed_data_file_shows_load_notice() {
    let data_path = unique_data_path();
    std::fs::write(&data_path, b"{ not json").unwrap();
    let server = spawn_server_at(&data_path).await;
    let client = Client::new();

    let status: StatusResponse = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        status.load_notice.as_deref(),
        Some("저장된 데이터를 불러오는데 실패했습니다.")
    );
    assert_eq!(status.revision, 0);

    let html = page(&client, &server).await;
    assert!(html.contains(r#"<p class="notice">저장된 데이터를 불러오는데 실패했습니다.</p>"#));
    assert!(html.contains("저장된 항목 0개"));

    drop(server);
    let _ = std::fs::remove_file(&data_path);
}
