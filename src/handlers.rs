use crate::category::{Category, CategorySchema};
use crate::clipboard::{self, CopyReceipt};
use crate::errors::AppError;
use crate::format::{format_all, format_category, format_record};
use crate::form::{FormMode, Submitted};
use crate::models::{
    CategoryResponse, CopyResponse, FingerprintSignals, Record, RecordRequest, RevisionQuery,
    StatusResponse, VisitResponse, VisitorsResponse,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::store::Workbook;
use crate::ui::{render_index, IndexView, EDITING_FIELD};
use crate::visitor::{fingerprint_token, record_visit};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, Redirect},
    Form, Json,
};
use std::collections::HashMap;
use tracing::{debug, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let forms = state.forms.lock().await;
    let data = state.data.lock().await;
    Html(render_index(&IndexView {
        workbook: &data.workbook,
        forms: &forms,
        load_notice: state.load_notice.as_deref(),
    }))
}

pub async fn form_submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(mut values): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let category: Category = slug.parse()?;
    let posted = FormMode::from_posted(values.remove(EDITING_FIELD).as_deref());
    let mut forms = state.forms.lock().await;
    let form = forms.get_mut(category);
    form.expect_mode(posted)?;
    form.fill(values)?;

    let mut data = state.data.lock().await;
    match form.submit(&mut data.workbook) {
        Submitted::Created(record) => debug!(%category, id = %record.id, "form created record"),
        Submitted::Updated(id) => debug!(%category, id = %id, "form committed edit"),
    }
    persist_data(&state.data_path, &data).await?;

    Ok(back_to(category))
}

pub async fn form_edit(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let category: Category = slug.parse()?;
    let mut forms = state.forms.lock().await;
    let data = state.data.lock().await;
    let record = find_record(&data.workbook, category, &id)?;
    forms.get_mut(category).edit(record);

    Ok(back_to(category))
}

pub async fn form_cancel(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Redirect, AppError> {
    let category: Category = slug.parse()?;
    let mut forms = state.forms.lock().await;
    if let Err(err) = forms.get_mut(category).cancel() {
        debug!("{err}");
    }

    Ok(back_to(category))
}

pub async fn form_delete(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let category: Category = slug.parse()?;
    let mut forms = state.forms.lock().await;
    let mut data = state.data.lock().await;
    data.workbook.delete(category, &id);
    forms.get_mut(category).forget(&id);
    persist_data(&state.data_path, &data).await?;

    Ok(back_to(category))
}

pub async fn list_categories() -> Json<Vec<&'static CategorySchema>> {
    Json(Category::ALL.into_iter().map(Category::schema).collect())
}

pub async fn get_workbook(State(state): State<AppState>) -> Json<Workbook> {
    let data = state.data.lock().await;
    Json(data.workbook.clone())
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category: Category = slug.parse()?;
    let data = state.data.lock().await;
    Ok(Json(category_response(&data.workbook, category)))
}

pub async fn create_record(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<RecordRequest>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let category: Category = slug.parse()?;
    reject_unknown_fields(category, &payload)?;

    let mut data = state.data.lock().await;
    data.workbook.check_revision(payload.expected_revision)?;
    let record = data.workbook.add(category, &payload.fields);
    persist_data(&state.data_path, &data).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Json(payload): Json<RecordRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category: Category = slug.parse()?;
    reject_unknown_fields(category, &payload)?;

    let mut data = state.data.lock().await;
    data.workbook.check_revision(payload.expected_revision)?;
    data.workbook.update(category, &id, &payload.fields);
    persist_data(&state.data_path, &data).await?;

    Ok(Json(category_response(&data.workbook, category)))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
    Query(query): Query<RevisionQuery>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category: Category = slug.parse()?;
    let mut forms = state.forms.lock().await;
    let mut data = state.data.lock().await;
    data.workbook.check_revision(query.expected_revision)?;
    data.workbook.delete(category, &id);
    forms.get_mut(category).forget(&id);
    persist_data(&state.data_path, &data).await?;

    Ok(Json(category_response(&data.workbook, category)))
}

pub async fn export_all(State(state): State<AppState>) -> String {
    let data = state.data.lock().await;
    format_all(&data.workbook)
}

pub async fn export_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<String, AppError> {
    let category: Category = slug.parse()?;
    let data = state.data.lock().await;
    Ok(format_category(category, data.workbook.records(category), true))
}

pub async fn copy_all(State(state): State<AppState>) -> Result<Json<CopyResponse>, AppError> {
    let text = {
        let data = state.data.lock().await;
        format_all(&data.workbook)
    };
    let message = "모든 정보가 클립보드에 복사되었습니다. 이제 어디든 붙여넣기 하세요!".to_string();
    deliver(&state, "전체".to_string(), text, message).await
}

pub async fn copy_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CopyResponse>, AppError> {
    let category: Category = slug.parse()?;
    let text = {
        let data = state.data.lock().await;
        format_category(category, data.workbook.records(category), true)
    };
    let header = category.header();
    deliver(&state, header.to_string(), text, copied_section(header)).await
}

pub async fn copy_record(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<CopyResponse>, AppError> {
    let category: Category = slug.parse()?;
    let text = {
        let data = state.data.lock().await;
        format_record(category, find_record(&data.workbook, category, &id)?)
    };
    let header = category.header();
    deliver(&state, header.to_string(), text, copied_section(header)).await
}

pub async fn copy_field(
    State(state): State<AppState>,
    Path((slug, id, key)): Path<(String, String, String)>,
) -> Result<Json<CopyResponse>, AppError> {
    let category: Category = slug.parse()?;
    let field = category
        .schema()
        .field(&key)
        .ok_or_else(|| AppError::not_found(format!("{category} has no field '{key}'")))?;
    let text = {
        let data = state.data.lock().await;
        find_record(&data.workbook, category, &id)?.value(field.key).to_string()
    };
    let message = format!("{}: {}", field.label, clipboard::preview(&text));
    deliver(&state, field.label.to_string(), text, message).await
}

pub async fn visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut signals): Json<FingerprintSignals>,
) -> Result<Json<VisitResponse>, AppError> {
    if signals.user_agent.is_empty() {
        if let Some(agent) = headers.get(header::USER_AGENT).and_then(|value| value.to_str().ok()) {
            signals.user_agent = agent.to_string();
        }
    }
    let token = fingerprint_token(&signals);

    let mut data = state.data.lock().await;
    let is_new = record_visit(&mut data.visitors, &token);
    if is_new {
        persist_data(&state.data_path, &data).await?;
    }

    Ok(Json(VisitResponse {
        total: data.visitors.total_visitors,
        is_new,
    }))
}

pub async fn get_visitors(State(state): State<AppState>) -> Json<VisitorsResponse> {
    let data = state.data.lock().await;
    Json(VisitorsResponse {
        total: data.visitors.total_visitors,
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let data = state.data.lock().await;
    Json(StatusResponse {
        revision: data.workbook.revision,
        records: data.workbook.len(),
        load_notice: state.load_notice.as_deref().map(str::to_string),
    })
}

/// Validates `text` and hands it to the configured clipboard backend.
async fn deliver(
    state: &AppState,
    section: String,
    text: String,
    message: String,
) -> Result<Json<CopyResponse>, AppError> {
    let bridge = state.clipboard.clone();
    let label = section.clone();
    let payload = text.clone();
    let CopyReceipt { preview, .. } =
        tokio::task::spawn_blocking(move || clipboard::copy(bridge.as_ref(), &label, &payload))
            .await
            .map_err(AppError::internal)??;

    info!(section = %section, backend = %state.clipboard.mode(), "copied");
    Ok(Json(CopyResponse {
        section,
        text,
        message,
        preview,
        backend: state.clipboard.mode().to_string(),
    }))
}

fn copied_section(header: &str) -> String {
    format!("{header} 정보가 클립보드에 복사되었습니다.")
}

fn find_record<'a>(workbook: &'a Workbook, category: Category, id: &str) -> Result<&'a Record, AppError> {
    workbook
        .find(category, id)
        .ok_or_else(|| AppError::not_found(format!("no {category} record '{id}'")))
}

fn reject_unknown_fields(category: Category, payload: &RecordRequest) -> Result<(), AppError> {
    match category.schema().unknown_key(payload.fields.keys().map(String::as_str)) {
        Some(key) => Err(AppError::bad_request(format!("{category} has no field '{key}'"))),
        None => Ok(()),
    }
}

fn category_response(workbook: &Workbook, category: Category) -> CategoryResponse {
    CategoryResponse {
        category: category.slug().to_string(),
        revision: workbook.revision,
        records: workbook.records(category).to_vec(),
    }
}

fn back_to(category: Category) -> Redirect {
    Redirect::to(&format!("/#{}", category.slug()))
}
