use std::str::FromStr;

use common::{
    EditorView, ErrorBody, OutcomesTable, ReorderPayload, SaveResponse, TextPayload, PAGE_TITLE,
};
use outcomes::{
    ChoiceId, Messages, Outcome, OutcomeEditorSession, OutcomeId, SaveOutcome, SessionError,
};
use rocket::{
    http::{CookieJar, Status},
    serde::{json::Json, Deserialize},
    State,
};
use tracing::warn;

use crate::editors::{client_id, Editors};

#[derive(Debug, Default, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct WebConfig {
    #[serde(default)]
    pub messages: Messages,
}

#[derive(Debug, Responder)]
pub enum ApiError {
    #[response(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[response(status = 404)]
    NotFound(Json<ErrorBody>),
    #[response(status = 409)]
    Conflict(Json<ErrorBody>),
}

impl ApiError {
    fn body(error: impl ToString) -> Json<ErrorBody> {
        Json(ErrorBody {
            error: error.to_string(),
        })
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(ApiError::body(err))
        } else {
            warn!(error = %err, "editor intent refused");
            ApiError::Conflict(ApiError::body(err))
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_id<T: FromStr>(raw: &str) -> ApiResult<T> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(ApiError::body(format!("Invalid id: {}", raw))))
}

/// Applies one intent to the caller's session and returns the new view.
fn command<T>(
    cookies: &CookieJar<'_>,
    editors: &Editors,
    config: &WebConfig,
    intent: impl FnOnce(&mut OutcomeEditorSession) -> Result<T, SessionError>,
) -> ApiResult<Json<EditorView>> {
    let client = client_id(cookies);
    editors.with_session(&client, |session| -> ApiResult<Json<EditorView>> {
        intent(session)?;
        Ok(Json(EditorView::new(session, &config.messages)))
    })
}

#[get("/")]
pub fn index(cookies: &CookieJar<'_>) -> &'static str {
    client_id(cookies);
    PAGE_TITLE
}

#[get("/outcomes")]
pub fn outcomes_list(editors: &State<Editors>) -> Json<OutcomesTable> {
    Json(OutcomesTable::new(&editors.store().list()))
}

#[get("/outcomes/<id>")]
pub fn outcome(editors: &State<Editors>, id: &str) -> ApiResult<Json<Outcome>> {
    let outcome = editors
        .store()
        .get(parse_id(id)?)
        .map_err(SessionError::from)?;
    Ok(Json(outcome))
}

#[post("/outcomes/reset")]
pub fn reset(editors: &State<Editors>) -> Status {
    editors.reset();
    Status::NoContent
}

#[get("/editor")]
pub fn editor(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |_| Ok(()))
}

#[post("/editor/create")]
pub fn open_for_create(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |session| session.open_for_create())
}

#[post("/editor/view/<id>")]
pub fn open_for_view(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    id: &str,
) -> ApiResult<Json<EditorView>> {
    let id: OutcomeId = parse_id(id)?;
    command(cookies, editors, config, |session| session.open_for_view(id))
}

#[post("/editor/edit/<id>")]
pub fn open_for_edit(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    id: &str,
) -> ApiResult<Json<EditorView>> {
    let id: OutcomeId = parse_id(id)?;
    command(cookies, editors, config, |session| session.open_for_edit(id))
}

#[post("/editor/edit")]
pub fn switch_to_edit(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |session| session.switch_to_edit())
}

#[put("/editor/name", data = "<payload>")]
pub fn set_name(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    payload: Json<TextPayload>,
) -> ApiResult<Json<EditorView>> {
    let text = payload.into_inner().text;
    command(cookies, editors, config, |session| session.set_name(text))
}

#[post("/editor/choices")]
pub fn begin_add_choice(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |session| session.begin_add_choice())
}

#[post("/editor/choices/<id>/edit")]
pub fn begin_edit_choice(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    id: &str,
) -> ApiResult<Json<EditorView>> {
    let id: ChoiceId = parse_id(id)?;
    command(cookies, editors, config, |session| session.begin_edit_choice(id))
}

#[delete("/editor/choices/<id>")]
pub fn delete_choice(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    id: &str,
) -> ApiResult<Json<EditorView>> {
    let id: ChoiceId = parse_id(id)?;
    command(cookies, editors, config, |session| session.delete_choice(id))
}

#[post("/editor/choices/<id>/move", data = "<payload>")]
pub fn reorder(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    id: &str,
    payload: Json<ReorderPayload>,
) -> ApiResult<Json<EditorView>> {
    let id: ChoiceId = parse_id(id)?;
    let before = payload.into_inner().before;
    command(cookies, editors, config, |session| session.reorder(id, before))
}

#[put("/editor/pending", data = "<payload>")]
pub fn set_pending_text(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    payload: Json<TextPayload>,
) -> ApiResult<Json<EditorView>> {
    let text = payload.into_inner().text;
    command(cookies, editors, config, |session| session.set_pending_text(text))
}

#[post("/editor/pending/confirm")]
pub fn confirm_pending_choice(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |session| {
        session.confirm_pending_choice()
    })
}

#[delete("/editor/pending")]
pub fn cancel_pending_choice(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |session| {
        session.cancel_pending_choice()
    })
}

#[post("/editor/save")]
pub fn attempt_save(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<(Status, Json<SaveResponse>)> {
    let client = client_id(cookies);
    editors.with_session(&client, |session| -> ApiResult<(Status, Json<SaveResponse>)> {
        let response = match session.attempt_save()? {
            SaveOutcome::Saved(outcome) => (Status::Ok, Json(SaveResponse::Saved { outcome })),
            SaveOutcome::Rejected(errors) => (
                Status::UnprocessableEntity,
                Json(SaveResponse::Rejected {
                    errors,
                    feedback: session.feedback(&config.messages),
                }),
            ),
        };
        Ok(response)
    })
}

#[post("/editor/cancel")]
pub fn cancel(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |session| {
        session.cancel();
        Ok(())
    })
}

#[post("/editor/delete/<id>")]
pub fn request_delete(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    id: &str,
) -> ApiResult<Json<EditorView>> {
    let id: OutcomeId = parse_id(id)?;
    command(cookies, editors, config, |session| session.request_delete(id))
}

#[post("/editor/delete/<id>/confirm")]
pub fn confirm_delete(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
    id: &str,
) -> ApiResult<Json<EditorView>> {
    let id: OutcomeId = parse_id(id)?;
    command(cookies, editors, config, |session| session.confirm_delete(id))
}

#[delete("/editor/delete")]
pub fn cancel_delete(
    cookies: &CookieJar<'_>,
    editors: &State<Editors>,
    config: &State<WebConfig>,
) -> ApiResult<Json<EditorView>> {
    command(cookies, editors, config, |session| session.cancel_delete())
}
