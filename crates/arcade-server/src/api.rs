use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;

use arcade_core::employee::Employee;
use arcade_core::score::ScoreEntry;

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::SettingsDocument;

/// POST /api/auth — admin login, or logout when the body carries
/// `{"action": "logout"}`.
pub async fn post_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if body.get("action").and_then(Value::as_str) == Some("logout") {
        auth::close_session(&state, &headers).await;
        return Ok(Json(serde_json::json!({ "status": "logged_out" })));
    }

    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    if !auth::password_matches(&state, password) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = auth::open_session(&state).await;
    tracing::info!("admin session opened");
    Ok(Json(serde_json::json!({ "status": "ok", "token": token })))
}

#[derive(Debug, Serialize)]
pub struct AuthProbeResponse {
    pub authenticated: bool,
}

/// GET /api/auth — does the presented bearer token hold an admin session.
pub async fn get_auth(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthProbeResponse> {
    Json(AuthProbeResponse {
        authenticated: auth::is_admin(&state, &headers).await,
    })
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub status: &'static str,
}

const OK: OkResponse = OkResponse { status: "ok" };

/// POST /api/settings — replace the settings document. Admin only.
pub async fn post_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(settings): Json<SettingsDocument>,
) -> Result<Json<OkResponse>, AppError> {
    auth::require_admin(&state, &headers).await?;
    state.store.replace_settings(&settings).await.map_err(|e| {
        tracing::error!(error = %e, "settings write failed");
        AppError::Internal("Failed to save settings".to_string())
    })?;
    Ok(Json(OK))
}

/// POST /api/employees — replace the roster. Admin only; the payload is
/// validated in full before anything touches disk.
pub async fn post_employees(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<OkResponse>, AppError> {
    auth::require_admin(&state, &headers).await?;
    let employees = normalize_employees(&body)?;
    state.store.replace_employees(&employees).await.map_err(|e| {
        tracing::error!(error = %e, "employee roster write failed");
        AppError::Internal("Failed to save employees".to_string())
    })?;
    Ok(Json(OK))
}

fn normalize_employees(body: &Value) -> Result<Vec<Employee>, AppError> {
    let invalid = || AppError::BadRequest("Invalid employee payload".to_string());
    let items = body.as_array().ok_or_else(invalid)?;

    let mut employees = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or_else(invalid)?;
        let id = obj
            .get("id")
            .and_then(Value::as_u64)
            .map(|n| n as u32)
            .unwrap_or(index as u32 + 1);
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
            .to_string();
        let avatar = obj
            .get("avatar")
            .and_then(Value::as_str)
            .map(str::to_string);
        employees.push(Employee { id, name, avatar });
    }
    Ok(employees)
}

/// POST /api/scores — append one finished session to the leaderboard.
pub async fn post_score(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<OkResponse>, AppError> {
    let player_id = body.get("playerId").and_then(Value::as_u64);
    let player_name = body.get("playerName").and_then(Value::as_str);
    let score = body
        .get("score")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));
    let date = body.get("date").and_then(Value::as_str);

    let (Some(player_id), Some(player_name), Some(score), Some(date)) =
        (player_id, player_name, score, date)
    else {
        return Err(AppError::BadRequest("Invalid payload".to_string()));
    };

    let entry = ScoreEntry {
        player_id: player_id as u32,
        player_name: player_name.to_string(),
        score,
        date: date.to_string(),
    };
    state.store.append_score(entry).await.map_err(|e| {
        tracing::error!(error = %e, "score write failed");
        AppError::Internal("Failed to save score".to_string())
    })?;
    Ok(Json(OK))
}

#[derive(Debug, Serialize)]
pub struct ScoresResponse {
    pub scores: Vec<ScoreEntry>,
}

/// GET /api/scores — the whole board, oldest first. An arcade that has
/// never been played returns an empty list, not an error.
pub async fn get_scores(State(state): State<AppState>) -> Json<ScoresResponse> {
    Json(ScoresResponse {
        scores: state.store.scores().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthFileConfig, ServerConfig};
    use serde_json::json;

    fn make_state(dir: &tempfile::TempDir) -> AppState {
        AppState::new(ServerConfig {
            data_dir: dir.path().display().to_string(),
            auth: AuthFileConfig {
                admin_password_sha256: Some(auth::digest("letmein")),
            },
            ..ServerConfig::default()
        })
    }

    async fn admin_headers(state: &AppState) -> HeaderMap {
        let response = post_auth(
            State(state.clone()),
            HeaderMap::new(),
            Json(json!({"password": "letmein"})),
        )
        .await
        .expect("login");
        let token = response.0["token"].as_str().expect("token").to_string();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn login_issues_a_usable_token() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);
        let headers = admin_headers(&state).await;

        let probe = get_auth(State(state), headers).await;
        assert!(probe.0.authenticated);
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);
        let result = post_auth(
            State(state.clone()),
            HeaderMap::new(),
            Json(json!({"password": "guess"})),
        )
        .await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized(_)));

        let missing = post_auth(State(state), HeaderMap::new(), Json(json!({}))).await;
        assert!(matches!(missing.unwrap_err(), AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_invalidates_the_token() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);
        let headers = admin_headers(&state).await;

        let response = post_auth(
            State(state.clone()),
            headers.clone(),
            Json(json!({"action": "logout"})),
        )
        .await
        .unwrap();
        assert_eq!(response.0["status"], "logged_out");

        let probe = get_auth(State(state), headers).await;
        assert!(!probe.0.authenticated);
    }

    #[tokio::test]
    async fn settings_write_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);

        let result = post_settings(
            State(state.clone()),
            HeaderMap::new(),
            Json(SettingsDocument::default()),
        )
        .await;
        assert!(matches!(result.unwrap_err(), AppError::Forbidden(_)));
        // Rejected before any write
        assert!(!dir.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn settings_write_replaces_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);
        let headers = admin_headers(&state).await;

        let settings = SettingsDocument {
            theme: json!({"primary": "#123456"}),
            game_order: Vec::new(),
        };
        post_settings(State(state.clone()), headers, Json(settings))
            .await
            .expect("settings saved");

        let stored = state.store.settings().await;
        assert_eq!(stored.theme["primary"], "#123456");
    }

    #[tokio::test]
    async fn malformed_employee_payload_is_rejected_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);
        let headers = admin_headers(&state).await;

        let result = post_employees(
            State(state.clone()),
            headers.clone(),
            Json(json!({"not": "an array"})),
        )
        .await;
        assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));

        let result = post_employees(State(state), headers, Json(json!([1, 2, 3]))).await;
        assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
        assert!(!dir.path().join("employees.json").exists());
    }

    #[tokio::test]
    async fn employee_roster_is_normalized_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);
        let headers = admin_headers(&state).await;

        let payload = json!([
            {"id": 7, "name": "  Ada  ", "avatar": "ada.png"},
            {"name": ""},
            {}
        ]);
        post_employees(State(state.clone()), headers, Json(payload))
            .await
            .expect("roster saved");

        let roster = state.store.employees().await;
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].id, 7);
        assert_eq!(roster[0].name, "Ada");
        assert_eq!(roster[0].avatar.as_deref(), Some("ada.png"));
        assert_eq!(roster[1].id, 2);
        assert_eq!(roster[1].name, "Unknown");
        assert_eq!(roster[2].id, 3);
        assert!(roster[2].avatar.is_none());
    }

    #[tokio::test]
    async fn score_save_rejects_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);

        let result = post_score(
            State(state.clone()),
            Json(json!({"playerId": 1, "playerName": "Ada"})),
        )
        .await;
        assert!(
            matches!(result.unwrap_err(), AppError::BadRequest(msg) if msg == "Invalid payload")
        );
        assert!(!dir.path().join("scores.json").exists());
    }

    #[tokio::test]
    async fn score_append_preserves_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);

        for (name, score) in [("Ada", 120), ("Bo", 95)] {
            post_score(
                State(state.clone()),
                Json(json!({
                    "playerId": 1,
                    "playerName": name,
                    "score": score,
                    "date": "2026-02-14"
                })),
            )
            .await
            .expect("score saved");
        }

        let board = get_scores(State(state)).await;
        let names: Vec<&str> = board.0.scores.iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bo"]);
        assert_eq!(board.0.scores[0].score, 120);
    }

    #[tokio::test]
    async fn fractional_scores_are_floored() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);

        post_score(
            State(state.clone()),
            Json(json!({
                "playerId": 3,
                "playerName": "Cy",
                "score": 72.9,
                "date": "2026-02-14"
            })),
        )
        .await
        .expect("score saved");

        let board = get_scores(State(state)).await;
        assert_eq!(board.0.scores[0].score, 72);
    }

    #[tokio::test]
    async fn empty_arcade_returns_empty_board() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(&dir);
        let board = get_scores(State(state)).await;
        assert!(board.0.scores.is_empty());
    }
}
