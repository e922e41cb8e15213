use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    serve, Form, Json, Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use minijinja::{context, path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::answers::{AnswerRecord, FieldUpdate};
use crate::chat::ChatMessage;
use crate::constants::{self, PAGE_TITLE, SESSION_SWEEP_PERIOD};
use crate::error::QuizError;
use crate::llm_interaction::OllamaClient;
use crate::page::View;
use crate::questions::QUESTIONS;
use crate::session::{GardenSession, SessionStore};

/// Where the web UI finds its templates and static assets.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from(constants::TEMPLATE_DIR.as_str()),
            static_dir: PathBuf::from(constants::STATIC_DIR.as_str()),
        }
    }
}

// Shared application state
#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
    sessions: SessionStore,
    llm: OllamaClient,
}

// Events pushed to the chat view over its WebSocket
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ChatEvent<'a> {
    Message { message: &'a ChatMessage },
    Thinking,
    Error { error: String },
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = match &self {
            QuizError::UnknownField(_) | QuizError::UnknownOption { .. } => StatusCode::BAD_REQUEST,
            QuizError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            QuizError::AlreadySubmitted | QuizError::NotSubmitted | QuizError::ReplyPending => {
                StatusCode::CONFLICT
            }
            QuizError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QuizError::Chat(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

// Minijinja Environment setup
fn create_minijinja_env(template_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(template_dir.clone()));
        // Watch the templates directory for changes
        notifier.watch_path(&template_dir, true);
        Ok(env)
    })
}

fn render(state: &AppState, name: &str, ctx: minijinja::Value) -> Result<Html<String>, QuizError> {
    let env = state.templates.acquire_env()?;
    let template = env.get_template(name)?;
    Ok(Html(template.render(ctx)?))
}

fn page_context(id: Uuid, session: &GardenSession) -> minijinja::Value {
    match session.page.view() {
        View::Quiz => context! {
            title => PAGE_TITLE,
            session_id => id.to_string(),
            view => "quiz",
            questions => QUESTIONS,
            answers => &session.answers,
        },
        View::Chat { .. } => context! {
            title => PAGE_TITLE,
            session_id => id.to_string(),
            view => "chat",
            transcript => session
                .chat
                .as_ref()
                .map(|chat| chat.transcript().cloned().collect::<Vec<_>>())
                .unwrap_or_default(),
        },
    }
}

// Every visit to the root starts a fresh page session
async fn index_handler(State(state): State<AppState>) -> Redirect {
    let id = state.sessions.create().await;
    Redirect::to(&format!("/garden/{id}"))
}

async fn garden_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, QuizError> {
    let ctx = state
        .sessions
        .read_session(id, |session| page_context(id, session))
        .await?;
    render(&state, "index.html", ctx)
}

async fn answers_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnswerRecord>, QuizError> {
    let answers = state
        .sessions
        .read_session(id, |session| session.answers.clone())
        .await?;
    Ok(Json(answers))
}

async fn field_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<AnswerRecord>, QuizError> {
    update.validate()?;
    let answers = state
        .sessions
        .with_session(id, |session| session.update(update).cloned())
        .await??;
    Ok(Json(answers))
}

// The browser posts the whole form; its pairs are replayed onto a fresh record
async fn submit_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, QuizError> {
    let answers = AnswerRecord::from_form_pairs(pairs)?;
    let accepted = state
        .sessions
        .with_session(id, |session| session.submit(answers))
        .await?;
    if accepted {
        info!(session = %id, "Quiz submitted");
    }
    Ok(Redirect::to(&format!("/garden/{id}")))
}

async fn chat_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Option<ChatMessage>>, QuizError> {
    let reply = exchange(&state, id, request.message).await?;
    Ok(Json(reply))
}

/// Adds the user's turn (if any) and, when the model owes a reply, fetches and records it.
/// The session lock is released while the model is thinking; the reply is claimed under the
/// lock first, so only one request per session waits on the model at a time.
async fn exchange(
    state: &AppState,
    id: Uuid,
    user_text: Option<String>,
) -> Result<Option<ChatMessage>, QuizError> {
    let claimed = state
        .sessions
        .with_session(id, |session| -> Result<_, QuizError> {
            let chat = session.chat_mut()?;
            if let Some(text) = user_text.filter(|t| !t.trim().is_empty()) {
                if chat.reply_in_flight() {
                    return Err(QuizError::ReplyPending);
                }
                chat.push_user(text);
            }
            Ok(chat.begin_reply())
        })
        .await??;

    let Some(messages) = claimed else {
        return Ok(None);
    };

    // Runs detached so the claim is settled even if the client goes away mid-request
    let task_state = state.clone();
    let message = tokio::spawn(async move { finish_reply(&task_state, id, messages).await })
        .await
        .map_err(|e| QuizError::Chat(format!("reply task failed: {e}")))??;
    Ok(Some(message))
}

async fn finish_reply(
    state: &AppState,
    id: Uuid,
    messages: Vec<ChatMessage>,
) -> Result<ChatMessage, QuizError> {
    match state.llm.reply(&messages).await {
        Ok(reply) => {
            state
                .sessions
                .with_session(id, |session| {
                    session
                        .chat_mut()
                        .map(|chat| chat.push_assistant(reply).clone())
                })
                .await?
        }
        Err(e) => {
            // Sessions can be evicted while the model is thinking
            let _ = state
                .sessions
                .with_session(id, |session| {
                    if let Some(chat) = session.chat.as_mut() {
                        chat.abandon_reply();
                    }
                })
                .await;
            Err(e)
        }
    }
}

// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, QuizError> {
    // Refuse the upgrade for sessions that are missing or still on the quiz
    state
        .sessions
        .read_session(id, |session| session.chat.is_some())
        .await?
        .then_some(())
        .ok_or(QuizError::NotSubmitted)?;

    info!(session = %id, "Chat WebSocket upgrade requested");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, id)))
}

fn encode(event: &ChatEvent<'_>) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            error!("Failed to serialize chat event: {}", e);
            None
        }
    }
}

// Handle the chat view's connection
async fn handle_socket(socket: WebSocket, state: AppState, id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    // Replay the conversation so far
    let transcript = state
        .sessions
        .read_session(id, |session| {
            session
                .chat
                .as_ref()
                .map(|chat| chat.transcript().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        })
        .await
        .unwrap_or_default();
    for message in &transcript {
        if let Some(msg) = encode(&ChatEvent::Message { message }) {
            if sender.send(msg).await.is_err() {
                warn!("Chat client disconnected during replay");
                return;
            }
        }
    }

    // None asks for the reply to the quiz prompt if it is still owed
    let mut next_input: Option<String> = None;
    loop {
        let owes_reply = next_input.is_some()
            || state
                .sessions
                .read_session(id, |session| {
                    session
                        .chat
                        .as_ref()
                        .is_some_and(|chat| chat.needs_reply() && !chat.reply_in_flight())
                })
                .await
                .unwrap_or(false);
        if owes_reply {
            if let Some(msg) = encode(&ChatEvent::Thinking) {
                if sender.send(msg).await.is_err() {
                    break;
                }
            }
        }
        let event_result = exchange(&state, id, next_input.take()).await;
        let outgoing = match &event_result {
            Ok(Some(message)) => encode(&ChatEvent::Message { message }),
            Ok(None) => None,
            Err(e) => encode(&ChatEvent::Error {
                error: e.to_string(),
            }),
        };
        if let Some(msg) = outgoing {
            if sender.send(msg).await.is_err() {
                warn!("Chat client disconnected or send error. Closing connection.");
                break;
            }
        }

        // Wait for the next user turn
        let text = loop {
            match receiver.next().await {
                Some(Ok(Message::Text(text))) if !text.trim().is_empty() => break Some(text),
                Some(Ok(Message::Text(_))) => {}
                Some(Ok(Message::Close(_))) | None => break None,
                Some(Ok(Message::Binary(_))) => {
                    warn!("Received unexpected binary message from chat client")
                }
                Some(Ok(_)) => {} // Axum answers pings itself
                Some(Err(e)) => {
                    warn!("Chat WebSocket error: {}", e);
                    break None;
                }
            }
        };
        match text {
            Some(text) => next_input = Some(text),
            None => break,
        }
    }
    info!(session = %id, "Chat WebSocket closed");
}

/// Builds the web UI router: the quiz and chat pages, their JSON endpoints and static files.
pub fn router(config: &WebConfig, llm: OllamaClient, sessions: SessionStore) -> Router {
    let state = AppState {
        templates: Arc::new(create_minijinja_env(config.template_dir.clone())),
        sessions,
        llm,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/garden/:id", get(garden_handler))
        .route("/garden/:id/answers", get(answers_handler))
        .route("/garden/:id/field", post(field_handler))
        .route("/garden/:id/submit", post(submit_handler))
        .route("/garden/:id/chat", post(chat_handler))
        .route("/garden/:id/ws", get(ws_handler))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

// Stops the idle-session sweep when the server future is dropped or returns
struct SweeperGuard(JoinHandle<()>);

impl Drop for SweeperGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub async fn start_web_server(port: u16, config: WebConfig, llm: OllamaClient) -> Result<()> {
    info!(model = llm.model(), "Chat view will use model");
    let sessions = SessionStore::new();
    let max_idle = Duration::from_secs(*constants::SESSION_IDLE_SECS);
    info!(?max_idle, "Idle garden sessions will be evicted");
    let _sweeper = SweeperGuard(sessions.spawn_sweeper(max_idle, SESSION_SWEEP_PERIOD));
    let app = router(&config, llm, sessions);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
