//! HTTP service: the chat endpoint and the page shell.
//!
//! `POST /api/chat` takes `{query}`, generates a grounded answer, annotates
//! it and returns the raw text, the server-rendered HTML and the grounding
//! metadata. `GET /` serves the page shell that drives the endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::adapters::{GenerateError, Generator};
use crate::grounding::{annotate_answer, GroundingMetadata};
use crate::render;

/// Shared service state
pub struct Engine {
    pub generator: Arc<dyn Generator>,
}

type SharedState = Arc<Engine>;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// The raw answer text
    pub answer_text: String,
    /// The annotated answer, rendered server-side
    pub answer_html: String,
    /// Raw grounding metadata, for clients that re-annotate themselves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<GenerateError> for ApiError {
    fn from(error: GenerateError) -> Self {
        let status = match error {
            GenerateError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GenerateError::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
            GenerateError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

async fn chat(
    State(engine): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let generated = engine
        .generator
        .generate(&request.query)
        .await
        .map_err(|error| {
            warn!(generator = engine.generator.name(), error = %error, "generation failed");
            ApiError::from(error)
        })?;

    let fragments = annotate_answer(&generated.answer, generated.grounding.as_ref());
    let answer_html = render::render_fragments(&fragments);

    info!(
        fragments = fragments.len(),
        citations = fragments.iter().filter(|f| f.is_citation()).count(),
        "answered query"
    );

    Ok(Json(ChatResponse {
        answer_text: generated.answer,
        answer_html,
        grounding_metadata: generated.grounding,
    }))
}

async fn home() -> impl IntoResponse {
    Html(HOME_PAGE)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "groundcite" }))
}

/// Build the service router
pub fn build_router(engine: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/chat", post(chat))
        .route("/healthz", get(health))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until ctrl-c/SIGTERM
pub async fn serve(engine: Engine, addr: SocketAddr) -> Result<()> {
    let router = build_router(Arc::new(engine));

    info!(%addr, "Binding HTTP listener");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>groundcite &bull; Grounded Q&amp;A</title>
    <style>
      body { font-family: system-ui, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
      main { max-width: 46rem; margin: 0 auto; padding: 3rem 1rem; }
      h1 { letter-spacing: -0.02em; margin-bottom: 0.25rem; }
      .lede { color: #475569; margin-top: 0; }
      form { display: flex; gap: 0.5rem; margin: 2rem 0; }
      input { flex: 1; padding: 0.6rem 0.8rem; border: 1px solid #cbd5e1; border-radius: 0.5rem; font-size: 1rem; }
      button { padding: 0.6rem 1.2rem; border: 0; border-radius: 0.5rem; background: #0369a1; color: #fff; font-size: 1rem; cursor: pointer; }
      button:disabled { opacity: 0.6; cursor: wait; }
      #error { display: none; background: #fef2f2; border-left: 4px solid #f87171; color: #b91c1c; padding: 0.8rem 1rem; border-radius: 0.25rem; margin-bottom: 1.5rem; }
      section { display: none; background: #fff; border: 1px solid #e2e8f0; border-radius: 0.75rem; padding: 1.5rem; margin-bottom: 1.5rem; }
      section h3 { margin-top: 0; }
      #answer { line-height: 1.6; }
      details.citation { display: inline; }
      .citation-trigger { display: inline; cursor: pointer; background: #e0f2fe; color: #075985; border-radius: 0.25rem; padding: 0 0.15rem; font-weight: 600; list-style: none; }
      .citation-trigger::-webkit-details-marker { display: none; }
      .citation-panel { margin: 0.5rem 0; padding: 1rem; background: #f8fafc; border: 1px solid #e2e8f0; border-radius: 0.5rem; }
      .citation-panel h4 { margin: 0 0 0.5rem; }
      .citation-source { margin-bottom: 1rem; }
      .citation-source:last-child { margin-bottom: 0; }
      .citation-source-title { margin: 0 0 0.25rem; font-weight: 500; }
      .citation-source a { font-size: 0.85rem; color: #0369a1; }
      .citation-source iframe { display: block; width: 100%; aspect-ratio: 16 / 9; border: 0; margin-top: 0.5rem; background: #e2e8f0; border-radius: 0.25rem; }
      .citation-empty { color: #64748b; font-size: 0.85rem; }
      #queries ul { margin: 0; padding-left: 1.25rem; }
    </style>
  </head>
  <body>
    <main>
      <h1>Grounded Q&amp;A</h1>
      <p class="lede">Ask me anything, and I'll provide grounded answers</p>
      <form id="ask-form">
        <input id="query" type="text" placeholder="Enter your question..." required />
        <button id="ask-button" type="submit">Ask</button>
      </form>
      <div id="error"></div>
      <section id="answer-card"><h3>Answer</h3><div id="answer"></div></section>
      <section id="insights-card"><h3>Search Insights</h3><div id="insights"></div></section>
      <section id="queries-card"><h3>Search Queries Used</h3><div id="queries"></div></section>
    </main>
    <script>
      const form = document.getElementById('ask-form');
      const button = document.getElementById('ask-button');
      const errorBox = document.getElementById('error');

      function reset() {
        errorBox.style.display = 'none';
        for (const id of ['answer-card', 'insights-card', 'queries-card']) {
          document.getElementById(id).style.display = 'none';
        }
      }

      function showError(message) {
        errorBox.textContent = message;
        errorBox.style.display = 'block';
      }

      form.addEventListener('submit', async (event) => {
        event.preventDefault();
        reset();
        button.disabled = true;
        try {
          const res = await fetch('/api/chat', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ query: document.getElementById('query').value }),
          });
          const data = await res.json();
          if (!res.ok || data.error) {
            showError(data.error || 'An error occurred. Please try again.');
            return;
          }
          document.getElementById('answer').innerHTML = data.answerHtml;
          document.getElementById('answer-card').style.display = 'block';
          const metadata = data.groundingMetadata;
          if (metadata && metadata.searchEntryPoint && metadata.searchEntryPoint.renderedContent) {
            document.getElementById('insights').innerHTML = metadata.searchEntryPoint.renderedContent;
            document.getElementById('insights-card').style.display = 'block';
          }
          if (metadata && metadata.webSearchQueries && metadata.webSearchQueries.length > 0) {
            const list = document.createElement('ul');
            for (const query of metadata.webSearchQueries) {
              const item = document.createElement('li');
              item.textContent = query;
              list.appendChild(item);
            }
            const queries = document.getElementById('queries');
            queries.replaceChildren(list);
            document.getElementById('queries-card').style.display = 'block';
          }
        } catch (err) {
          showError('An error occurred. Please try again.');
        } finally {
          button.disabled = false;
        }
      });
    </script>
  </body>
</html>
"#;
