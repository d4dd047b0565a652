// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI for Sortwise: intake forms, category browser and organize button

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::categories::Category;
use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::host::guess_mime;
use crate::host::local::{Approver, PathPicker};
use crate::intake::UploadedFile;
use crate::ollama::{OllamaClient, TextOracle};
use crate::orchestrator::Orchestrator;
use crate::session::{format_bytes, OrganizedFile, Session, SessionView};

/// Shown while a flow holds the session
pub const BUSY_MESSAGE: &str = "Classifying files... the model is thinking.";

/// Shared application state
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub config: AppConfig,
    pub session: Mutex<Session>,
    /// Set for the duration of a confirmed organize request
    write_confirmed: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: AppConfig) -> Self {
        Self {
            orchestrator,
            config,
            session: Mutex::new(Session::new()),
            write_confirmed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Write access is granted only while the user's confirmation is in hand
    fn approver(&self) -> Approver {
        let confirmed = self.write_confirmed.clone();
        Arc::new(move |_: &Path| confirmed.load(Ordering::SeqCst))
    }

    /// Orchestrator with a picker for the folder typed into the form
    fn folder_orchestrator(&self, path: &str) -> Orchestrator {
        if !self.config.web.allow_folder_pick {
            return self.orchestrator.clone();
        }
        let path = Some(PathBuf::from(path.trim()));
        self.orchestrator
            .clone()
            .with_picker(Arc::new(PathPicker::new(path, self.approver())))
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.web.max_upload_bytes;

    Router::new()
        // Pages and form actions
        .route("/", get(index_page))
        .route("/upload", post(upload_files))
        .route("/folder", post(select_folder))
        .route("/organize", post(organize_files))
        .route("/reset", post(reset_session))
        // API endpoints
        .route("/api/session", get(api_get_session))
        .route("/api/categories", get(api_get_categories))
        .route("/api/files", get(api_get_files))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Page Handlers ===

#[derive(Deserialize)]
struct PageQuery {
    category: Option<String>,
}

async fn index_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let selected = query.category.as_deref().and_then(Category::parse_exact);

    match state.session.try_lock() {
        Ok(session) => Html(render_index(&session, selected, &state.config)),
        Err(_) => Html(render_busy()),
    }
}

async fn upload_files(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Rejected upload: {}", e);
                return (e.status(), e.body_text()).into_response();
            }
        };

        if field.name() != Some("files") {
            continue;
        }
        let name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let mime = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(&name));

        match field.bytes().await {
            Ok(bytes) => files.push(UploadedFile::new(name, mime, bytes.to_vec())),
            Err(e) => {
                warn!("Rejected upload of {:?}: {}", name, e);
                return (e.status(), e.body_text()).into_response();
            }
        }
    }

    let mut session = state.session.lock().await;
    let summary = state.orchestrator.upload(&mut session, files).await;
    info!(
        "Upload finished: {} classified, {} failed",
        summary.classified, summary.failed
    );

    Redirect::to("/").into_response()
}

#[derive(Deserialize)]
struct FolderForm {
    #[serde(default)]
    path: String,
}

async fn select_folder(State(state): State<Arc<AppState>>, Form(form): Form<FolderForm>) -> Redirect {
    let orchestrator = state.folder_orchestrator(&form.path);

    let mut session = state.session.lock().await;
    match orchestrator.select_folder(&mut session).await {
        Ok(outcome) => debug!("Folder selection: {:?}", outcome),
        Err(e) => warn!("Folder selection failed: {}", e),
    }

    Redirect::to("/")
}

#[derive(Deserialize)]
struct OrganizeForm {
    confirm: Option<String>,
}

async fn organize_files(
    State(state): State<Arc<AppState>>,
    Form(form): Form<OrganizeForm>,
) -> Redirect {
    let mut session = state.session.lock().await;

    state.write_confirmed.store(form.confirm.is_some(), Ordering::SeqCst);
    let result = state.orchestrator.organize(&mut session).await;
    state.write_confirmed.store(false, Ordering::SeqCst);

    match result {
        Ok(Some(report)) => info!("Organize finished: {:?}", report),
        Ok(None) => debug!("Nothing to organize"),
        Err(e) => warn!("Organize failed: {}", e),
    }

    Redirect::to("/")
}

async fn reset_session(State(state): State<Arc<AppState>>) -> Redirect {
    state.session.lock().await.reset();
    Redirect::to("/")
}

// === API Handlers ===

fn busy_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "busy": true, "message": BUSY_MESSAGE })),
    )
        .into_response()
}

async fn api_get_session(State(state): State<Arc<AppState>>) -> Response {
    match state.session.try_lock() {
        Ok(session) => Json(SessionView::from(&*session)).into_response(),
        Err(_) => busy_response(),
    }
}

#[derive(Serialize)]
struct CategoryCount {
    category: Category,
    count: usize,
}

async fn api_get_categories(State(state): State<Arc<AppState>>) -> Response {
    let session = match state.session.try_lock() {
        Ok(session) => session,
        Err(_) => return busy_response(),
    };

    let counts: Vec<CategoryCount> = session
        .grouped()
        .into_iter()
        .map(|group| CategoryCount {
            category: group.category,
            count: group.files.len(),
        })
        .collect();
    Json(counts).into_response()
}

#[derive(Deserialize)]
struct FilesQuery {
    category: Option<String>,
}

async fn api_get_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilesQuery>,
) -> Response {
    let category = match query.category.as_deref().map(str::parse::<Category>) {
        None => None,
        Some(Ok(category)) => Some(category),
        Some(Err(e)) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let session = match state.session.try_lock() {
        Ok(session) => session,
        Err(_) => return busy_response(),
    };

    let files: Vec<&OrganizedFile> = session
        .files()
        .iter()
        .filter(|f| category.map_or(true, |c| f.category() == c))
        .collect();
    Json(files).into_response()
}

// === Template Rendering ===

/// Escape text for use in HTML content and attribute values
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn base_template(title: &str, head_extra: &str, content: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {}
    <title>{} - Sortwise</title>
    <style>
        :root {{
            --bg-primary: #0f172a;
            --bg-secondary: #1e293b;
            --bg-card: #1e293b;
            --text-primary: #e2e8f0;
            --text-secondary: #94a3b8;
            --accent: #38bdf8;
            --warning: #fbbf24;
            --danger: #f87171;
            --success: #34d399;
            --border: #334155;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; padding: 20px; }}
        nav {{
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 30px;
            border-bottom: 1px solid var(--border);
        }}
        nav .logo {{
            font-size: 1.5em;
            font-weight: bold;
            color: var(--accent);
            text-decoration: none;
        }}
        nav a {{ color: var(--text-secondary); text-decoration: none; }}
        nav a:hover {{ color: var(--text-primary); }}
        nav form {{ margin-left: auto; }}
        .card {{
            background: var(--bg-card);
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .card h2 {{ margin-bottom: 15px; color: var(--accent); }}
        .intake {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
            gap: 20px;
        }}
        .muted {{ color: var(--text-secondary); font-size: 0.9em; }}
        .alert {{ padding: 12px; border-radius: 8px; margin-bottom: 20px; text-align: center; }}
        .alert-error {{ background: rgba(248,113,113,0.2); color: var(--danger); }}
        .alert-success {{ background: rgba(52,211,153,0.2); color: var(--success); }}
        .status {{ text-align: center; margin: 40px 0; color: var(--accent); font-size: 1.2em; }}
        .organize {{ text-align: center; }}
        .organize strong {{ color: var(--warning); }}
        code {{ color: var(--accent); background: var(--bg-primary); padding: 2px 6px; border-radius: 4px; }}
        button {{
            background: var(--accent);
            color: var(--bg-primary);
            border: none;
            padding: 8px 18px;
            border-radius: 6px;
            font-weight: 600;
            cursor: pointer;
        }}
        button.secondary {{ background: var(--border); color: var(--text-primary); }}
        input[type=text] {{
            width: 100%;
            padding: 8px;
            margin: 8px 0;
            background: var(--bg-primary);
            color: var(--text-primary);
            border: 1px solid var(--border);
            border-radius: 6px;
        }}
        .browser {{ display: grid; grid-template-columns: 1fr 3fr; gap: 20px; }}
        .sidebar ul {{ list-style: none; }}
        .sidebar a {{
            display: flex;
            justify-content: space-between;
            padding: 6px 10px;
            border-radius: 6px;
            color: var(--text-secondary);
            text-decoration: none;
        }}
        .sidebar a:hover {{ color: var(--text-primary); }}
        .sidebar a.selected {{ background: rgba(56,189,248,0.2); color: var(--accent); }}
        .count {{ font-family: monospace; font-size: 0.8em; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ padding: 12px; text-align: left; border-bottom: 1px solid var(--border); }}
        th {{ color: var(--text-secondary); font-weight: 500; }}
        tr:hover {{ background: rgba(255,255,255,0.05); }}
        .empty {{ text-align: center; padding: 60px 0; color: var(--text-secondary); }}
    </style>
</head>
<body>
    <nav>
        <a href="/" class="logo">Sortwise</a>
        <a href="/">Browse</a>
        <a href="/api/session">API</a>
        <form method="post" action="/reset"><button class="secondary" type="submit">Reset</button></form>
    </nav>
    <main class="container">
        {}
    </main>
</body>
</html>"#, head_extra, escape_html(title), content)
}

fn render_busy() -> String {
    let content = format!(r#"<div class="status" role="status">{}</div>"#, BUSY_MESSAGE);
    base_template(
        "Working",
        r#"<meta http-equiv="refresh" content="2">"#,
        &content,
    )
}

fn render_index(session: &Session, selected: Option<Category>, config: &AppConfig) -> String {
    let mut content = render_intake(config);

    if let Some(error) = session.error() {
        content.push_str(&format!(
            r#"<div class="alert alert-error" role="alert">{}</div>"#,
            escape_html(error)
        ));
    }
    if let Some(notice) = session.notice() {
        content.push_str(&format!(
            r#"<div class="alert alert-success" role="status">{}</div>"#,
            escape_html(notice)
        ));
    }

    if let (true, Some(dir)) = (session.can_organize(), session.directory_name()) {
        content.push_str(&render_organize(dir));
    }

    content.push_str(&render_browser(session, selected));

    base_template("Organizer", "", &content)
}

fn render_intake(config: &AppConfig) -> String {
    let folder_form = if config.web.allow_folder_pick {
        r#"
                <form method="post" action="/folder">
                    <input type="text" name="path" placeholder="/path/to/folder">
                    <button type="submit">Select Folder</button>
                </form>"#
            .to_string()
    } else {
        format!(r#"<p class="muted">{}</p>"#, crate::error::UNSUPPORTED_MESSAGE)
    };

    format!(r#"
        <div class="intake">
            <div class="card">
                <h2>Upload Files</h2>
                <p class="muted">Files are classified by name only and are never written anywhere.</p>
                <form method="post" action="/upload" enctype="multipart/form-data">
                    <input type="file" name="files" multiple>
                    <button type="submit">Classify</button>
                </form>
            </div>
            <div class="card">
                <h2>Organize a Folder</h2>
                <p class="muted">The files directly inside the folder are classified and can then be moved into category subfolders.</p>
                {}
            </div>
        </div>
    "#, folder_form)
}

fn render_organize(dir: &str) -> String {
    format!(r#"
        <div class="card organize">
            <h2>Ready to Organize?</h2>
            <p class="muted">Review the classifications below. Organizing will create subfolders within
            <code>{}</code> and move these files. <strong>This action will modify files on your computer.</strong></p>
            <form method="post" action="/organize">
                <label><input type="checkbox" name="confirm" value="yes"> Allow writing to this folder</label>
                <button type="submit">Organize Files on Disk</button>
            </form>
        </div>
    "#, escape_html(dir))
}

fn render_browser(session: &Session, selected: Option<Category>) -> String {
    let groups = session.grouped();

    let sidebar: String = groups
        .iter()
        .map(|group| {
            let class = if Some(group.category) == selected { "selected" } else { "" };
            format!(
                r#"<li><a class="{}" href="/?category={}"><span>{}</span><span class="count">{}</span></a></li>"#,
                class,
                group.category,
                group.category,
                group.files.len()
            )
        })
        .collect();

    let main = match selected {
        Some(category) => {
            let files: Vec<&OrganizedFile> = groups
                .iter()
                .find(|g| g.category == category)
                .map(|g| g.files.clone())
                .unwrap_or_default();
            render_file_list(category, &files)
        }
        None => r#"
            <div class="empty">
                <p>Select a category to view files</p>
                <p class="muted">Upload some files or select a local folder to get started!</p>
            </div>"#
            .to_string(),
    };

    format!(r#"
        <div class="browser">
            <div class="card sidebar">
                <h2>Categories</h2>
                <ul>{}</ul>
            </div>
            <div class="card">{}</div>
        </div>
    "#, sidebar, main)
}

fn render_file_list(category: Category, files: &[&OrganizedFile]) -> String {
    if files.is_empty() {
        return format!(
            r#"<h2>{}</h2><div class="empty"><p>This folder is empty.</p></div>"#,
            category
        );
    }

    let rows: String = files
        .iter()
        .map(|f| {
            format!(
                r#"<tr><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape_html(f.name()),
                escape_html(f.mime()),
                format_bytes(f.size())
            )
        })
        .collect();

    format!(r#"
        <h2>{}</h2>
        <table>
            <tr><th>Name</th><th>Type</th><th>Size</th></tr>
            {}
        </table>
    "#, category, rows)
}

/// Start the web server backed by the configured Ollama engine
pub async fn start_server(config: AppConfig) -> crate::Result<()> {
    let client = OllamaClient::new(&config.ai_engine.url)?;
    if let Err(e) = client.health_check().await {
        warn!(
            "Ollama is not reachable at {} ({}); files will be classified as Other",
            client.base_url(),
            e
        );
    }

    let oracle: Arc<dyn TextOracle> = Arc::new(client);
    let classifier = Classifier::from_config(oracle, &config);
    let state = Arc::new(AppState::new(Orchestrator::new(classifier), config.clone()));

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router).await
        .map_err(|e| crate::SortwiseError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
