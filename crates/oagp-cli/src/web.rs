//! Local single-page web form.
//!
//! One shared [`FormState`] backs the page. Each POST applies the submitted
//! inputs to it and redirects back to `/`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use minijinja::{Environment, context};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use oagp_core::error::FormError;
use oagp_core::{FormState, Mode, SelectedFile, SpecSource};
use oagp_gateway::ApiGateway;

#[derive(Clone)]
pub struct AppState {
    form: Arc<Mutex<FormState>>,
    gateway: ApiGateway,
    templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(form: FormState, gateway: ApiGateway) -> Self {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../templates/index.html"))
            .expect("template should be valid");
        Self {
            form: Arc::new(Mutex::new(form)),
            gateway,
            templates: Arc::new(env),
        }
    }

    pub fn form(&self) -> &Arc<Mutex<FormState>> {
        &self.form
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/mode", post(switch_mode))
        .route("/generate", post(generate))
        .route("/reset", post(reset))
        .with_state(state)
}

/// Bind `addr` and serve the form until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    eprintln!("Serving the generator form on http://{local}");
    axum::serve(listener, router(state))
        .await
        .context("web server stopped")?;
    Ok(())
}

/// Fields posted by the page. Absent fields leave the form untouched.
#[derive(Debug, Default)]
struct PostedFields {
    mode: Option<Mode>,
    language: Option<String>,
    source: Option<SpecSource>,
    url: Option<String>,
    paste: Option<String>,
    file: Option<Result<SelectedFile, FormError>>,
}

impl PostedFields {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut fields = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // An untouched file input still posts an empty part.
                if !file_name.is_empty() {
                    fields.file = Some(SelectedFile::from_bytes(file_name, bytes.to_vec()));
                }
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "mode" => fields.mode = value.parse().ok(),
                "language" => fields.language = Some(value),
                "source" => fields.source = value.parse().ok(),
                "url" => fields.url = Some(value),
                "paste" => fields.paste = Some(value),
                other => log::debug!("ignoring form field {other}"),
            }
        }
        Ok(fields)
    }

    fn apply(self, form: &mut FormState) {
        if let Some(source) = self.source {
            form.set_source(source);
        }
        if let Some(url) = self.url {
            form.set_url(url);
        }
        if let Some(paste) = self.paste {
            form.set_paste(paste);
        }
        match self.file {
            Some(Ok(file)) => form.select_file(file),
            Some(Err(e)) => form.reject_file(e),
            None => {}
        }
        if let Some(language) = self.language {
            form.select_language(language);
        }
        if let Some(mode) = self.mode {
            form.set_mode(mode);
        }
    }
}

async fn index(State(state): State<AppState>) -> Response {
    let mut form = state.form.lock().await;
    let notifications = form.take_notifications();
    let inputs = form.inputs();

    let ctx = context! {
        mode => form.mode().as_str(),
        mode_title => form.mode().title(),
        languages => form.languages(),
        language => form.language(),
        source => form.source().as_str(),
        url => &inputs.url,
        paste => &inputs.paste,
        file_name => inputs.file.as_ref().map(|f| f.name.as_str()),
        can_submit => form.can_submit(),
        submitting => form.is_submitting(),
        link => form.result().map(|r| r.link.as_str()),
        notifications => notifications,
    };

    let rendered = state
        .templates
        .get_template("index.html")
        .and_then(|tmpl| tmpl.render(ctx));
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("failed to render page: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn switch_mode(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, MultipartError> {
    let fields = PostedFields::read(multipart).await?;
    fields.apply(&mut *state.form.lock().await);
    Ok(Redirect::to("/"))
}

async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, MultipartError> {
    let fields = PostedFields::read(multipart).await?;

    let submission = {
        let mut form = state.form.lock().await;
        fields.apply(&mut form);
        form.begin_submission()
    };
    // Validation failures are already recorded on the form.
    let Ok(submission) = submission else {
        return Ok(Redirect::to("/"));
    };

    // The lock is released while the request is in flight; the Submitting
    // phase keeps a second submission out.
    let outcome = submission.execute(&state.gateway, &state.gateway).await;
    if let Err(e) = state.form.lock().await.complete(&submission, outcome) {
        log::debug!("generation request ended with an error: {e}");
    }
    Ok(Redirect::to("/"))
}

async fn reset(State(state): State<AppState>) -> Redirect {
    state.form.lock().await.reset();
    Redirect::to("/")
}
