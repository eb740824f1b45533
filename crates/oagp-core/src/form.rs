//! Form state and the submission state machine.
//!
//! A [`FormState`] is owned by whichever surface renders it. Submitting is
//! split into three steps so a surface can release its lock on the state
//! while the network call is in flight:
//!
//! 1. [`FormState::begin_submission`] validates the inputs and moves to
//!    [`Phase::Submitting`],
//! 2. [`Submission::execute`] fetches a URL source if needed and calls the
//!    generation service,
//! 3. [`FormState::complete`] records the outcome.
//!
//! [`FormState::submit`] runs all three in one call.

use serde_json::Value;

use crate::api::{GenerationApi, SpecFetcher};
use crate::error::{DiscoveryError, FormError};
use crate::model::{
    GenerationRequest, GenerationResult, LanguageCatalog, Mode, Notification, SelectedFile,
    SpecInputs, SpecSource,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    default_mode: Mode,
    mode: Mode,
    language: String,
    source: SpecSource,
    inputs: SpecInputs,
    catalog: LanguageCatalog,
    phase: Phase,
    result: Option<GenerationResult>,
    last_error: Option<String>,
    notifications: Vec<Notification>,
    ticket: u64,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form that starts in (and resets to) `mode` instead of [`Mode::Client`].
    pub fn with_default_mode(mode: Mode) -> Self {
        Self {
            default_mode: mode,
            mode,
            ..Self::default()
        }
    }

    /// Install the result of language discovery.
    ///
    /// On failure the catalog stays empty, so no language can be selected and
    /// submit stays disabled. The error is handed back to the caller after
    /// the notification is queued.
    pub fn load_catalog(
        &mut self,
        catalog: Result<LanguageCatalog, DiscoveryError>,
    ) -> Result<(), DiscoveryError> {
        match catalog {
            Ok(catalog) => {
                log::debug!(
                    "loaded {} client languages and {} server frameworks",
                    catalog.client.len(),
                    catalog.server.len()
                );
                self.catalog = catalog;
                self.language = self.default_language();
                Ok(())
            }
            Err(e) => {
                log::error!("error fetching languages: {e}");
                self.catalog = LanguageCatalog::default();
                self.language.clear();
                self.notifications
                    .push(Notification::error("Failed to load available languages"));
                Err(e)
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source(&self) -> SpecSource {
        self.source
    }

    pub fn inputs(&self) -> &SpecInputs {
        &self.inputs
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// Languages offered by the selector for the current mode.
    pub fn languages(&self) -> &[String] {
        self.catalog.languages(self.mode)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Download link of the last successful generation.
    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the submit action is enabled.
    pub fn can_submit(&self) -> bool {
        !self.language.is_empty() && !self.is_submitting()
    }

    /// Drain the notifications queued since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Switch between client and server generation.
    ///
    /// The selected language falls back to the first entry of the new list.
    /// Specification inputs are left alone.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.language = self.default_language();
        self.touch();
    }

    pub fn select_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
        self.touch();
    }

    pub fn set_source(&mut self, source: SpecSource) {
        self.source = source;
        self.touch();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.inputs.url = url.into();
        self.touch();
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.inputs.file = Some(file);
        self.touch();
    }

    /// A picked file could not be read. The previous selection is dropped
    /// and the error is shown.
    pub fn reject_file(&mut self, error: FormError) {
        log::error!("{error}");
        self.inputs.file = None;
        self.touch();
        self.notifications
            .push(Notification::error(error.to_string()));
    }

    pub fn set_paste(&mut self, text: impl Into<String>) {
        self.inputs.paste = text.into();
        self.touch();
    }

    /// Return every field to its initial value. The catalog is kept.
    pub fn reset(&mut self) {
        self.mode = self.default_mode;
        self.language = self.default_language();
        self.source = SpecSource::default();
        self.inputs = SpecInputs::default();
        self.phase = Phase::Idle;
        self.result = None;
        self.last_error = None;
        self.notifications.clear();
        // Invalidates any submission still in flight. Its request is not
        // cancelled, so a new submission may overlap it; only the newest
        // ticket's outcome reaches the form.
        self.ticket += 1;
    }

    /// Validate the inputs and enter [`Phase::Submitting`].
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Busy`] while another submission is in flight
    /// (the state is left untouched), or the first failed check among a
    /// missing input and malformed JSON (the form moves to [`Phase::Failed`]).
    pub fn begin_submission(&mut self) -> Result<Submission, FormError> {
        if self.is_submitting() {
            self.notifications
                .push(Notification::error(FormError::Busy.to_string()));
            return Err(FormError::Busy);
        }

        self.result = None;
        self.last_error = None;

        let spec = match self.pending_spec() {
            Ok(spec) => spec,
            Err(e) => {
                self.record_failure(&e);
                return Err(e);
            }
        };

        if let PendingSpec::Remote(ref url) = spec {
            log::warn!("fetching specification from {url}; the host may refuse the request");
            self.notifications.push(Notification::warning(
                "Fetching from URL",
                "The specification will be fetched directly from this URL. Many hosts refuse \
                 such requests; if it fails, upload the file or paste its contents instead.",
            ));
        }

        self.ticket += 1;
        self.phase = Phase::Submitting;

        Ok(Submission {
            ticket: self.ticket,
            mode: self.mode,
            language: self.language.clone(),
            languages: self.languages().to_vec(),
            spec,
        })
    }

    /// Record the outcome of `submission` and hand it back.
    ///
    /// Outcomes of submissions that were superseded by a reset are returned
    /// without touching the state.
    pub fn complete(
        &mut self,
        submission: &Submission,
        outcome: Result<GenerationResult, FormError>,
    ) -> Result<GenerationResult, FormError> {
        if submission.ticket != self.ticket || !self.is_submitting() {
            log::debug!("discarding outcome of a superseded submission");
            return outcome;
        }

        match &outcome {
            Ok(result) => {
                log::info!("{} code generated: {}", submission.mode, result.link);
                self.phase = Phase::Success;
                self.result = Some(result.clone());
                self.notifications.push(Notification::info(
                    "Success!",
                    format!(
                        "Your {} code has been generated successfully.",
                        submission.mode
                    ),
                ));
            }
            Err(e) => self.record_failure(e),
        }
        outcome
    }

    /// Validate, execute, and record a submission in one call.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] that ended the submission.
    pub async fn submit<A, F>(&mut self, api: &A, fetcher: &F) -> Result<GenerationResult, FormError>
    where
        A: GenerationApi + Sync,
        F: SpecFetcher + Sync,
    {
        let submission = self.begin_submission()?;
        let outcome = submission.execute(api, fetcher).await;
        self.complete(&submission, outcome)
    }

    fn default_language(&self) -> String {
        self.catalog
            .default_language(self.mode)
            .unwrap_or_default()
            .to_string()
    }

    fn touch(&mut self) {
        if matches!(self.phase, Phase::Success | Phase::Failed) {
            self.phase = Phase::Idle;
        }
    }

    fn record_failure(&mut self, error: &FormError) {
        log::error!("error generating {}: {error}", self.mode);
        self.phase = Phase::Failed;
        self.last_error = Some(error.to_string());
        self.notifications
            .push(Notification::error(error.to_string()));
    }

    fn pending_spec(&self) -> Result<PendingSpec, FormError> {
        match self.source {
            SpecSource::Url => {
                let url = self.inputs.url.trim();
                if url.is_empty() {
                    return Err(FormError::MissingUrl);
                }
                Ok(PendingSpec::Remote(url.to_string()))
            }
            SpecSource::File => {
                let file = self.inputs.file.as_ref().ok_or(FormError::MissingFile)?;
                parse_spec(&file.contents, SpecSource::File).map(PendingSpec::Ready)
            }
            SpecSource::Paste => {
                if self.inputs.paste.trim().is_empty() {
                    return Err(FormError::MissingPaste);
                }
                parse_spec(&self.inputs.paste, SpecSource::Paste).map(PendingSpec::Ready)
            }
        }
    }
}

fn parse_spec(text: &str, input: SpecSource) -> Result<Value, FormError> {
    serde_json::from_str(text).map_err(|error| FormError::InvalidSpecFormat { input, error })
}

#[derive(Debug, Clone)]
enum PendingSpec {
    Ready(Value),
    Remote(String),
}

/// A submission that passed the synchronous checks.
#[derive(Debug, Clone)]
pub struct Submission {
    ticket: u64,
    mode: Mode,
    language: String,
    languages: Vec<String>,
    spec: PendingSpec,
}

impl Submission {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Resolve the document, check the language, and call the service.
    ///
    /// # Errors
    ///
    /// [`FormError::CrossOriginFetch`] when a URL source cannot be fetched or
    /// is not JSON, [`FormError::LanguageNotSelected`] or
    /// [`FormError::UnknownLanguage`] for a bad selection, and
    /// [`FormError::Generation`] when the service call fails.
    pub async fn execute<A, F>(&self, api: &A, fetcher: &F) -> Result<GenerationResult, FormError>
    where
        A: GenerationApi + Sync,
        F: SpecFetcher + Sync,
    {
        let spec = match &self.spec {
            PendingSpec::Ready(spec) => spec.clone(),
            PendingSpec::Remote(url) => {
                let body = fetcher
                    .fetch_spec(url)
                    .await
                    .map_err(|reason| FormError::CrossOriginFetch {
                        url: url.clone(),
                        reason,
                    })?;
                serde_json::from_str(&body).map_err(|e| FormError::CrossOriginFetch {
                    url: url.clone(),
                    reason: format!("response is not valid JSON: {e}"),
                })?
            }
        };

        if self.language.is_empty() {
            return Err(FormError::LanguageNotSelected);
        }
        if !self.languages.iter().any(|l| *l == self.language) {
            return Err(FormError::UnknownLanguage {
                mode: self.mode,
                language: self.language.clone(),
            });
        }

        let request = GenerationRequest {
            mode: self.mode,
            language: self.language.clone(),
            spec,
        };
        log::debug!("requesting {} generation for {}", request.mode, request.language);
        let result = api
            .generate(request.mode, &request.language, &request.spec)
            .await?;
        Ok(result)
    }
}
