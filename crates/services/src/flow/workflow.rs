use std::sync::Arc;

use chrono::Duration;
use storage::repository::{CompletionGuard, SessionStore, Storage};
use survey_core::Clock;
use survey_core::model::{Catalog, ClientId, QuestionId, SurveyKey};
use tracing::{debug, info, warn};

use crate::error::FlowError;
use crate::flow::machine::{ChoicePolicy, FlowState, QuestionStep, Selection, SurveyFlow};
use crate::flow::progress::SurveyProgress;
use crate::flow::session::SessionAdapter;
use crate::flow::view::{
    CompletionSummary, QuestionOutcome, QuestionView, SelectOutcome, SurveyOverview,
};

/// Default lifetime of a completion marker.
pub const DEFAULT_COMPLETION_TTL_SECS: i64 = 60;
/// Default idle lifetime of a session.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60;

/// Runs one state-machine transition per call against a client's stored session.
///
/// Each call loads the session, applies the transition, and writes the result
/// back. The completion guard is optional: without one, surveys can be
/// retaken immediately.
#[derive(Clone)]
pub struct SurveyService {
    clock: Clock,
    catalog: Arc<Catalog>,
    sessions: SessionAdapter,
    completions: Option<Arc<dyn CompletionGuard>>,
    fixed_survey: Option<SurveyKey>,
    policy: ChoicePolicy,
    completion_ttl: Duration,
}

impl SurveyService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            clock,
            catalog,
            sessions: SessionAdapter::new(sessions, Duration::seconds(DEFAULT_SESSION_TTL_SECS)),
            completions: None,
            fixed_survey: None,
            policy: ChoicePolicy::default(),
            completion_ttl: Duration::seconds(DEFAULT_COMPLETION_TTL_SECS),
        }
    }

    /// Service over both backends of `storage`, with the completion guard enabled.
    #[must_use]
    pub fn from_storage(clock: Clock, catalog: Arc<Catalog>, storage: &Storage) -> Self {
        Self::new(clock, catalog, Arc::clone(&storage.sessions))
            .with_completion_guard(Arc::clone(&storage.completions))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_completion_guard(mut self, guard: Arc<dyn CompletionGuard>) -> Self {
        self.completions = Some(guard);
        self
    }

    #[must_use]
    pub fn without_completion_guard(mut self) -> Self {
        self.completions = None;
        self
    }

    /// Serve only `key`; sessions resolve to it without a selection step.
    #[must_use]
    pub fn with_fixed_survey(mut self, key: SurveyKey) -> Self {
        self.fixed_survey = Some(key);
        self
    }

    #[must_use]
    pub fn with_choice_policy(mut self, policy: ChoicePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_completion_ttl(mut self, ttl: Duration) -> Self {
        self.completion_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        let store = self.sessions;
        self.sessions = SessionAdapter::new(store.into_store(), ttl);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn fixed_survey(&self) -> Option<&SurveyKey> {
        self.fixed_survey.as_ref()
    }

    /// Catalog entries in declaration order.
    #[must_use]
    pub fn surveys(&self) -> Vec<SurveyOverview> {
        self.catalog
            .iter()
            .map(|(key, survey)| SurveyOverview::new(key, survey))
            .collect()
    }

    /// Look up a single catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::UnknownSurvey` if `key` is not in the catalog.
    pub fn overview(&self, key: &SurveyKey) -> Result<SurveyOverview, FlowError> {
        let (key, survey) = self.flow().survey(key)?;
        Ok(SurveyOverview::new(key, survey))
    }

    fn flow(&self) -> SurveyFlow<'_> {
        let flow = SurveyFlow::new(&self.catalog).with_choice_policy(self.policy);
        match &self.fixed_survey {
            Some(key) => flow.with_fixed_survey(key),
            None => flow,
        }
    }

    /// Select a survey, unless the completion guard says this client just finished it.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::UnknownSurvey` for keys missing from the catalog,
    /// or storage errors.
    pub async fn select_survey(
        &self,
        client: ClientId,
        key: &SurveyKey,
    ) -> Result<SelectOutcome, FlowError> {
        let now = self.clock.now();
        let flow = self.flow();
        let (key, _) = flow.survey(key)?;

        let already_completed = match &self.completions {
            Some(guard) => guard.is_marked(client, key, now).await?,
            None => false,
        };

        let mut state = self.sessions.load(client, now).await?;
        match flow.select_survey(&mut state, key, already_completed)? {
            Selection::Ready { key, survey } => {
                self.sessions.save(client, &state, now).await?;
                info!(%client, survey = %key, "survey selected");
                Ok(SelectOutcome::Ready(SurveyOverview::new(key, survey)))
            }
            Selection::Blocked { key, survey } => {
                warn!(%client, survey = %key, "retake blocked by completion marker");
                Ok(SelectOutcome::AlreadyCompleted(SurveyOverview::new(
                    key, survey,
                )))
            }
        }
    }

    /// Start (or restart) the current survey.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoSurveySelected` when nothing was selected, or
    /// storage errors.
    pub async fn begin(&self, client: ClientId) -> Result<FlowState, FlowError> {
        let now = self.clock.now();
        let mut state = self.sessions.load(client, now).await?;
        let next = self.flow().begin(&mut state)?;
        self.sessions.save(client, &state, now).await?;
        debug!(%client, "survey started");
        Ok(next)
    }

    /// Resolve a request for question `id`.
    ///
    /// Out-of-order requests come back as a redirect and queue the warning
    /// as a flash message; the stored responses are never touched.
    ///
    /// # Errors
    ///
    /// Returns storage errors, or `FlowError::UnknownQuestion` for a survey
    /// whose questions do not cover the next position.
    pub async fn question(
        &self,
        client: ClientId,
        id: QuestionId,
    ) -> Result<QuestionOutcome, FlowError> {
        let now = self.clock.now();
        let state = self.sessions.load(client, now).await?;
        match self.flow().request_question(&state, id)? {
            QuestionStep::Show {
                key,
                survey,
                id,
                question,
            } => Ok(QuestionOutcome::Show(QuestionView {
                survey: SurveyOverview::new(key, survey),
                id,
                question: question.clone(),
            })),
            QuestionStep::Redirect { to, warning } => {
                if let Some(warning) = warning {
                    warn!(%client, requested = %warning.requested, expected = %warning.expected, "out-of-order question request");
                    self.sessions
                        .push_flash(client, warning.to_string(), now)
                        .await?;
                }
                Ok(QuestionOutcome::Redirect { to, warning })
            }
        }
    }

    /// Record an answer to the next unanswered question.
    ///
    /// # Errors
    ///
    /// Returns the state-machine errors of `SurveyFlow::submit_answer`, or
    /// storage errors.
    pub async fn answer(
        &self,
        client: ClientId,
        choice: &str,
        text: Option<String>,
    ) -> Result<FlowState, FlowError> {
        let now = self.clock.now();
        let mut state = self.sessions.load(client, now).await?;
        let next = self.flow().submit_answer(&mut state, choice, text)?;
        self.sessions.save(client, &state, now).await?;
        Ok(next)
    }

    /// Finish the attempt and set the completion marker.
    ///
    /// The marker is written before the session records the attempt as
    /// completed, so a failed write leaves the attempt completable. Repeat
    /// calls return the same summary with `newly_completed == false` and
    /// refresh the marker.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Incomplete` if questions remain, the other
    /// invalid-state errors without an attempt, or storage errors.
    pub async fn complete(&self, client: ClientId) -> Result<CompletionSummary, FlowError> {
        let now = self.clock.now();
        let flow = self.flow();
        let mut state = self.sessions.load(client, now).await?;

        match flow.complete(&mut state) {
            Ok(completion) => {
                self.mark_completed(client, completion.key).await?;
                self.sessions.save(client, &state, now).await?;
                info!(%client, survey = %completion.key, "survey completed");
                Ok(CompletionSummary::from_completion(&completion, true))
            }
            Err(FlowError::AlreadyCompleted) => {
                let completion = flow.summary(&state)?;
                self.mark_completed(client, completion.key).await?;
                Ok(CompletionSummary::from_completion(&completion, false))
            }
            Err(err) => Err(err),
        }
    }

    async fn mark_completed(&self, client: ClientId, key: &SurveyKey) -> Result<(), FlowError> {
        if let Some(guard) = &self.completions {
            guard
                .mark(client, key, self.clock.now(), self.completion_ttl)
                .await?;
        }
        Ok(())
    }

    /// Current position and progress for this client.
    ///
    /// # Errors
    ///
    /// Returns storage or session decoding errors.
    pub async fn status(
        &self,
        client: ClientId,
    ) -> Result<(FlowState, Option<SurveyProgress>), FlowError> {
        let state = self.sessions.load(client, self.clock.now()).await?;
        let flow = self.flow();
        Ok((flow.status(&state), flow.progress(&state)))
    }

    /// Queue a one-shot notice for this client's next page.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn flash(&self, client: ClientId, message: impl Into<String>) -> Result<(), FlowError> {
        self.sessions
            .push_flash(client, message.into(), self.clock.now())
            .await
    }

    /// Pending notices for this client, cleared on read.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn take_flashes(&self, client: ClientId) -> Result<Vec<String>, FlowError> {
        self.sessions.take_flashes(client, self.clock.now()).await
    }
}

impl std::fmt::Debug for SurveyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyService")
            .field("clock", &self.clock)
            .field("surveys", &self.catalog.len())
            .field("fixed_survey", &self.fixed_survey)
            .field("policy", &self.policy)
            .field("guarded", &self.completions.is_some())
            .field("completion_ttl", &self.completion_ttl)
            .finish_non_exhaustive()
    }
}
