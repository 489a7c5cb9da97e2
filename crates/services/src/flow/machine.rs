use std::fmt;

use survey_core::model::{Catalog, Question, QuestionId, Response, SessionState, Survey, SurveyKey};

use crate::error::FlowError;
use crate::flow::progress::SurveyProgress;

//
// ─── STATES & OUTCOMES ─────────────────────────────────────────────────────────
//

/// Where a client stands in the survey flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    NoSurveySelected,
    InProgress(QuestionId),
    AllAnswered,
    Completed,
}

/// How submitted choices are checked against the question's declared choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChoicePolicy {
    /// Reject choices the question does not offer.
    #[default]
    Strict,
    /// Record whatever the client sent.
    Lenient,
}

/// A question was requested out of order. Recoverable: the flow redirects to
/// `expected` and shows this notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchWarning {
    pub requested: QuestionId,
    pub expected: QuestionId,
}

impl fmt::Display for MismatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid question id: {}.", self.requested)
    }
}

/// Outcome of asking for a question by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionStep<'a> {
    Show {
        key: &'a SurveyKey,
        survey: &'a Survey,
        id: QuestionId,
        question: &'a Question,
    },
    Redirect {
        to: FlowState,
        warning: Option<MismatchWarning>,
    },
}

/// Outcome of selecting a survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    Ready {
        key: &'a SurveyKey,
        survey: &'a Survey,
    },
    /// The client already completed this survey recently; nothing changed.
    Blocked {
        key: &'a SurveyKey,
        survey: &'a Survey,
    },
}

/// A fully answered attempt, pairing questions with responses by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion<'a> {
    pub key: &'a SurveyKey,
    pub survey: &'a Survey,
    pub responses: Vec<Response>,
}

impl<'a> Completion<'a> {
    pub fn answers(&self) -> impl Iterator<Item = (&'a Question, &Response)> + '_ {
        self.survey.questions().iter().zip(self.responses.iter())
    }
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Survey progression rules over explicit session state.
///
/// Holds no state of its own: every operation takes the client's
/// `SessionState`, and read-only operations borrow it immutably. The
/// authoritative position is always the number of recorded responses.
#[derive(Debug, Clone, Copy)]
pub struct SurveyFlow<'a> {
    catalog: &'a Catalog,
    fixed: Option<&'a SurveyKey>,
    policy: ChoicePolicy,
}

impl<'a> SurveyFlow<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            fixed: None,
            policy: ChoicePolicy::default(),
        }
    }

    /// Serve a single survey without a selection step. Sessions that never
    /// selected a survey resolve to `key`.
    #[must_use]
    pub fn with_fixed_survey(mut self, key: &'a SurveyKey) -> Self {
        self.fixed = Some(key);
        self
    }

    #[must_use]
    pub fn with_choice_policy(mut self, policy: ChoicePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Look up a survey in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::UnknownSurvey` if the key is not in the catalog.
    pub fn survey(&self, key: &SurveyKey) -> Result<(&'a SurveyKey, &'a Survey), FlowError> {
        self.catalog
            .entry(key)
            .ok_or_else(|| FlowError::UnknownSurvey(key.clone()))
    }

    fn resolve(&self, state: &SessionState) -> Result<(&'a SurveyKey, &'a Survey), FlowError> {
        let key = state
            .current_survey()
            .or(self.fixed)
            .ok_or(FlowError::NoSurveySelected)?;
        self.survey(key)
    }

    /// Select a survey for this client.
    ///
    /// When `already_completed` is set the outcome is `Selection::Blocked`
    /// and `state` is left untouched. Otherwise the survey becomes current
    /// and any previous attempt is dropped until `begin`.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::UnknownSurvey` for keys missing from the catalog.
    pub fn select_survey(
        &self,
        state: &mut SessionState,
        key: &SurveyKey,
        already_completed: bool,
    ) -> Result<Selection<'a>, FlowError> {
        let (key, survey) = self.survey(key)?;
        if already_completed {
            return Ok(Selection::Blocked { key, survey });
        }
        state.select(key.clone());
        Ok(Selection::Ready { key, survey })
    }

    /// Start a fresh attempt at the current survey.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoSurveySelected` (or `UnknownSurvey` for a stale
    /// key) when there is nothing to begin.
    pub fn begin(&self, state: &mut SessionState) -> Result<FlowState, FlowError> {
        let (key, _) = self.resolve(state)?;
        if state.current_survey().is_none() {
            state.select(key.clone());
        }
        state.restart();
        Ok(FlowState::InProgress(QuestionId::new(0)))
    }

    /// Decide what to do with a request for question `id`.
    ///
    /// Never mutates `state`. A request for any id other than the next
    /// unanswered one is redirected there with a warning.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::UnknownQuestion` if the matching id is outside the survey.
    pub fn request_question(
        &self,
        state: &SessionState,
        id: QuestionId,
    ) -> Result<QuestionStep<'a>, FlowError> {
        if !state.is_started() {
            return Ok(redirect(FlowState::NoSurveySelected));
        }
        let Ok((key, survey)) = self.resolve(state) else {
            return Ok(redirect(FlowState::NoSurveySelected));
        };

        let answered = state.answered();
        if answered >= survey.len() {
            return Ok(redirect(finished_state(state)));
        }

        let expected = state.next_question();
        if id != expected {
            return Ok(QuestionStep::Redirect {
                to: FlowState::InProgress(expected),
                warning: Some(MismatchWarning {
                    requested: id,
                    expected,
                }),
            });
        }

        let question = survey.question(id).ok_or_else(|| FlowError::UnknownQuestion {
            survey: key.clone(),
            id,
        })?;
        Ok(QuestionStep::Show {
            key,
            survey,
            id,
            question,
        })
    }

    /// Record an answer to the next unanswered question.
    ///
    /// # Errors
    ///
    /// Returns `NoSurveySelected`/`NotStarted` when no attempt is open,
    /// `SurveyFinished` when every question already has a response, and
    /// `InvalidChoice` under `ChoicePolicy::Strict` for undeclared choices.
    pub fn submit_answer(
        &self,
        state: &mut SessionState,
        choice: &str,
        text: Option<String>,
    ) -> Result<FlowState, FlowError> {
        let (key, survey) = self.resolve(state)?;
        if !state.is_started() {
            return Err(FlowError::NotStarted);
        }
        let id = state.next_question();
        let Some(question) = survey.question(id) else {
            return Err(FlowError::SurveyFinished);
        };
        if self.policy == ChoicePolicy::Strict && !question.accepts(choice) {
            return Err(FlowError::InvalidChoice {
                id,
                choice: choice.to_owned(),
            });
        }

        state.push(Response::for_question(question, choice, text));
        tracing::debug!(survey = %key, question = %id, "answer recorded");
        Ok(self.status(state))
    }

    /// Finish a fully answered attempt. Succeeds once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `Incomplete` if questions remain, `AlreadyCompleted` on a
    /// repeat call, or `NoSurveySelected`/`NotStarted` without an attempt.
    pub fn complete(&self, state: &mut SessionState) -> Result<Completion<'a>, FlowError> {
        let completion = self.answered_attempt(state)?;
        if state.is_completed() {
            return Err(FlowError::AlreadyCompleted);
        }
        state.mark_completed();
        Ok(completion)
    }

    /// Re-read the answers of a fully answered attempt without changing state.
    ///
    /// # Errors
    ///
    /// Same as [`SurveyFlow::complete`], except repeat calls are allowed.
    pub fn summary(&self, state: &SessionState) -> Result<Completion<'a>, FlowError> {
        self.answered_attempt(state)
    }

    fn answered_attempt(&self, state: &SessionState) -> Result<Completion<'a>, FlowError> {
        let (key, survey) = self.resolve(state)?;
        let responses = state.responses().ok_or(FlowError::NotStarted)?;
        if responses.len() < survey.len() {
            return Err(FlowError::Incomplete {
                answered: responses.len(),
                total: survey.len(),
            });
        }
        Ok(Completion {
            key,
            survey,
            responses: responses.to_vec(),
        })
    }

    /// Current position derived from `state`.
    #[must_use]
    pub fn status(&self, state: &SessionState) -> FlowState {
        match self.resolve(state) {
            Ok((_, survey)) if state.is_started() => {
                if state.answered() >= survey.len() {
                    finished_state(state)
                } else {
                    FlowState::InProgress(state.next_question())
                }
            }
            _ => FlowState::NoSurveySelected,
        }
    }

    /// Progress through the current attempt, if one is open.
    #[must_use]
    pub fn progress(&self, state: &SessionState) -> Option<SurveyProgress> {
        let (_, survey) = self.resolve(state).ok()?;
        state
            .is_started()
            .then(|| SurveyProgress::new(state.answered(), survey.len()))
    }
}

fn redirect(to: FlowState) -> QuestionStep<'static> {
    QuestionStep::Redirect { to, warning: None }
}

fn finished_state(state: &SessionState) -> FlowState {
    if state.is_completed() {
        FlowState::Completed
    } else {
        FlowState::AllAnswered
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::model::{QuestionDraft, SurveyDraft};

    fn satisfaction() -> SurveyKey {
        SurveyKey::new("satisfaction")
    }

    fn started(flow: &SurveyFlow<'_>) -> SessionState {
        let mut state = SessionState::new();
        flow.select_survey(&mut state, &satisfaction(), false)
            .unwrap();
        assert_eq!(
            flow.begin(&mut state).unwrap(),
            FlowState::InProgress(QuestionId::new(0))
        );
        state
    }

    #[test]
    fn unknown_survey_is_not_found() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = SessionState::new();
        let err = flow
            .select_survey(&mut state, &SurveyKey::new("bogus"), false)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(state, SessionState::new());
    }

    #[test]
    fn blocked_selection_leaves_state_untouched() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = started(&flow);
        let before = state.clone();

        let selection = flow
            .select_survey(&mut state, &satisfaction(), true)
            .unwrap();
        assert!(matches!(selection, Selection::Blocked { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn selection_waits_for_begin() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = SessionState::new();
        flow.select_survey(&mut state, &satisfaction(), false)
            .unwrap();

        assert_eq!(flow.status(&state), FlowState::NoSurveySelected);
        let step = flow.request_question(&state, QuestionId::new(0)).unwrap();
        assert_eq!(step, redirect(FlowState::NoSurveySelected));
    }

    #[test]
    fn begin_without_selection_is_invalid_state() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let err = flow.begin(&mut SessionState::new()).unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn mismatched_id_redirects_to_next_unanswered_without_mutation() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let state = started(&flow);
        let before = state.clone();

        let step = flow.request_question(&state, QuestionId::new(2)).unwrap();
        let QuestionStep::Redirect { to, warning } = step else {
            panic!("expected redirect, got {step:?}");
        };
        assert_eq!(to, FlowState::InProgress(QuestionId::new(0)));
        let warning = warning.unwrap();
        assert_eq!(warning.to_string(), "Invalid question id: 2.");
        assert_eq!(state, before);
    }

    #[test]
    fn requesting_the_next_question_is_idempotent() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = started(&flow);
        flow.submit_answer(&mut state, "Yes", None).unwrap();

        let first = flow.request_question(&state, QuestionId::new(1)).unwrap();
        let second = flow.request_question(&state, QuestionId::new(1)).unwrap();
        assert_eq!(first, second);
        let QuestionStep::Show { question, .. } = first else {
            panic!("expected question");
        };
        assert_eq!(question.text(), "Did someone else shop with you today?");
    }

    #[test]
    fn answering_every_question_reaches_all_answered_then_completes_once() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = started(&flow);

        let answers = ["Yes", "No", "Less than $10,000", "Yes"];
        for (index, answer) in answers.iter().enumerate() {
            assert_eq!(state.answered(), index);
            let next = flow.submit_answer(&mut state, answer, None).unwrap();
            if index + 1 < answers.len() {
                assert_eq!(next, FlowState::InProgress(QuestionId::new(index + 1)));
            } else {
                assert_eq!(next, FlowState::AllAnswered);
            }
        }

        let step = flow.request_question(&state, QuestionId::new(0)).unwrap();
        assert_eq!(step, redirect(FlowState::AllAnswered));

        let completion = flow.complete(&mut state).unwrap();
        assert_eq!(completion.key, &satisfaction());
        assert_eq!(completion.answers().count(), 4);
        assert_eq!(flow.status(&state), FlowState::Completed);

        let err = flow.complete(&mut state).unwrap_err();
        assert!(matches!(err, FlowError::AlreadyCompleted));
        assert_eq!(flow.summary(&state).unwrap().responses.len(), 4);
    }

    #[test]
    fn submitting_past_the_end_is_rejected() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog).with_choice_policy(ChoicePolicy::Lenient);
        let mut state = started(&flow);
        for _ in 0..4 {
            flow.submit_answer(&mut state, "Yes", None).unwrap();
        }
        let err = flow.submit_answer(&mut state, "Yes", None).unwrap_err();
        assert!(matches!(err, FlowError::SurveyFinished));
        assert_eq!(state.answered(), 4);
    }

    #[test]
    fn complete_requires_every_answer() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = started(&flow);
        flow.submit_answer(&mut state, "Yes", None).unwrap();

        let err = flow.complete(&mut state).unwrap_err();
        assert!(matches!(
            err,
            FlowError::Incomplete {
                answered: 1,
                total: 4
            }
        ));
        assert!(!state.is_completed());
    }

    #[test]
    fn strict_policy_rejects_undeclared_choice() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = started(&flow);

        let err = flow.submit_answer(&mut state, "Maybe", None).unwrap_err();
        assert!(matches!(err, FlowError::InvalidChoice { .. }));
        assert_eq!(state.answered(), 0);
    }

    #[test]
    fn lenient_policy_records_any_choice() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog).with_choice_policy(ChoicePolicy::Lenient);
        let mut state = started(&flow);

        flow.submit_answer(&mut state, "Maybe", None).unwrap();
        assert_eq!(state.responses().unwrap()[0].choice, "Maybe");
    }

    #[test]
    fn submit_without_begin_is_invalid_state() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = SessionState::new();
        let err = flow.submit_answer(&mut state, "Yes", None).unwrap_err();
        assert!(matches!(err, FlowError::NoSurveySelected));

        flow.select_survey(&mut state, &satisfaction(), false)
            .unwrap();
        let err = flow.submit_answer(&mut state, "Yes", None).unwrap_err();
        assert!(matches!(err, FlowError::NotStarted));
    }

    #[test]
    fn free_text_is_kept_only_where_allowed() {
        let catalog = Catalog::builtin();
        let flow = SurveyFlow::new(&catalog);
        let mut state = SessionState::new();
        flow.select_survey(&mut state, &SurveyKey::new("personality"), false)
            .unwrap();
        flow.begin(&mut state).unwrap();

        flow.submit_answer(&mut state, "Yes", Some("ignored".into()))
            .unwrap();
        flow.submit_answer(&mut state, "No", None).unwrap();
        flow.submit_answer(&mut state, "Hedgehogs", None).unwrap();
        flow.submit_answer(&mut state, "wtf()", Some("says nothing".into()))
            .unwrap();

        let responses = state.responses().unwrap();
        assert_eq!(responses[0].text, None);
        assert_eq!(responses[3].text.as_deref(), Some("says nothing"));
    }

    #[test]
    fn fixed_survey_needs_no_selection() {
        let catalog = Catalog::builtin();
        let key = satisfaction();
        let flow = SurveyFlow::new(&catalog).with_fixed_survey(&key);
        let mut state = SessionState::new();

        assert_eq!(
            flow.begin(&mut state).unwrap(),
            FlowState::InProgress(QuestionId::new(0))
        );
        assert_eq!(state.current_survey(), Some(&key));
    }

    #[test]
    fn stale_survey_key_redirects_to_start() {
        let survey = SurveyDraft::new("Other", "")
            .question(QuestionDraft::yes_no("Q"))
            .validate()
            .unwrap();
        let catalog = Catalog::new(vec![(SurveyKey::new("other"), survey)]).unwrap();
        let flow = SurveyFlow::new(&catalog);

        let mut state = SessionState::new();
        state.select(SurveyKey::new("removed"));
        state.restart();

        let step = flow.request_question(&state, QuestionId::new(0)).unwrap();
        assert_eq!(step, redirect(FlowState::NoSurveySelected));
        assert_eq!(flow.progress(&state), None);
    }
}
