use survey_core::model::{Question, QuestionId, Survey, SurveyKey};

use crate::flow::machine::{Completion, FlowState, MismatchWarning};

/// Owned summary of a catalog entry for listing and start pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyOverview {
    pub key: SurveyKey,
    pub title: String,
    pub instructions: String,
    pub question_count: usize,
}

impl SurveyOverview {
    #[must_use]
    pub fn new(key: &SurveyKey, survey: &Survey) -> Self {
        Self {
            key: key.clone(),
            title: survey.title().to_owned(),
            instructions: survey.instructions().to_owned(),
            question_count: survey.len(),
        }
    }
}

/// Result of a selection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Ready(SurveyOverview),
    AlreadyCompleted(SurveyOverview),
}

/// A question ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub survey: SurveyOverview,
    pub id: QuestionId,
    pub question: Question,
}

/// Result of a question request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOutcome {
    Show(QuestionView),
    Redirect {
        to: FlowState,
        warning: Option<MismatchWarning>,
    },
}

/// One question paired with the client's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub question: String,
    pub choice: String,
    pub text: Option<String>,
}

/// Data for the completion page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    pub survey: SurveyOverview,
    pub answers: Vec<AnsweredQuestion>,
    /// False when the page is re-shown for an attempt that was already completed.
    pub newly_completed: bool,
}

impl CompletionSummary {
    #[must_use]
    pub fn from_completion(completion: &Completion<'_>, newly_completed: bool) -> Self {
        let answers = completion
            .answers()
            .map(|(question, response)| AnsweredQuestion {
                question: question.text().to_owned(),
                choice: response.choice.clone(),
                text: response.text.clone(),
            })
            .collect();
        Self {
            survey: SurveyOverview::new(completion.key, completion.survey),
            answers,
            newly_completed,
        }
    }
}
