use services::{AnsweredQuestion, CompletionSummary, QuestionView, SurveyOverview};

use crate::vm::markdown_vm::markdown_to_html;

/// One row of the survey picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurveyCardVm {
    pub key: String,
    pub title: String,
    pub question_count_str: String,
}

impl From<&SurveyOverview> for SurveyCardVm {
    fn from(overview: &SurveyOverview) -> Self {
        Self {
            key: overview.key.as_str().to_owned(),
            title: overview.title.clone(),
            question_count_str: format_question_count(overview.question_count),
        }
    }
}

#[must_use]
pub fn map_survey_cards(surveys: &[SurveyOverview]) -> Vec<SurveyCardVm> {
    surveys.iter().map(SurveyCardVm::from).collect()
}

/// Title page shown before the first question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurveyStartVm {
    pub title: String,
    /// Sanitized HTML rendered from the markdown instructions.
    pub instructions_html: String,
    pub question_count_str: String,
}

#[must_use]
pub fn map_survey_start(overview: &SurveyOverview) -> SurveyStartVm {
    SurveyStartVm {
        title: overview.title.clone(),
        instructions_html: markdown_to_html(&overview.instructions),
        question_count_str: format_question_count(overview.question_count),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub survey_title: String,
    pub text: String,
    pub choices: Vec<String>,
    pub allow_text: bool,
    /// "Question 2 of 4"
    pub position_str: String,
}

#[must_use]
pub fn map_question(view: &QuestionView) -> QuestionVm {
    QuestionVm {
        survey_title: view.survey.title.clone(),
        text: view.question.text().to_owned(),
        choices: view.question.choices().to_vec(),
        allow_text: view.question.allow_text(),
        position_str: format!(
            "Question {} of {}",
            view.id.value() + 1,
            view.survey.question_count
        ),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerVm {
    pub question: String,
    pub choice: String,
    pub text: Option<String>,
}

impl From<&AnsweredQuestion> for AnswerVm {
    fn from(answer: &AnsweredQuestion) -> Self {
        Self {
            question: answer.question.clone(),
            choice: answer.choice.clone(),
            text: answer.text.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionVm {
    pub survey_title: String,
    pub answers: Vec<AnswerVm>,
    pub newly_completed: bool,
}

#[must_use]
pub fn map_completion(summary: &CompletionSummary) -> CompletionVm {
    CompletionVm {
        survey_title: summary.survey.title.clone(),
        answers: summary.answers.iter().map(AnswerVm::from).collect(),
        newly_completed: summary.newly_completed,
    }
}

fn format_question_count(count: usize) -> String {
    match count {
        1 => "1 question".to_owned(),
        n => format!("{n} questions"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::model::{Catalog, QuestionId, SurveyKey};

    fn overview(key: &str) -> SurveyOverview {
        let catalog = Catalog::builtin();
        let key = SurveyKey::new(key);
        let survey = catalog.get(&key).unwrap();
        SurveyOverview::new(&key, survey)
    }

    #[test]
    fn cards_keep_catalog_order_and_counts() {
        let cards = map_survey_cards(&[overview("satisfaction"), overview("personality")]);
        assert_eq!(cards[0].key, "satisfaction");
        assert_eq!(cards[0].question_count_str, "4 questions");
        assert_eq!(cards[1].key, "personality");
    }

    #[test]
    fn question_position_is_one_based() {
        let survey = overview("personality");
        let catalog = Catalog::builtin();
        let question = catalog
            .get(&survey.key)
            .and_then(|s| s.question(QuestionId::new(3)))
            .unwrap()
            .clone();
        let vm = map_question(&QuestionView {
            survey,
            id: QuestionId::new(3),
            question,
        });
        assert_eq!(vm.position_str, "Question 4 of 4");
        assert!(vm.allow_text);
    }

    #[test]
    fn singular_question_count() {
        assert_eq!(format_question_count(1), "1 question");
        assert_eq!(format_question_count(0), "0 questions");
    }
}
