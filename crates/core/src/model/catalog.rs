use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SurveyKey;
use crate::model::question::QuestionDraft;
use crate::model::survey::{Survey, SurveyDraft, SurveyError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog must contain at least one survey")]
    Empty,

    #[error("survey key cannot be empty")]
    EmptyKey,

    #[error("duplicate survey key: {0}")]
    DuplicateKey(SurveyKey),

    #[error("survey {key}: {source}")]
    InvalidSurvey {
        key: SurveyKey,
        #[source]
        source: SurveyError,
    },

    #[error("catalog parse error: {0}")]
    Parse(String),
}

/// One catalog file entry: a survey draft plus its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntryDraft {
    pub key: SurveyKey,
    #[serde(flatten)]
    pub survey: SurveyDraft,
}

/// Read-only mapping from survey key to survey, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(SurveyKey, Survey)>,
    index: HashMap<SurveyKey, usize>,
}

impl Catalog {
    /// Build a catalog from validated entries.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if there are no entries or a key is blank or repeated.
    pub fn new(entries: Vec<(SurveyKey, Survey)>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut index = HashMap::with_capacity(entries.len());
        for (position, (key, _)) in entries.iter().enumerate() {
            if key.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyKey);
            }
            if index.insert(key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateKey(key.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    /// Validate a list of drafts into a catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidSurvey` for the first survey that fails
    /// validation, or any error from [`Catalog::new`].
    pub fn from_drafts(drafts: Vec<CatalogEntryDraft>) -> Result<Self, CatalogError> {
        let entries = drafts
            .into_iter()
            .map(|draft| {
                let key = draft.key;
                match draft.survey.validate() {
                    Ok(survey) => Ok((key, survey)),
                    Err(source) => Err(CatalogError::InvalidSurvey { key, source }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Parse a JSON array of catalog entries.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON, or any validation error.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let drafts: Vec<CatalogEntryDraft> =
            serde_json::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_drafts(drafts)
    }

    /// The two surveys shipped with the application.
    ///
    /// # Panics
    ///
    /// Panics if the built-in survey definitions fail validation.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_drafts(vec![
            CatalogEntryDraft {
                key: SurveyKey::new("satisfaction"),
                survey: satisfaction_survey(),
            },
            CatalogEntryDraft {
                key: SurveyKey::new("personality"),
                survey: personality_quiz(),
            },
        ])
        .expect("built-in catalog should be valid")
    }

    /// The stored key and survey for `key`.
    #[must_use]
    pub fn entry(&self, key: &SurveyKey) -> Option<(&SurveyKey, &Survey)> {
        let (key, survey) = self.entries.get(*self.index.get(key)?)?;
        Some((key, survey))
    }

    #[must_use]
    pub fn get(&self, key: &SurveyKey) -> Option<&Survey> {
        self.entry(key).map(|(_, survey)| survey)
    }

    #[must_use]
    pub fn contains(&self, key: &SurveyKey) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SurveyKey, &Survey)> {
        self.entries.iter().map(|(key, survey)| (key, survey))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn satisfaction_survey() -> SurveyDraft {
    SurveyDraft::new(
        "Customer Satisfaction Survey",
        "Please fill out this survey about your experience with us.",
    )
    .question(QuestionDraft::yes_no("Have you shopped here before?"))
    .question(QuestionDraft::yes_no("Did someone else shop with you today?"))
    .question(
        QuestionDraft::yes_no("On average, how much do you spend a month on frisbees?")
            .with_choices(["Less than $10,000", "$10,000 or more"]),
    )
    .question(QuestionDraft::yes_no("Are you likely to shop here again?"))
}

fn personality_quiz() -> SurveyDraft {
    SurveyDraft::new(
        "Rithm Personality Test",
        "Learn more about yourself with our personality quiz!",
    )
    .question(QuestionDraft::yes_no("Do you ever dream about code?"))
    .question(QuestionDraft::yes_no("Do you ever have nightmares about code?"))
    .question(
        QuestionDraft::yes_no("Do you prefer porcupines or hedgehogs?")
            .with_choices(["Porcupines", "Hedgehogs"]),
    )
    .question(
        QuestionDraft::yes_no("Which is the worst function name, and why?")
            .with_choices(["do_stuff()", "run_me()", "wtf()"])
            .with_allow_text(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_keeps_declaration_order() {
        let catalog = Catalog::builtin();
        let keys: Vec<_> = catalog.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["satisfaction", "personality"]);

        let satisfaction = catalog.get(&SurveyKey::new("satisfaction")).unwrap();
        assert_eq!(satisfaction.len(), 4);
        assert_eq!(satisfaction.questions()[2].choices().len(), 2);

        let personality = catalog.get(&SurveyKey::new("personality")).unwrap();
        assert!(personality.questions()[3].allow_text());
    }

    #[test]
    fn unknown_key_is_absent() {
        assert!(Catalog::builtin().get(&SurveyKey::new("bogus")).is_none());
        assert!(Catalog::builtin().entry(&SurveyKey::new("bogus")).is_none());
    }

    #[test]
    fn entry_returns_the_stored_key() {
        let catalog = Catalog::builtin();
        let (key, survey) = catalog.entry(&SurveyKey::new("personality")).unwrap();
        let (stored, _) = catalog.iter().nth(1).unwrap();
        assert!(std::ptr::eq(key, stored));
        assert_eq!(survey.title(), "Rithm Personality Test");
    }

    #[test]
    fn rejects_duplicate_keys() {
        let survey = SurveyDraft::new("T", "")
            .question(QuestionDraft::yes_no("Q"))
            .validate()
            .unwrap();
        let err = Catalog::new(vec![
            (SurveyKey::new("a"), survey.clone()),
            (SurveyKey::new("a"), survey),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateKey(SurveyKey::new("a")));
    }

    #[test]
    fn parses_catalog_json_with_defaults() {
        let raw = r#"[
            {
                "key": "pets",
                "title": "Pets",
                "questions": [
                    { "text": "Do you own a cat?" },
                    { "text": "Favourite?", "choices": ["Cat", "Dog"], "allow_text": true }
                ]
            }
        ]"#;
        let catalog = Catalog::from_json_str(raw).unwrap();
        let pets = catalog.get(&SurveyKey::new("pets")).unwrap();
        assert_eq!(pets.instructions(), "");
        assert_eq!(pets.questions()[0].choices(), ["Yes", "No"]);
        assert!(pets.questions()[1].allow_text());
    }

    #[test]
    fn reports_malformed_json() {
        let err = Catalog::from_json_str("{").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
