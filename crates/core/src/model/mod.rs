mod catalog;
mod ids;
mod question;
mod response;
mod session;
mod survey;

pub use catalog::{Catalog, CatalogEntryDraft, CatalogError};
pub use ids::{ClientId, ParseIdError, QuestionId, SurveyKey};
pub use question::{Question, QuestionDraft, QuestionError};
pub use response::Response;
pub use session::SessionState;
pub use survey::{Survey, SurveyDraft, SurveyError};
