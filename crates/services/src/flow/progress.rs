/// Aggregated view of survey progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SurveyProgress {
    #[must_use]
    pub fn new(answered: usize, total: usize) -> Self {
        let answered = answered.min(total);
        Self {
            total,
            answered,
            remaining: total - answered,
            is_complete: answered == total,
        }
    }
}
