use serde::Deserialize;
use validator::Validate;

use crate::models::Subject;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, message = "Path `name` is required."))]
    pub name: String,
}

impl From<CreateSubjectRequest> for Subject {
    fn from(req: CreateSubjectRequest) -> Self {
        Subject::new(req.name)
    }
}
