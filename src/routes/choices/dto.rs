use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChoiceResponse {
    /// Stored value, sent back in requests and filters
    #[schema(example = "I&C")]
    pub value: String,
    #[schema(example = "Information Computing")]
    pub label: String,
}
