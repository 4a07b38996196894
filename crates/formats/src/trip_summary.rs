use serde::{Deserialize, Serialize};

use crate::lenient;

/// Opening of an embedded summary record inside free text.
pub const SUMMARY_SIGNATURE: &str = r#"{"title""#;

/// Structured trip intent recovered from a group-chat transcript.
///
/// Every field is optional on the wire and defaults to empty. Field order
/// matters for serialization: `title` must stay first so an encoded summary
/// starts with [`SUMMARY_SIGNATURE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub requirements: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub destination: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub dates: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub budget: String,
    /// Serialized as `names`, which is what the chat service emits.
    #[serde(
        default,
        rename = "names",
        alias = "participant_names",
        alias = "participantNames",
        deserialize_with = "lenient::string_list"
    )]
    pub participant_names: Vec<String>,
}

impl TripSummary {
    /// Renders the summary in the signature format the extractor looks for.
    pub fn to_signature_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
