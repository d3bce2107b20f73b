//! Source key value object: the closed set of five raw-data categories.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One of the five fixed raw-data categories a caller can upload.
///
/// The set is closed: every workflow tracks all five keys, whether or not
/// the caller supplied data for them. Ordering of [`SourceKey::ALL`] is the
/// canonical processing and reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKey {
    SearchKeywords,
    WhatsappSpecs,
    PnsCalls,
    RejectionComments,
    LmsChats,
}

impl SourceKey {
    /// All source keys in canonical order.
    pub const ALL: [SourceKey; 5] = [
        SourceKey::SearchKeywords,
        SourceKey::WhatsappSpecs,
        SourceKey::PnsCalls,
        SourceKey::RejectionComments,
        SourceKey::LmsChats,
    ];

    /// Wire identifier (e.g. `search_keywords`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::SearchKeywords => "search_keywords",
            SourceKey::WhatsappSpecs => "whatsapp_specs",
            SourceKey::PnsCalls => "pns_calls",
            SourceKey::RejectionComments => "rejection_comments",
            SourceKey::LmsChats => "lms_chats",
        }
    }

    /// Human-readable source name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKey::SearchKeywords => "Internal Search Keywords",
            SourceKey::WhatsappSpecs => "WhatsApp Conversations",
            SourceKey::PnsCalls => "PNS Call Transcript",
            SourceKey::RejectionComments => "BLNI Comments/QRF Data",
            SourceKey::LmsChats => "LMS Chat Logs",
        }
    }

    /// Fixed classification of the data this source carries.
    pub fn source_type(&self) -> SourceType {
        match self {
            SourceKey::SearchKeywords => SourceType::InternalSearch,
            SourceKey::WhatsappSpecs => SourceType::BuyerSpecs,
            SourceKey::PnsCalls => SourceType::CallTranscripts,
            SourceKey::RejectionComments => SourceType::RejectionReasons,
            SourceKey::LmsChats => SourceType::ChatData,
        }
    }

    /// Column holding the free-text data in the source export.
    pub fn data_column(&self) -> &'static str {
        match self {
            SourceKey::SearchKeywords => "decoded_keyword",
            SourceKey::WhatsappSpecs => "fk_im_spec_options_desc",
            SourceKey::PnsCalls => "transcribed_text",
            SourceKey::RejectionComments => "eto_ofr_reject_comment",
            SourceKey::LmsChats => "message_text_json",
        }
    }

    /// Column holding the frequency weight, if the source has one.
    ///
    /// Call transcripts carry no frequency column.
    pub fn frequency_column(&self) -> Option<&'static str> {
        match self {
            SourceKey::SearchKeywords => Some("pageviews"),
            SourceKey::WhatsappSpecs | SourceKey::RejectionComments | SourceKey::LmsChats => {
                Some("Frequency")
            }
            SourceKey::PnsCalls => None,
        }
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::UnknownSource(s.to_string()))
    }
}

/// Classification of a source's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// Site search keywords, weighted by pageviews
    InternalSearch,
    /// Buyer spec options from messaging, weighted by occurrences
    BuyerSpecs,
    /// Transcribed phone calls
    CallTranscripts,
    /// Free-text rejection reasons
    RejectionReasons,
    /// Lead-management chat messages
    ChatData,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::InternalSearch => "internal-search",
            SourceType::BuyerSpecs => "buyer-specs",
            SourceType::CallTranscripts => "call-transcripts",
            SourceType::RejectionReasons => "rejection-reasons",
            SourceType::ChatData => "chat-data",
        }
    }

    /// Name of the weight the source's rows are ranked by.
    pub fn metric_name(&self) -> &'static str {
        match self {
            SourceType::InternalSearch => "pageviews",
            _ => "occurrences",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_identifiers() {
        for key in SourceKey::ALL {
            assert_eq!(key.as_str().parse::<SourceKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key() {
        let err = "facebook_posts".parse::<SourceKey>().unwrap_err();
        assert_eq!(err, DomainError::UnknownSource("facebook_posts".to_string()));
    }

    #[test]
    fn test_source_type_mapping() {
        assert_eq!(SourceKey::SearchKeywords.source_type(), SourceType::InternalSearch);
        assert_eq!(SourceKey::PnsCalls.source_type().as_str(), "call-transcripts");
        assert_eq!(SourceKey::LmsChats.source_type().metric_name(), "occurrences");
        assert_eq!(SourceType::InternalSearch.metric_name(), "pageviews");
    }

    #[test]
    fn test_call_transcripts_have_no_frequency() {
        assert!(SourceKey::PnsCalls.frequency_column().is_none());
        assert_eq!(SourceKey::SearchKeywords.frequency_column(), Some("pageviews"));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&SourceKey::RejectionComments).unwrap();
        assert_eq!(json, "\"rejection_comments\"");
    }
}
