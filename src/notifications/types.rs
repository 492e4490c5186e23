use crate::tokens::types::TokenDisplayRecord;

/// Which handle layout the delivery layer should render.
///
/// Derived deterministically from the reconciled record; the
/// case-insensitive split comparison lives on the record itself.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleDisplay {
    /// Creator and fee recipient differ - show both
    Split {
        creator: String,
        fee_recipient: String,
    },
    /// Same person holds both roles - one handle line
    Single(String),
    /// Only one role is known; labeled as creator either way
    CreatorOnly(String),
    /// No social data resolved
    Unknown,
}

impl HandleDisplay {
    pub fn from_record(record: &TokenDisplayRecord) -> Self {
        if record.is_split() {
            return HandleDisplay::Split {
                creator: record.creator_handle.clone().unwrap_or_default(),
                fee_recipient: record.fee_recipient_handle.clone().unwrap_or_default(),
            };
        }

        match (&record.creator_handle, &record.fee_recipient_handle) {
            (Some(creator), Some(_)) => HandleDisplay::Single(creator.clone()),
            _ => match record.effective_creator() {
                Some(handle) => HandleDisplay::CreatorOnly(handle.to_string()),
                None => HandleDisplay::Unknown,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::types::{DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL};

    fn record(creator: Option<&str>, fee: Option<&str>) -> TokenDisplayRecord {
        TokenDisplayRecord {
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            image: None,
            website: None,
            creator_handle: creator.map(str::to_string),
            fee_recipient_handle: fee.map(str::to_string),
            royalty_percent: None,
        }
    }

    #[test]
    fn different_handles_display_as_split() {
        assert_eq!(
            HandleDisplay::from_record(&record(Some("alice"), Some("bob"))),
            HandleDisplay::Split {
                creator: "alice".to_string(),
                fee_recipient: "bob".to_string(),
            }
        );
    }

    #[test]
    fn same_handle_displays_once() {
        assert_eq!(
            HandleDisplay::from_record(&record(Some("Alice"), Some("alice"))),
            HandleDisplay::Single("Alice".to_string())
        );
    }

    #[test]
    fn lone_fee_recipient_is_labeled_creator() {
        assert_eq!(
            HandleDisplay::from_record(&record(None, Some("bob"))),
            HandleDisplay::CreatorOnly("bob".to_string())
        );
    }

    #[test]
    fn no_handles_display_unknown() {
        assert_eq!(
            HandleDisplay::from_record(&record(None, None)),
            HandleDisplay::Unknown
        );
    }
}
