use serde::{Deserialize, Serialize};

/// How the requester describes their own stance toward the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profile {
    Clueless,
    Motivated,
    Hesitant,
}

impl Profile {
    /// Lowercase descriptor used in prompts ("I am motivated.").
    pub fn descriptor(self) -> &'static str {
        match self {
            Profile::Clueless => "clueless",
            Profile::Motivated => "motivated",
            Profile::Hesitant => "hesitant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_from_uppercase() {
        let profile: Profile = serde_json::from_str(r#""MOTIVATED""#).unwrap();
        assert_eq!(profile, Profile::Motivated);
    }

    #[test]
    fn test_profile_rejects_unknown_value() {
        assert!(serde_json::from_str::<Profile>(r#""CURIOUS""#).is_err());
    }

    #[test]
    fn test_descriptor_is_lowercase() {
        assert_eq!(Profile::Hesitant.descriptor(), "hesitant");
    }
}
