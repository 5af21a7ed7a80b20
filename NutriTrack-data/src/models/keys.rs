use std::fmt;

/// One persisted blob per application domain.
///
/// The string values are the stable on-disk keys. Changing them orphans
/// data written by earlier versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// Profile, metabolic profile, onboarding flags and sync status
    User,
    Meals,
    Weight,
    Water,
    Favorites,
    /// Recipe ids handed out by the meal plan generator, keyed by date
    SuggestionHistory,
    AuthSession,
}

impl StorageKey {
    pub const ALL: [StorageKey; 7] = [
        StorageKey::User,
        StorageKey::Meals,
        StorageKey::Weight,
        StorageKey::Water,
        StorageKey::Favorites,
        StorageKey::SuggestionHistory,
        StorageKey::AuthSession,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::User => "nutrition-user-storage",
            StorageKey::Meals => "nutrition-meals-storage",
            StorageKey::Weight => "nutrition-weight-storage",
            StorageKey::Water => "nutrition-water-storage",
            StorageKey::Favorites => "nutrition-favorites",
            StorageKey::SuggestionHistory => "meal-suggestion-history",
            StorageKey::AuthSession => "nutrition-auth-session",
        }
    }

    /// Reverse lookup of [`StorageKey::as_str`]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_and_reversible() {
        let mut seen = std::collections::HashSet::new();
        for key in StorageKey::ALL {
            assert!(seen.insert(key.as_str()));
            assert_eq!(StorageKey::from_key(key.as_str()), Some(key));
        }
        assert_eq!(StorageKey::from_key("unknown"), None);
    }
}
