// Core data structures for the gleaner harvesters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// A single harvested contact/profile record
///
/// Flat mapping of optional fields shared by all harvesters. A record is
/// parsed once and written once; there is no lifecycle beyond that.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HarvestedRecord {
    pub username: String,
    pub name: String,
    pub profile_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_status: Option<String>,

    #[serde(default)]
    pub projects: u32,

    #[serde(default)]
    pub followers: u32,

    #[serde(default)]
    pub achievements: u32,

    /// Email addresses found on or via the profile
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,

    /// Classified contact links keyed by kind
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contact_links: BTreeMap<LinkKind, ContactLink>,
}

impl HarvestedRecord {
    /// Natural key for deduplication: profile URL if present, else username
    pub fn natural_key(&self) -> &str {
        if !self.profile_url.is_empty() {
            &self.profile_url
        } else {
            &self.username
        }
    }

    /// A record is keyable when it carries either identity field
    pub fn has_natural_key(&self) -> bool {
        !self.username.is_empty() || !self.profile_url.is_empty()
    }

    /// Add an email if it is not already present
    pub fn add_email(&mut self, email: &str) {
        if !self.emails.iter().any(|e| e == email) {
            self.emails.push(email.to_string());
        }
    }
}

/// A classified outbound link from a profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactLink {
    pub url: String,
    pub label: String,
}

/// Link classification buckets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Github,
    Linkedin,
    Twitter,
    Website,
    Email,
    Instagram,
    Youtube,
    Medium,
    Other,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::Website => "website",
            Self::Email => "email",
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Medium => "medium",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated club directory link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectoryLink {
    pub url: String,
    pub platform: Platform,
    pub school_name: String,
    pub source: String,
}

/// Club directory hosting platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    CampusLabs,
    CollegiateLink,
    OrgSync,
    Presence,
    CampusGroups,
    Involved,
    Engage,
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampusLabs => "campuslabs",
            Self::CollegiateLink => "collegiatelink",
            Self::OrgSync => "orgsync",
            Self::Presence => "presence",
            Self::CampusGroups => "campusgroups",
            Self::Involved => "involved",
            Self::Engage => "engage",
            Self::Other => "other",
        }
    }

    /// Ordering preference when ranking discovered directories
    pub fn priority(&self) -> u8 {
        match self {
            Self::CampusLabs => 1,
            Self::CollegiateLink => 2,
            Self::Involved => 3,
            Self::Engage => 4,
            _ => 5,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Harvest checkpoint for resume functionality
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarvestState {
    pub seen_keys: HashSet<String>,
    pub source_url: Option<String>,
    pub last_offset: usize,
    pub total_harvested: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl HarvestState {
    /// Create new harvest state
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: Some(now),
            updated_at: now,
            ..Default::default()
        }
    }

    /// Load state from file, return default if not found or corrupted
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save state to file
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&temp_path, content)?;
        std::fs::rename(temp_path, path)?;
        Ok(())
    }

    /// Check if a record was already harvested
    pub fn is_seen(&self, key: &str) -> bool {
        self.seen_keys.contains(key)
    }

    /// Mark a record as harvested
    pub fn mark_seen(&mut self, key: &str) {
        self.seen_keys.insert(key.to_string());
        self.total_harvested += 1;
        self.updated_at = Utc::now();
    }
}
