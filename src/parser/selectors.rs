//! CSS selectors for the supported listing and profile formats
//!
//! This module provides specialized selectors for parsing hackathon
//! participant listings, GitHub stargazer pages and GitHub profiles.
//! Each group carries fallback selectors because the sites ship several
//! markup generations at once.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Participant listing selectors
    static ref PARTICIPANT_CARD: Vec<Selector> = vec![
        parse_selector!(".user-profile"),
        parse_selector!("div.participant"),
        parse_selector!(".member-card"),
    ];

    static ref PARTICIPANT_PROFILE_LINK: Vec<Selector> = vec![
        parse_selector!("a.user-profile-link"),
        parse_selector!(".user-name h5 a"),
        parse_selector!("a[href*='/users/']"),
    ];

    static ref PARTICIPANT_NAME: Vec<Selector> = vec![
        parse_selector!(".user-name h5 a"),
        parse_selector!(".user-name"),
        parse_selector!("h5 a"),
    ];

    static ref PARTICIPANT_ROLE: Vec<Selector> = vec![
        parse_selector!(".role"),
        parse_selector!(".user-role"),
    ];

    static ref PARTICIPANT_PHOTO: Vec<Selector> = vec![
        parse_selector!(".user_photo img"),
        parse_selector!(".user-photo img"),
        parse_selector!("img.user-photo"),
    ];

    static ref PARTICIPANT_STATS: Vec<Selector> = vec![
        parse_selector!(".participant-stat"),
        parse_selector!(".user-stat"),
    ];

    static ref PARTICIPANT_TAGS: Vec<Selector> = vec![
        parse_selector!(".cp-tag"),
        parse_selector!(".tag"),
    ];

    // Stargazer listing selectors
    static ref STARGAZER_LINK: Vec<Selector> = vec![
        parse_selector!("a[data-hovercard-type='user']"),
        parse_selector!("ol.follow-list a[href^='/']"),
        parse_selector!("h3.follow-list-name a"),
    ];

    // GitHub profile selectors
    static ref PROFILE_NAME: Vec<Selector> = vec![
        parse_selector!("span.p-name"),
        parse_selector!("h1.vcard-names .p-name"),
        parse_selector!("span[itemprop='name']"),
    ];

    static ref PROFILE_BIO: Vec<Selector> = vec![
        parse_selector!("div.p-note .user-profile-bio"),
        parse_selector!(".user-profile-bio"),
        parse_selector!("div[data-bio-text]"),
    ];

    static ref PROFILE_LOCATION: Vec<Selector> = vec![
        parse_selector!("li[itemprop='homeLocation'] span.p-label"),
        parse_selector!("span.p-label"),
    ];

    static ref PROFILE_COMPANY: Vec<Selector> = vec![
        parse_selector!("li[itemprop='worksFor'] span.p-org"),
        parse_selector!("span.p-org"),
    ];

    static ref PROFILE_WEBSITE: Vec<Selector> = vec![
        parse_selector!("li[itemprop='url'] a"),
        parse_selector!("li[data-test-selector='profile-website-url'] a"),
    ];

    static ref PROFILE_EMAIL: Vec<Selector> = vec![
        parse_selector!("li[itemprop='email'] a"),
        parse_selector!("a[href^='mailto:']"),
    ];

    static ref PROFILE_FOLLOWERS: Vec<Selector> = vec![
        parse_selector!("a[href$='?tab=followers'] span"),
        parse_selector!("span.text-bold"),
    ];

    static ref PROFILE_AVATAR: Vec<Selector> = vec![
        parse_selector!("img.avatar-user"),
        parse_selector!("img.avatar"),
    ];

    static ref PROFILE_SOCIAL_LINKS: Vec<Selector> = vec![
        parse_selector!("li[itemprop='social'] a"),
        parse_selector!(".vcard-details a[rel='nofollow me']"),
    ];

    // Club directory selectors
    static ref CLUB_RESULT_LINK: Vec<Selector> = vec![
        parse_selector!("a[href]"),
    ];
}

/// Selectors for hackathon participant listing cards
pub struct ParticipantSelectors {
    pub card: &'static [Selector],
    pub profile_link: &'static [Selector],
    pub name: &'static [Selector],
    pub role: &'static [Selector],
    pub photo: &'static [Selector],
    pub stats: &'static [Selector],
    pub tags: &'static [Selector],
}

impl ParticipantSelectors {
    pub fn new() -> Self {
        Self {
            card: &PARTICIPANT_CARD,
            profile_link: &PARTICIPANT_PROFILE_LINK,
            name: &PARTICIPANT_NAME,
            role: &PARTICIPANT_ROLE,
            photo: &PARTICIPANT_PHOTO,
            stats: &PARTICIPANT_STATS,
            tags: &PARTICIPANT_TAGS,
        }
    }
}

impl Default for ParticipantSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors for GitHub stargazer listing pages
pub struct StargazerSelectors {
    pub user_link: &'static [Selector],
}

impl StargazerSelectors {
    pub fn new() -> Self {
        Self {
            user_link: &STARGAZER_LINK,
        }
    }
}

impl Default for StargazerSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors for GitHub user profile pages
pub struct ProfileSelectors {
    pub name: &'static [Selector],
    pub bio: &'static [Selector],
    pub location: &'static [Selector],
    pub company: &'static [Selector],
    pub website: &'static [Selector],
    pub email: &'static [Selector],
    pub followers: &'static [Selector],
    pub avatar: &'static [Selector],
    pub social_links: &'static [Selector],
}

impl ProfileSelectors {
    pub fn new() -> Self {
        Self {
            name: &PROFILE_NAME,
            bio: &PROFILE_BIO,
            location: &PROFILE_LOCATION,
            company: &PROFILE_COMPANY,
            website: &PROFILE_WEBSITE,
            email: &PROFILE_EMAIL,
            followers: &PROFILE_FOLLOWERS,
            avatar: &PROFILE_AVATAR,
            social_links: &PROFILE_SOCIAL_LINKS,
        }
    }
}

impl Default for ProfileSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors for club directory search results
pub struct ClubSelectors {
    pub result_link: &'static [Selector],
}

impl ClubSelectors {
    pub fn new() -> Self {
        Self {
            result_link: &CLUB_RESULT_LINK,
        }
    }
}

impl Default for ClubSelectors {
    fn default() -> Self {
        Self::new()
    }
}
