//! Integration tests for the source parsers
//!
//! Exercises the full fixture-to-record flow for each source format.

use gleaner::models::{LinkKind, Platform};
use gleaner::parser::{
    classify_link, detect_platform, rank_directories, ClubParser, ParticipantParser,
    ProfileParser, StargazerParser,
};
use gleaner::storage::dedup_records;

const LISTING_FIXTURE: &str = r#"
<html><body>
<div class="participants-list">
  <div class="user-profile">
    <a class="user-profile-link" href="https://devpost.com/alice"></a>
    <div class="user-name"><h5><a href="https://devpost.com/alice">Alice Smith</a></h5></div>
    <div class="role">Full-stack developer</div>
    <span class="participant-stat">5 Projects</span>
    <span class="participant-stat">1,204 Followers</span>
    <span class="participant-stat">2 Achievements</span>
    <span class="cp-tag">Looking for teammates</span>
  </div>
  <div class="user-profile">
    <a class="user-profile-link" href="https://devpost.com/bob"></a>
    <div class="user-name"><h5><a href="https://devpost.com/bob">Bob</a></h5></div>
  </div>
  <div class="user-profile">
    <a class="user-profile-link" href="https://devpost.com/alice"></a>
    <div class="user-name"><h5><a href="https://devpost.com/alice">Alice Smith</a></h5></div>
  </div>
</div>
</body></html>
"#;

#[test]
fn test_participant_listing_end_to_end() {
    let parser = ParticipantParser::new();

    assert_eq!(parser.count_cards(LISTING_FIXTURE), 3);

    let records = dedup_records(parser.parse_listing(LISTING_FIXTURE));
    assert_eq!(records.len(), 2);

    let alice = &records[0];
    assert_eq!(alice.username, "alice");
    assert_eq!(alice.name, "Alice Smith");
    assert_eq!(alice.role.as_deref(), Some("Full-stack developer"));
    assert_eq!(alice.projects, 5);
    assert_eq!(alice.followers, 1204);
    assert_eq!(alice.achievements, 2);
    assert_eq!(alice.team_status.as_deref(), Some("Looking for teammates"));

    let bob = &records[1];
    assert_eq!(bob.username, "bob");
    assert_eq!(bob.projects, 0);
    assert!(bob.team_status.is_none());
}

#[test]
fn test_stargazers_then_profile_enrichment() {
    let stargazers_html = r#"
        <ol class="follow-list">
          <li><a data-hovercard-type="user" href="/rustfan">rustfan</a></li>
          <li><a data-hovercard-type="user" href="/signup">signup</a></li>
          <li><a data-hovercard-type="user" href="/.darkfile">.darkfile</a></li>
        </ol>
    "#;

    let usernames = StargazerParser::new().parse_usernames(stargazers_html);
    assert_eq!(usernames, vec!["rustfan"]);

    let profile_html = r#"
        <span class="p-name">Rust Fan</span>
        <div class="p-note"><div class="user-profile-bio">Ping me: fan@rustmail.dev</div></div>
        <li itemprop="social"><a href="https://twitter.com/rustfan">@rustfan</a></li>
    "#;

    let record = ProfileParser::new().parse_profile(&usernames[0], profile_html);
    assert_eq!(record.name, "Rust Fan");
    assert_eq!(record.profile_url, "https://github.com/rustfan");
    assert_eq!(record.emails, vec!["fan@rustmail.dev"]);
    assert!(record.contact_links.contains_key(&LinkKind::Twitter));
}

#[test]
fn test_club_discovery_flow() {
    let search_html = r#"
        <a href="https://stanford.campuslabs.com/engage?src=search">Stanford Engage</a>
        <a href="https://engage.ucla.edu/organizations">UCLA</a>
        <a href="https://blog.example.org/top-clubs">blog post</a>
    "#;

    let parser = ClubParser::new();
    let links = parser.parse_search_results(search_html, "stanford clubs");
    assert_eq!(links.len(), 2);

    let ranked = rank_directories(links);
    assert_eq!(ranked[0].platform, Platform::CampusLabs);
    assert_eq!(ranked[0].school_name, "Stanford");

    let directory_html = r#"
        <h1>Student Organizations at Stanford</h1>
        <input type="search" placeholder="Search organizations">
        <div class="category-filter">Club categories</div>
    "#;
    assert!(parser.is_org_directory(directory_html));
    assert!(!parser.is_org_directory("<h1>Welcome to our campus</h1>"));
}

#[test]
fn test_platform_and_link_classification_agree_on_github() {
    assert_eq!(classify_link("https://github.com/rust-lang"), LinkKind::Github);
    assert_eq!(
        detect_platform("https://github.com/rust-lang"),
        Platform::Other
    );
}
