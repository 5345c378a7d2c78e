//! Hackathon participant listing parser
//!
//! The listing renders one card per participant. Parsing always runs over
//! the full accumulated document from the scroll harvester, so the same
//! card can appear more than once; dedup over the natural key happens here.

use scraper::{ElementRef, Html};
use std::collections::HashSet;

use crate::models::HarvestedRecord;
use crate::parser::selectors::ParticipantSelectors;
use crate::utils::error::ParseError;
use crate::utils::normalize_whitespace;

/// Parser for participant listing documents
pub struct ParticipantParser {
    selectors: ParticipantSelectors,
}

impl ParticipantParser {
    pub fn new() -> Self {
        Self {
            selectors: ParticipantSelectors::new(),
        }
    }

    /// Count participant cards in a document
    ///
    /// Cheap enough to run every harvest iteration; this is the item
    /// counter the scroll harvester probes.
    pub fn count_cards(&self, html: &str) -> usize {
        let document = Html::parse_document(html);
        self.selectors
            .card
            .iter()
            .map(|sel| document.select(sel).count())
            .max()
            .unwrap_or(0)
    }

    /// Parse every unique participant card in the document
    ///
    /// Cards without a usable identity (no profile link and no name) are
    /// skipped with a warning. Duplicates by natural key keep the first
    /// occurrence.
    pub fn parse_listing(&self, html: &str) -> Vec<HarvestedRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for selector in self.selectors.card {
            for card in document.select(selector) {
                match self.parse_card(&card) {
                    Some(record) => {
                        if seen.insert(record.natural_key().to_string()) {
                            records.push(record);
                        }
                    }
                    None => {
                        tracing::warn!("Skipping participant card without identity");
                    }
                }
            }
            if !records.is_empty() {
                break;
            }
        }

        records
    }

    /// Parse a window of the listing: skip `offset` records, take up to `limit`
    ///
    /// # Errors
    ///
    /// Returns `ParseError::NoItemsFound` when the document has no cards,
    /// and `ParseError::OffsetOutOfRange` when fewer than `offset` unique
    /// records exist.
    pub fn parse_batch(
        &self,
        html: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<HarvestedRecord>, ParseError> {
        let all = self.parse_listing(html);

        if all.is_empty() {
            return Err(ParseError::NoItemsFound);
        }

        if all.len() < offset {
            return Err(ParseError::OffsetOutOfRange {
                offset,
                available: all.len(),
            });
        }

        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    /// Extract one record from a participant card
    fn parse_card(&self, card: &ElementRef) -> Option<HarvestedRecord> {
        let profile_url = self
            .first_attr(card, self.selectors.profile_link, "href")
            .unwrap_or_default();
        let name = self
            .first_text(card, self.selectors.name)
            .unwrap_or_default();

        let mut record = HarvestedRecord {
            name,
            profile_url,
            ..Default::default()
        };

        record.username = Self::username_from_url(&record.profile_url);

        if !record.has_natural_key() {
            return None;
        }

        record.role = self.first_text(card, self.selectors.role);
        record.avatar_url = self.first_attr(card, self.selectors.photo, "src");

        for selector in self.selectors.stats {
            for stat in card.select(selector) {
                let text = normalize_whitespace(&stat.text().collect::<String>());
                Self::apply_stat(&mut record, &text);
            }
        }

        for selector in self.selectors.tags {
            if let Some(tag) = card.select(selector).next() {
                let text = normalize_whitespace(&tag.text().collect::<String>());
                if !text.is_empty() {
                    record.team_status = Some(text);
                }
                break;
            }
        }

        Some(record)
    }

    /// Parse a stat line such as "3 Projects" or "12 Followers"
    fn apply_stat(record: &mut HarvestedRecord, text: &str) {
        let Some(count) = text
            .split_whitespace()
            .next()
            .and_then(|n| n.replace(',', "").parse::<u32>().ok())
        else {
            return;
        };

        let lower = text.to_lowercase();
        if lower.contains("project") {
            record.projects = count;
        } else if lower.contains("follower") {
            record.followers = count;
        } else if lower.contains("achievement") {
            record.achievements = count;
        }
    }

    /// Derive a username from a profile URL path
    fn username_from_url(url: &str) -> String {
        url.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|seg| !seg.contains('.') && !seg.contains(':'))
            .unwrap_or_default()
            .to_string()
    }

    fn first_text(&self, card: &ElementRef, selectors: &[scraper::Selector]) -> Option<String> {
        for selector in selectors {
            if let Some(el) = card.select(selector).next() {
                let text = normalize_whitespace(&el.text().collect::<String>());
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    fn first_attr(
        &self,
        card: &ElementRef,
        selectors: &[scraper::Selector],
        attr: &str,
    ) -> Option<String> {
        for selector in selectors {
            if let Some(el) = card.select(selector).next() {
                if let Some(value) = el.value().attr(attr) {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
        None
    }
}

impl Default for ParticipantParser {
    fn default() -> Self {
        Self::new()
    }
}
