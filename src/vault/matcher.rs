//! Hostname to vault item matching.
//!
//! Vault items do not reliably carry a hostname field, so matching works off
//! the normalized `domain` and `title` with containment in both directions.
//! This tolerates vaults that store `example.com` while the caller asks for
//! `login.example.com`, and the reverse.
//!
//! Precedence is tiered. Each tier scans the listing in vault order (which is
//! recency order and is never re-sorted) and the first hit in the highest tier
//! wins:
//!
//! 1. domain equals hostname
//! 2. domain contains hostname, or hostname contains domain
//! 3. title contains hostname, or hostname contains title
//!
//! So an exact-domain item always beats a title-only item, whichever comes
//! first. [`find_any_field_match`] is a separate, looser pass callers run only
//! when the tiers find nothing.

use super::normalize::ItemRecord;
use super::types::MatchResult;

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    ExactDomain,
    DomainContainment,
    Title,
    AnyField,
}

fn normalize_host(hostname: &str) -> String {
    hostname.trim().trim_end_matches('.').to_lowercase()
}

/// Containment in either direction. Empty strings never match.
fn contains_either_way(field: &str, host: &str) -> bool {
    let field = field.trim().to_lowercase();
    if field.is_empty() || host.is_empty() {
        return false;
    }
    field.contains(host) || host.contains(&field)
}

fn tier_of(record: &ItemRecord, host: &str) -> Option<MatchTier> {
    let domain = record.item.domain.trim().to_lowercase();

    if !domain.is_empty() && domain == host {
        Some(MatchTier::ExactDomain)
    } else if contains_either_way(&domain, host) {
        Some(MatchTier::DomainContainment)
    } else if contains_either_way(&record.item.title, host) {
        Some(MatchTier::Title)
    } else {
        None
    }
}

/// Best match for `hostname` using the domain and title tiers.
pub fn find_best_match(items: &[ItemRecord], hostname: &str) -> Option<MatchResult> {
    find_best_match_with_tier(items, hostname).map(|(result, _)| result)
}

/// Like [`find_best_match`], also reporting which tier matched.
pub fn find_best_match_with_tier(
    items: &[ItemRecord],
    hostname: &str,
) -> Option<(MatchResult, MatchTier)> {
    let host = normalize_host(hostname);
    if host.is_empty() {
        return None;
    }

    let mut best: Option<(&ItemRecord, MatchTier)> = None;
    for record in items {
        let Some(tier) = tier_of(record, &host) else {
            continue;
        };
        // Strictly better only, so earlier items win ties.
        if best.map_or(true, |(_, current)| tier < current) {
            best = Some((record, tier));
            if tier == MatchTier::ExactDomain {
                break;
            }
        }
    }

    best.map(|(record, tier)| (MatchResult::from(record.item.clone()), tier))
}

/// Fallback pass: first item with any string field containing the hostname.
pub fn find_any_field_match(items: &[ItemRecord], hostname: &str) -> Option<MatchResult> {
    let host = normalize_host(hostname);
    if host.is_empty() {
        return None;
    }

    items
        .iter()
        .find(|record| record.text_fields.iter().any(|field| field.to_lowercase().contains(&host)))
        .map(|record| MatchResult::from(record.item.clone()))
}

/// Tiered match, then the any-field pass.
pub fn find_match_with_fallback(
    items: &[ItemRecord],
    hostname: &str,
) -> Option<(MatchResult, MatchTier)> {
    find_best_match_with_tier(items, hostname)
        .or_else(|| find_any_field_match(items, hostname).map(|m| (m, MatchTier::AnyField)))
}
