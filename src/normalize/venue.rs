//! Venue and district canonicalization.

use super::collapse_whitespace;

// Alias table scanned in declaration order; lookup is case-insensitive
// substring match, so the alias column is kept lower-cased.
const VENUE_ALIASES: &[(&str, &str)] = &[
    ("香港會議展覽中心", "香港會議展覽中心"),
    ("hong kong convention and exhibition centre", "香港會議展覽中心"),
    ("hkcec", "香港會議展覽中心"),
    ("九龍灣國際展貿中心", "九龍灣國際展貿中心"),
    ("kowloonbay international trade & exhibition centre", "九龍灣國際展貿中心"),
    ("kitec", "九龍灣國際展貿中心"),
];

// The 18 districts, scanned in declaration order. Overlapping names tie-break
// by declaration order, earliest wins.
const DISTRICTS: &[&str] = &[
    // Hong Kong Island
    "中西區", "灣仔", "東區", "南區",
    // Kowloon
    "油尖旺", "深水埗", "九龍城", "黃大仙", "觀塘",
    // New Territories
    "葵青", "荃灣", "屯門", "元朗", "北區", "大埔", "沙田", "西貢", "離島",
];

const ENGLISH_DISTRICTS: &[(&str, &str)] = &[
    ("Central", "中西區"),
    ("Western", "中西區"),
    ("Wan Chai", "灣仔"),
    ("Eastern", "東區"),
    ("Southern", "南區"),
    ("Yau Tsim Mong", "油尖旺"),
    ("Sham Shui Po", "深水埗"),
    ("Kowloon City", "九龍城"),
    ("Wong Tai Sin", "黃大仙"),
    ("Kwun Tong", "觀塘"),
    ("Kwai Tsing", "葵青"),
    ("Tsuen Wan", "荃灣"),
    ("Tuen Mun", "屯門"),
    ("Yuen Long", "元朗"),
    ("North", "北區"),
    ("Tai Po", "大埔"),
    ("Sha Tin", "沙田"),
    ("Sai Kung", "西貢"),
    ("Islands", "離島"),
];

/// Maps raw venue and address text onto canonical labels. Constructed per
/// pipeline rather than held as shared state.
pub struct VenueCanonicalizer {
    aliases: &'static [(&'static str, &'static str)],
    districts: &'static [&'static str],
    english_districts: &'static [(&'static str, &'static str)],
}

impl VenueCanonicalizer {
    pub fn new() -> Self {
        Self {
            aliases: VENUE_ALIASES,
            districts: DISTRICTS,
            english_districts: ENGLISH_DISTRICTS,
        }
    }

    /// Canonical venue label for raw venue text. Known aliases collapse to
    /// one canonical Chinese label; anything unmapped passes through with
    /// collapsed whitespace. Blank input yields None.
    pub fn canonical_venue(&self, raw: &str) -> Option<String> {
        let name = collapse_whitespace(raw);
        if name.is_empty() {
            return None;
        }
        let lowered = name.to_lowercase();
        for (alias, canonical) in self.aliases {
            if lowered.contains(alias) {
                return Some((*canonical).to_string());
            }
        }
        Some(name)
    }

    /// District named in an address: the Chinese district list is scanned
    /// first, then the English table. First match wins; no match is None.
    pub fn district(&self, address: &str) -> Option<String> {
        let address = collapse_whitespace(address);
        if address.is_empty() {
            return None;
        }
        for district in self.districts {
            if address.contains(district) {
                return Some((*district).to_string());
            }
        }
        for (english, chinese) in self.english_districts {
            if address.contains(english) {
                return Some((*chinese).to_string());
            }
        }
        None
    }
}

impl Default for VenueCanonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_aliases_collapse_to_canonical_label() {
        let venues = VenueCanonicalizer::new();
        assert_eq!(
            venues.canonical_venue("HKCEC").as_deref(),
            Some("香港會議展覽中心")
        );
        assert_eq!(
            venues
                .canonical_venue("Hong Kong Convention and Exhibition Centre, Wan Chai")
                .as_deref(),
            Some("香港會議展覽中心")
        );
        assert_eq!(
            venues.canonical_venue("kitec").as_deref(),
            Some("九龍灣國際展貿中心")
        );
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let venues = VenueCanonicalizer::new();
        let canonical = venues.canonical_venue("香港會議展覽中心").unwrap();
        assert_eq!(venues.canonical_venue(&canonical), Some(canonical.clone()));

        let passthrough = venues.canonical_venue("數碼港商場").unwrap();
        assert_eq!(venues.canonical_venue(&passthrough), Some(passthrough.clone()));
    }

    #[test]
    fn test_unmapped_venue_passes_through_collapsed() {
        let venues = VenueCanonicalizer::new();
        assert_eq!(
            venues.canonical_venue("  旺角  社區會堂 ").as_deref(),
            Some("旺角 社區會堂")
        );
        assert_eq!(venues.canonical_venue("   "), None);
    }

    #[test]
    fn test_district_from_chinese_address() {
        let venues = VenueCanonicalizer::new();
        assert_eq!(
            venues.district("香港灣仔博覽道1號").as_deref(),
            Some("灣仔")
        );
        assert_eq!(venues.district("大埔墟鄉事會街8號").as_deref(), Some("大埔"));
    }

    #[test]
    fn test_district_from_english_address() {
        let venues = VenueCanonicalizer::new();
        assert_eq!(venues.district("Central").as_deref(), Some("中西區"));
        assert_eq!(
            venues.district("3 Tsun Wen Road, Tuen Mun").as_deref(),
            Some("屯門")
        );
    }

    #[test]
    fn test_overlaps_resolve_by_declaration_order() {
        let venues = VenueCanonicalizer::new();
        // 灣仔 is declared before 東區, so it wins even when 東區 appears
        // first in the text
        assert_eq!(
            venues.district("東區海底隧道口往灣仔方向").as_deref(),
            Some("灣仔")
        );
        // The Chinese list is scanned before the English table
        assert_eq!(
            venues.district("Wan Chai 灣仔 North Point").as_deref(),
            Some("灣仔")
        );
    }

    #[test]
    fn test_unknown_address_has_no_district() {
        let venues = VenueCanonicalizer::new();
        assert_eq!(venues.district("Lantau somewhere"), None);
        assert_eq!(venues.district(""), None);
    }
}
