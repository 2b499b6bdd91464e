//! Indicator tables for company-vs-person classification
//!
//! These are maintained data, not algorithm. `EntityLexicon::default()` carries the
//! built-in tables; `LexiconOverrides` (usually loaded from YAML config) extends them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Substrings marking an investment firm or capital vehicle
pub const CAPITAL_KEYWORDS: &[&str] = &[
    "capital",
    "ventures",
    "venture",
    "partners",
    "fund",
    "holdings",
    "advisors",
    "advisers",
    "equity",
    "management",
    "investments",
    "asset",
    "angels",
];

/// Generic corporate suffixes, matched as whole tokens
pub const CORPORATE_SUFFIXES: &[&str] = &[
    "inc",
    "incorporated",
    "llc",
    "corp",
    "corporation",
    "ltd",
    "limited",
    "plc",
    "gmbh",
    "lp",
    "llp",
    "co",
    "company",
    "ag",
    "sa",
];

/// Well-known investment firms and financial institutions
pub const KNOWN_CAPITAL_FIRMS: &[&str] = &[
    "sequoia",
    "andreessen horowitz",
    "a16z",
    "accel",
    "benchmark",
    "kleiner perkins",
    "greylock",
    "lightspeed",
    "index ventures",
    "general catalyst",
    "khosla ventures",
    "founders fund",
    "tiger global",
    "insight partners",
    "coatue",
    "thrive capital",
    "y combinator",
    "softbank",
    "blackrock",
    "blackstone",
    "goldman sachs",
    "morgan stanley",
    "jpmorgan",
    "j.p. morgan",
    "kkr",
    "carlyle",
    "fidelity",
    "vanguard",
    "temasek",
    "mubadala",
];

/// Megacap corporations frequently mis-entered as investors or founders
pub const KNOWN_CORPORATIONS: &[&str] = &[
    "google",
    "alphabet",
    "microsoft",
    "amazon",
    "apple",
    "meta",
    "facebook",
    "nvidia",
    "intel",
    "oracle",
    "ibm",
    "salesforce",
    "tesla",
    "samsung",
    "tencent",
    "alibaba",
    "baidu",
    "cisco",
    "qualcomm",
    "amd",
    "dell",
    "hp",
    "equinix",
    "digital realty",
    // full names of entries too short for containment matching
    "meta platforms",
    "meta ai",
    "ibm research",
    "international business machines",
    "advanced micro devices",
    "hewlett packard",
    "hewlett packard enterprise",
    "dell technologies",
    "amazon web services",
    "google deepmind",
    "microsoft research",
];

/// Narrow "obviously a company" indicators used when attributing investors
pub const COMPANY_INDICATORS: &[&str] = &[
    "inc",
    "llc",
    "ltd",
    "corp",
    "corporation",
    "plc",
    "gmbh",
    "lp",
    "llp",
    "ventures",
    "capital",
    "labs",
    "technologies",
    "foundation",
    "bank",
];

/// Company tags marking an investment firm
pub const CAPITAL_TAGS: &[&str] = &[
    "investment firm",
    "investment-firm",
    "venture capital",
    "venture-capital",
    "vc",
    "private equity",
    "private-equity",
    "investor",
];

/// Extensions to the built-in tables, usually read from config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconOverrides {
    pub capital_keywords: Vec<String>,
    pub known_capital_firms: Vec<String>,
    pub known_corporations: Vec<String>,
    pub company_indicators: Vec<String>,
    pub capital_tags: Vec<String>,
}

/// The lowercase indicator tables consulted by `EntityClassifier`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLexicon {
    pub capital_keywords: BTreeSet<String>,
    pub corporate_suffixes: BTreeSet<String>,
    pub known_capital_firms: BTreeSet<String>,
    pub known_corporations: BTreeSet<String>,
    pub company_indicators: BTreeSet<String>,
    pub capital_tags: BTreeSet<String>,
}

impl Default for EntityLexicon {
    fn default() -> Self {
        Self {
            capital_keywords: to_set(CAPITAL_KEYWORDS),
            corporate_suffixes: to_set(CORPORATE_SUFFIXES),
            known_capital_firms: to_set(KNOWN_CAPITAL_FIRMS),
            known_corporations: to_set(KNOWN_CORPORATIONS),
            company_indicators: to_set(COMPANY_INDICATORS),
            capital_tags: to_set(CAPITAL_TAGS),
        }
    }
}

impl EntityLexicon {
    /// Built-in tables extended with `overrides`
    pub fn with_overrides(overrides: &LexiconOverrides) -> Self {
        let mut lexicon = Self::default();
        lexicon.extend(overrides);
        lexicon
    }

    /// Add override entries (lowercased, blanks ignored)
    pub fn extend(&mut self, overrides: &LexiconOverrides) {
        extend_set(&mut self.capital_keywords, &overrides.capital_keywords);
        extend_set(&mut self.known_capital_firms, &overrides.known_capital_firms);
        extend_set(&mut self.known_corporations, &overrides.known_corporations);
        extend_set(&mut self.company_indicators, &overrides.company_indicators);
        extend_set(&mut self.capital_tags, &overrides.capital_tags);
    }

    /// Known capital firms and corporations together
    pub fn known_entities(&self) -> impl Iterator<Item = &str> {
        self.known_capital_firms
            .iter()
            .chain(self.known_corporations.iter())
            .map(String::as_str)
    }
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn extend_set(set: &mut BTreeSet<String>, items: &[String]) {
    set.extend(
        items
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty()),
    );
}
