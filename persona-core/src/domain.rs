//! Domain lexicon
//!
//! Occupational domains shape both the profile (through the domain modifier)
//! and the compiled text (vocabulary, phrases, formatting directives). The
//! lexicon is an immutable value built once at startup and passed by
//! reference; nothing reads it from global state.

use crate::{ConfigError, PersonaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical key of the fallback domain.
pub const GENERAL_DOMAIN: &str = "general";

/// Style settings for one occupational domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Canonical key, e.g. "engineering".
    #[serde(default)]
    pub name: String,
    /// Display label, e.g. "Engineering".
    pub label: String,
    /// Added (times 0.5) to the verbosity trait.
    #[serde(default)]
    pub verbosity_modifier: f64,
    /// Added (times 0.5) to the formality trait.
    #[serde(default)]
    pub formality_modifier: f64,
    #[serde(default)]
    pub skepticism: f64,
    #[serde(default)]
    pub data_emphasis: f64,
    #[serde(default)]
    pub vocabulary: Vec<String>,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default)]
    pub formatting: Vec<String>,
}

impl DomainConfig {
    /// A domain with every modifier at zero.
    pub fn neutral(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            verbosity_modifier: 0.0,
            formality_modifier: 0.0,
            skepticism: 0.0,
            data_emphasis: 0.0,
            vocabulary: Vec::new(),
            phrases: Vec::new(),
            formatting: Vec::new(),
        }
    }

    fn validate(&self) -> PersonaResult<()> {
        let scalars = [
            ("verbosity_modifier", self.verbosity_modifier),
            ("formality_modifier", self.formality_modifier),
            ("skepticism", self.skepticism),
            ("data_emphasis", self.data_emphasis),
        ];
        for (field, value) in scalars {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: format!("domains.{}.{}", self.name, field),
                    value: value.to_string(),
                    reason: "must be between -1.0 and 1.0".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Lower-case, trim, and fold separators so "People_Ops" and "people ops" match.
fn normalize_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Domain table plus alias table.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainLexicon {
    domains: BTreeMap<String, DomainConfig>,
    aliases: BTreeMap<String, String>,
    fallback: DomainConfig,
}

/// On-disk shape of a lexicon.
#[derive(Debug, Deserialize)]
struct LexiconFile {
    domains: BTreeMap<String, DomainConfig>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

impl DomainLexicon {
    /// The built-in domains and aliases.
    ///
    /// | alias | domain |
    /// |---|---|
    /// | eng, engineer, software, dev, developer, tech, it | engineering |
    /// | law, lawyer, attorney, counsel, compliance | legal |
    /// | exec, leadership, c suite, csuite, management | executive |
    /// | human resources, people, people ops, talent | hr |
    /// | biz dev, business development, account executive | sales |
    /// | fin, accounting, treasury | finance |
    ///
    /// Anything else resolves to `general`.
    pub fn builtin() -> Self {
        let mut domains = BTreeMap::new();

        let mut general = DomainConfig::neutral(GENERAL_DOMAIN, "General");
        general.vocabulary = strings(&["priorities", "next steps", "deliverables", "stakeholders", "follow-up", "alignment"]);
        general.phrases = strings(&["Here is where things stand.", "Let's make sure we're aligned."]);
        general.formatting = strings(&["Use short paragraphs with clear topic sentences."]);
        domains.insert(GENERAL_DOMAIN.to_string(), general);

        domains.insert(
            "engineering".to_string(),
            DomainConfig {
                name: "engineering".to_string(),
                label: "Engineering".to_string(),
                verbosity_modifier: -0.4,
                formality_modifier: -0.3,
                skepticism: 0.7,
                data_emphasis: 0.8,
                vocabulary: strings(&["root cause", "edge case", "regression", "trade-off", "latency", "throughput", "technical debt", "rollback"]),
                phrases: strings(&["What does the data say?", "Show me the benchmark.", "Let's not over-engineer this."]),
                formatting: strings(&[
                    "Use bullet points for lists of findings.",
                    "Put code, commands and identifiers in code blocks.",
                    "Lead with the conclusion, then the evidence.",
                ]),
            },
        );

        domains.insert(
            "legal".to_string(),
            DomainConfig {
                name: "legal".to_string(),
                label: "Legal".to_string(),
                verbosity_modifier: 0.5,
                formality_modifier: 0.8,
                skepticism: 0.8,
                data_emphasis: 0.4,
                vocabulary: strings(&["liability", "precedent", "jurisdiction", "indemnification", "material breach", "due diligence", "counterparty", "compliance"]),
                phrases: strings(&["Subject to the foregoing,", "Without prejudice to our position,", "It is worth noting the risk that"]),
                formatting: strings(&[
                    "Number every point so it can be referenced.",
                    "State assumptions and caveats explicitly.",
                    "Avoid speculative language.",
                ]),
            },
        );

        domains.insert(
            "executive".to_string(),
            DomainConfig {
                name: "executive".to_string(),
                label: "Executive".to_string(),
                verbosity_modifier: -0.6,
                formality_modifier: 0.4,
                skepticism: 0.4,
                data_emphasis: 0.6,
                vocabulary: strings(&["ROI", "runway", "north star", "headcount", "market share", "strategic priorities", "OKRs", "burn rate"]),
                phrases: strings(&["What's the bottom line?", "How does this move the needle?", "I need a decision by Friday."]),
                formatting: strings(&[
                    "Begin with an executive summary of no more than three sentences.",
                    "End with a clear recommendation and the decision needed.",
                ]),
            },
        );

        domains.insert(
            "hr".to_string(),
            DomainConfig {
                name: "hr".to_string(),
                label: "Human Resources".to_string(),
                verbosity_modifier: 0.3,
                formality_modifier: 0.2,
                skepticism: 0.2,
                data_emphasis: 0.3,
                vocabulary: strings(&["engagement", "retention", "onboarding", "wellbeing", "performance review", "development plan", "inclusion", "policy"]),
                phrases: strings(&["How is the team feeling about this?", "Let's make sure everyone is heard."]),
                formatting: strings(&[
                    "Use an empathetic, person-first tone.",
                    "Reference the relevant policy when giving guidance.",
                ]),
            },
        );

        domains.insert(
            "sales".to_string(),
            DomainConfig {
                name: "sales".to_string(),
                label: "Sales".to_string(),
                verbosity_modifier: 0.2,
                formality_modifier: -0.2,
                skepticism: 0.1,
                data_emphasis: 0.5,
                vocabulary: strings(&["pipeline", "quota", "close rate", "objection", "champion", "discovery call", "upsell", "renewal"]),
                phrases: strings(&["What's the customer's pain point?", "Let's get this over the line."]),
                formatting: strings(&["Close every message with a concrete next step and owner."]),
            },
        );

        domains.insert(
            "finance".to_string(),
            DomainConfig {
                name: "finance".to_string(),
                label: "Finance".to_string(),
                verbosity_modifier: 0.0,
                formality_modifier: 0.6,
                skepticism: 0.7,
                data_emphasis: 0.9,
                vocabulary: strings(&["variance", "forecast", "EBITDA", "accrual", "cash flow", "margin", "audit trail", "reconciliation"]),
                phrases: strings(&["Does this reconcile?", "What's the impact on the forecast?"]),
                formatting: strings(&[
                    "Present figures in tables where possible.",
                    "Always state the period and currency of any number.",
                ]),
            },
        );

        let alias_table: [(&str, &str); 27] = [
            ("eng", "engineering"),
            ("engineer", "engineering"),
            ("software", "engineering"),
            ("dev", "engineering"),
            ("developer", "engineering"),
            ("tech", "engineering"),
            ("it", "engineering"),
            ("law", "legal"),
            ("lawyer", "legal"),
            ("attorney", "legal"),
            ("counsel", "legal"),
            ("compliance", "legal"),
            ("exec", "executive"),
            ("leadership", "executive"),
            ("c suite", "executive"),
            ("csuite", "executive"),
            ("management", "executive"),
            ("human resources", "hr"),
            ("people", "hr"),
            ("people ops", "hr"),
            ("talent", "hr"),
            ("biz dev", "sales"),
            ("business development", "sales"),
            ("account executive", "sales"),
            ("fin", "finance"),
            ("accounting", "finance"),
            ("treasury", "finance"),
        ];
        let aliases = alias_table
            .iter()
            .map(|(alias, target)| ((*alias).to_string(), (*target).to_string()))
            .collect();

        let fallback = domains
            .get(GENERAL_DOMAIN)
            .cloned()
            .unwrap_or_else(|| DomainConfig::neutral(GENERAL_DOMAIN, "General"));

        Self {
            domains,
            aliases,
            fallback,
        }
    }

    /// Build a lexicon from explicit tables.
    ///
    /// The table must contain `general`; aliases must point at known domains.
    pub fn new(
        domains: BTreeMap<String, DomainConfig>,
        aliases: BTreeMap<String, String>,
    ) -> PersonaResult<Self> {
        let mut normalized = BTreeMap::new();
        for (key, mut config) in domains {
            let key = normalize_key(&key);
            config.name = key.clone();
            config.validate()?;
            normalized.insert(key, config);
        }

        let fallback = normalized.get(GENERAL_DOMAIN).cloned().ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "domains".to_string(),
                value: format!("{:?}", normalized.keys().collect::<Vec<_>>()),
                reason: "a 'general' domain is required as fallback".to_string(),
            }
        })?;

        let mut alias_map = BTreeMap::new();
        for (alias, target) in aliases {
            let target = normalize_key(&target);
            if !normalized.contains_key(&target) {
                return Err(ConfigError::InvalidValue {
                    field: format!("aliases.{}", alias),
                    value: target,
                    reason: "alias points at an unknown domain".to_string(),
                }
                .into());
            }
            alias_map.insert(normalize_key(&alias), target);
        }

        Ok(Self {
            domains: normalized,
            aliases: alias_map,
            fallback,
        })
    }

    /// Parse a lexicon from TOML.
    ///
    /// ```toml
    /// [domains.general]
    /// label = "General"
    ///
    /// [domains.engineering]
    /// label = "Engineering"
    /// verbosity_modifier = -0.4
    ///
    /// [aliases]
    /// eng = "engineering"
    /// ```
    pub fn from_toml_str(source: &str) -> PersonaResult<Self> {
        let file: LexiconFile = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        Self::new(file.domains, file.aliases)
    }

    /// Canonical key for a domain name, or `None` when it is unknown.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        let key = normalize_key(name);
        if let Some((canonical, _)) = self.domains.get_key_value(&key) {
            return Some(canonical.as_str());
        }
        self.aliases.get(&key).map(|target| target.as_str())
    }

    /// Resolve a domain name, falling back to `general` for unknown names.
    pub fn resolve(&self, name: &str) -> &DomainConfig {
        match self.canonical_name(name).and_then(|key| self.domains.get(key)) {
            Some(config) => config,
            None => {
                tracing::warn!(domain = name, "Unknown domain, falling back to general");
                &self.fallback
            }
        }
    }

    /// The fallback domain.
    pub fn general(&self) -> &DomainConfig {
        &self.fallback
    }

    /// Canonical domain keys.
    pub fn domain_names(&self) -> Vec<&str> {
        self.domains.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for DomainLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// TESTS
// =============================================================================
