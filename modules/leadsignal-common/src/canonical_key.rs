use std::fmt;
use std::str::FromStr;

/// The kind of a canonical key, in strict priority order. Earlier variants
/// outrank later ones when a source asset could be resolved more than one
/// way; the first four are "strong" (stable, globally unique identifiers),
/// the last three are "weak" (best-effort derivations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalKeyKind {
    Domain,
    CompaniesHouse,
    Crunchbase,
    Pitchbook,
    GithubOrg,
    GithubRepo,
    NameLoc,
}

impl CanonicalKeyKind {
    pub const STRONG: &'static [CanonicalKeyKind] = &[
        CanonicalKeyKind::Domain,
        CanonicalKeyKind::CompaniesHouse,
        CanonicalKeyKind::Crunchbase,
        CanonicalKeyKind::Pitchbook,
    ];

    pub fn is_strong(self) -> bool {
        Self::STRONG.contains(&self)
    }
}

impl fmt::Display for CanonicalKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CanonicalKeyKind::Domain => "domain",
            CanonicalKeyKind::CompaniesHouse => "companies_house",
            CanonicalKeyKind::Crunchbase => "crunchbase",
            CanonicalKeyKind::Pitchbook => "pitchbook",
            CanonicalKeyKind::GithubOrg => "github_org",
            CanonicalKeyKind::GithubRepo => "github_repo",
            CanonicalKeyKind::NameLoc => "name_loc",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CanonicalKeyKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(Self::Domain),
            "companies_house" => Ok(Self::CompaniesHouse),
            "crunchbase" => Ok(Self::Crunchbase),
            "pitchbook" => Ok(Self::Pitchbook),
            "github_org" => Ok(Self::GithubOrg),
            "github_repo" => Ok(Self::GithubRepo),
            "name_loc" => Ok(Self::NameLoc),
            other => Err(format!("unknown canonical key kind: {other}")),
        }
    }
}

/// A `<kind>:<normalized value>` string uniquely identifying a company
/// across sources. Deterministic given its inputs: building the same kind
/// from equivalent raw values always yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    kind: CanonicalKeyKind,
    value: String,
}

impl CanonicalKey {
    pub fn new(kind: CanonicalKeyKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    /// Build a `domain:` key from a raw homepage/website URL or bare host.
    /// Strips scheme, `www.`, port, path, and trailing slash.
    pub fn from_domain(raw: &str) -> Option<Self> {
        let domain = normalize_domain(raw)?;
        Some(Self::new(CanonicalKeyKind::Domain, domain))
    }

    pub fn from_github_repo(owner_slash_repo: &str) -> Option<Self> {
        let lower = owner_slash_repo.trim().to_lowercase();
        if lower.matches('/').count() != 1 || lower.starts_with('/') || lower.ends_with('/') {
            return None;
        }
        Some(Self::new(CanonicalKeyKind::GithubRepo, lower))
    }

    pub fn from_github_org(org: &str) -> Option<Self> {
        let lower = org.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        Some(Self::new(CanonicalKeyKind::GithubOrg, lower))
    }

    /// Build a `name_loc:` key from a free-text name and an optional
    /// location slug. The heuristic entity-resolution strategy produces
    /// this kind (see leadsignal-resolver).
    pub fn from_name_loc(name: &str, location: Option<&str>) -> Option<Self> {
        let name_slug = crate::slugify(name);
        if name_slug.len() < 2 {
            return None;
        }
        let value = match location.map(crate::slugify).filter(|s| !s.is_empty()) {
            Some(loc) => format!("{name_slug}@{loc}"),
            None => name_slug,
        };
        Some(Self::new(CanonicalKeyKind::NameLoc, value))
    }

    pub fn kind(&self) -> CanonicalKeyKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_strong(&self) -> bool {
        self.kind.is_strong()
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

impl FromStr for CanonicalKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind_str, value) = s
            .split_once(':')
            .ok_or_else(|| format!("canonical key missing ':' separator: {s}"))?;
        let kind = CanonicalKeyKind::from_str(kind_str)?;
        if value.is_empty() {
            return Err(format!("canonical key has empty value: {s}"));
        }
        Ok(Self { kind, value: value.to_string() })
    }
}

/// Returns `true` for keys of a strong kind (`domain`, `companies_house`,
/// `crunchbase`, `pitchbook`); `false` for weak kinds and unparseable keys.
pub fn is_strong_key(key: &str) -> bool {
    key.parse::<CanonicalKey>().map(|k| k.is_strong()).unwrap_or(false)
}

/// Normalize a raw homepage/website/domain value into a bare lowercase
/// registrable host: strip scheme, `www.`, userinfo, port, path, and
/// trailing slash. Returns `None` for empty or unparsable input.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let host = url::Url::parse(&with_scheme).ok().and_then(|u| u.host_str().map(str::to_string));

    let host = host.unwrap_or_else(|| {
        trimmed
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("")
            .to_string()
    });

    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let host = host.trim_end_matches('.');

    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_keys_normalize_scheme_www_and_trailing_slash() {
        let a = CanonicalKey::from_domain("https://www.acme.ai/").unwrap();
        let b = CanonicalKey::from_domain("acme.ai").unwrap();
        let c = CanonicalKey::from_domain("http://ACME.AI").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.to_string(), "domain:acme.ai");
    }

    #[test]
    fn domain_keys_strip_port_and_path() {
        let key = CanonicalKey::from_domain("https://acme.ai:8080/pricing?x=1").unwrap();
        assert_eq!(key.to_string(), "domain:acme.ai");
    }

    #[test]
    fn bare_hostname_without_dot_is_rejected() {
        assert!(CanonicalKey::from_domain("localhost").is_none());
        assert!(CanonicalKey::from_domain("").is_none());
    }

    #[test]
    fn github_repo_key_requires_single_slash() {
        assert_eq!(
            CanonicalKey::from_github_repo("Acme/App").unwrap().to_string(),
            "github_repo:acme/app"
        );
        assert!(CanonicalKey::from_github_repo("acme").is_none());
        assert!(CanonicalKey::from_github_repo("a/b/c").is_none());
    }

    #[test]
    fn name_loc_key_slugifies_and_rejects_too_short() {
        assert_eq!(
            CanonicalKey::from_name_loc("Acme Robotics, Inc.", None).unwrap().to_string(),
            "name_loc:acme-robotics-inc"
        );
        assert_eq!(
            CanonicalKey::from_name_loc("Acme", Some("Minneapolis")).unwrap().to_string(),
            "name_loc:acme@minneapolis"
        );
        assert!(CanonicalKey::from_name_loc("A", None).is_none());
    }

    #[test]
    fn round_trips_through_display_and_parse() {
        let key = CanonicalKey::new(CanonicalKeyKind::GithubOrg, "acme");
        let parsed: CanonicalKey = key.to_string().parse().unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn strong_vs_weak_kinds() {
        assert!(is_strong_key("domain:acme.ai"));
        assert!(is_strong_key("crunchbase:acme"));
        assert!(!is_strong_key("name_loc:acme"));
        assert!(!is_strong_key("github_repo:acme/app"));
        assert!(!is_strong_key("not-a-key"));
    }

    #[test]
    fn priority_order_matches_spec() {
        use CanonicalKeyKind::*;
        let ordered = [Domain, CompaniesHouse, Crunchbase, Pitchbook, GithubOrg, GithubRepo, NameLoc];
        let mut sorted = ordered.to_vec();
        sorted.sort();
        assert_eq!(ordered.to_vec(), sorted);
    }
}
