use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    DomainMatch,
    OrgMatch,
    NameSimilarity,
    Heuristic,
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionMethod::DomainMatch => "domain_match",
            ResolutionMethod::OrgMatch => "org_match",
            ResolutionMethod::NameSimilarity => "name_similarity",
            ResolutionMethod::Heuristic => "heuristic",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ResolutionMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain_match" => Ok(Self::DomainMatch),
            "org_match" => Ok(Self::OrgMatch),
            "name_similarity" => Ok(Self::NameSimilarity),
            "heuristic" => Ok(Self::Heuristic),
            other => Err(format!("unknown resolution method: {other}")),
        }
    }
}

/// A candidate resolution for an asset, produced by one strategy.
#[derive(Debug, Clone)]
pub struct ResolutionCandidate {
    pub lead_canonical_key: String,
    pub confidence: f64,
    pub method: ResolutionMethod,
    pub reason: String,
    pub metadata: Map<String, Json>,
}
