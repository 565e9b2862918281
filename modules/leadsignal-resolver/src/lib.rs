mod candidate;
mod config;
mod resolver;

pub use candidate::{ResolutionCandidate, ResolutionMethod};
pub use config::ResolverConfig;
pub use resolver::EntityResolver;

/// Skip set for `domain_match`: platform/PaaS hosts that are never a
/// company's own domain. Matched both exactly and by suffix (`*.github.io`).
pub const SKIP_DOMAINS: &[&str] = &[
    "github.io",
    "github.com",
    "gitlab.com",
    "gitlab.io",
    "bitbucket.org",
    "herokuapp.com",
    "netlify.app",
    "vercel.app",
    "pages.dev",
    "web.app",
    "firebaseapp.com",
];

pub(crate) fn should_skip_domain(domain: &str) -> bool {
    let domain = domain.to_lowercase();
    SKIP_DOMAINS
        .iter()
        .any(|skip| domain == *skip || domain.ends_with(&format!(".{skip}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_exact_and_suffix_matches() {
        assert!(should_skip_domain("github.io"));
        assert!(should_skip_domain("someuser.github.io"));
        assert!(should_skip_domain("myapp.herokuapp.com"));
        assert!(!should_skip_domain("acme.ai"));
    }
}
