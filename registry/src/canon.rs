//! GitHub Repository Canonicalization
//!
//! Every accepted spelling of a repository reference collapses to one
//! identifier, which the registry uses as its deduplication key.
//!
//! ## Accepted Inputs
//!
//! - `https://github.com/owner/repo` (any scheme, `www.` host allowed)
//! - `https://github.com/owner/repo/commit/<sha>` (sub-paths are truncated)
//! - `github.com/owner/repo.git` (no scheme)
//! - `//github.com/owner/repo` (scheme-relative)
//! - `git@github.com:owner/repo.git` (SSH shorthand)
//!
//! Without canonicalization the same repository could be registered once per
//! spelling: `https://github.com/user/repo` vs `git@github.com:user/repo.git`.
//!
//! ## Usage
//!
//! ```rust
//! use repo_registry::canon::normalize;
//!
//! let repo = normalize("git@github.com:kkochis/adoptmyapp.git").unwrap();
//! assert_eq!(repo.to_string(), "https://github.com/kkochis/adoptmyapp");
//! assert_eq!(repo.storage_key(), "github.com/kkochis/adoptmyapp");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;
use url::Url;

const SSH_PREFIX: &str = "git@github.com:";
const CANONICAL_BASE: &str = "https://github.com/";
const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Why a raw reference could not be canonicalized.
///
/// All variants are caused by the caller's input and are never worth retrying.
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    #[error("{input} is not a valid URL: {source}")]
    MalformedInput {
        input: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0} does not appear to be a GitHub URL")]
    NotAGitHubReference(String),
    #[error("{0} must point to a repository")]
    NotARepository(String),
}

/// Canonical repository identifier: `https://github.com/<owner>/<repo>`
///
/// Owner and repo are non-empty, the path has exactly two segments and there
/// is never a `.git` suffix, query or fragment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalRepo {
    url: Url,
}

impl CanonicalRepo {
    pub fn owner(&self) -> &str {
        self.segment(0)
    }

    pub fn repo(&self) -> &str {
        self.segment(1)
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Key under which the repository is stored: the identifier without its
    /// scheme (`github.com/owner/repo`).
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.url.host_str().unwrap_or_default(), self.url.path())
    }

    /// GitHub REST endpoint describing this repository
    /// (`https://api.github.com/repos/owner/repo`).
    pub fn api_url(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}",
            self.owner(),
            self.repo()
        )
    }

    fn segment(&self, index: usize) -> &str {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.nth(index))
            .unwrap_or_default()
    }
}

impl fmt::Display for CanonicalRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for CanonicalRepo {
    type Err = CanonicalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Normalize a GitHub repository reference to canonical form
///
/// Examples:
/// - `github.com/user/repo` → `https://github.com/user/repo`
/// - `http://www.github.com/user/repo/branches` → `https://github.com/user/repo`
/// - `git@github.com:user/repo.git` → `https://github.com/user/repo`
pub fn normalize(raw: &str) -> Result<CanonicalRepo, CanonicalizeError> {
    let input = raw.trim();

    // 1. SSH shorthand never parses as a URL, handle it directly
    if let Some(rest) = input.strip_prefix(SSH_PREFIX) {
        let mut parts = rest.split('/');
        return match (parts.next(), parts.next()) {
            (Some(owner), Some(repo)) => assemble(input, owner, repo),
            _ => Err(CanonicalizeError::NotARepository(input.to_string())),
        };
    }

    // 2. Parse, tolerating a missing scheme in front of the GitHub host
    let parsed = parse_reference(input)?;

    // 3. Only GitHub hosts are accepted
    match parsed.host_str() {
        Some(host) if GITHUB_HOSTS.contains(&host) => {}
        _ => return Err(CanonicalizeError::NotAGitHubReference(input.to_string())),
    }

    // 4. Owner and repo are the first two path segments, the rest is dropped
    let mut segments = parsed.path_segments().into_iter().flatten();
    let owner = segments.next().unwrap_or_default();
    let repo = segments.next().unwrap_or_default();

    assemble(input, owner, repo)
}

fn parse_reference(input: &str) -> Result<Url, CanonicalizeError> {
    match Url::parse(input) {
        Ok(url) => Ok(url),
        // Scheme-relative: `//github.com/owner/repo` already names its host
        Err(url::ParseError::RelativeUrlWithoutBase) if input.starts_with("//") => {
            reparse(input, &format!("https:{}", input))
        }
        // No scheme: the host text sits at the start of the path
        Err(url::ParseError::RelativeUrlWithoutBase) if has_github_prefix(input) => {
            reparse(input, &format!("https://{}", input))
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Err(CanonicalizeError::NotAGitHubReference(input.to_string()))
        }
        Err(source) => Err(CanonicalizeError::MalformedInput {
            input: input.to_string(),
            source,
        }),
    }
}

fn reparse(input: &str, with_scheme: &str) -> Result<Url, CanonicalizeError> {
    Url::parse(with_scheme).map_err(|source| CanonicalizeError::MalformedInput {
        input: input.to_string(),
        source,
    })
}

fn has_github_prefix(input: &str) -> bool {
    GITHUB_HOSTS.iter().any(|host| {
        input
            .strip_prefix(host)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
    })
}

/// Build the identifier from owner and repo segments, both possibly still
/// carrying a `.git` suffix on the repo.
fn assemble(input: &str, owner: &str, repo: &str) -> Result<CanonicalRepo, CanonicalizeError> {
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if !is_name_segment(owner) || !is_name_segment(repo) {
        return Err(CanonicalizeError::NotARepository(input.to_string()));
    }

    let mut url = Url::parse(CANONICAL_BASE).map_err(|source| CanonicalizeError::MalformedInput {
        input: input.to_string(),
        source,
    })?;
    // set_path percent-encodes anything that would otherwise start a query or fragment
    url.set_path(&format!("/{}/{}", owner, repo));

    if url.path_segments().map_or(0, |segments| segments.count()) != 2 {
        return Err(CanonicalizeError::NotARepository(input.to_string()));
    }

    let canonical = CanonicalRepo { url };
    debug!("Normalized URL: {} → {}", input, canonical);

    Ok(canonical)
}

/// Non-empty, free of path separators (`\` is one for https), and not a
/// dot segment that the URL parser would collapse.
fn is_name_segment(segment: &str) -> bool {
    let decoded_dots = segment.to_ascii_lowercase().replace("%2e", ".");
    !segment.is_empty()
        && !segment.contains(['/', '\\'])
        && decoded_dots != "."
        && decoded_dots != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: &str = "https://github.com/kkochis/adoptmyapp";

    #[test]
    fn test_normalize_github_url() {
        let valids = [
            "https://github.com/kkochis/adoptmyapp",
            "http://github.com/kkochis/adoptmyapp",
            "https://github.com/kkochis/adoptmyapp/branches",
            "https://github.com/kkochis/adoptmyapp/commit/4cbeeab7a83b9e1a92faecf0c8b544a36e7c695a",
            "https://github.com/kkochis/adoptmyapp.git",
            "github.com/kkochis/adoptmyapp.git",
            "github.com/kkochis/adoptmyapp",
            "www.github.com/kkochis/adoptmyapp",
            "https://www.github.com/kkochis/adoptmyapp",
            // Even SSH links are valid
            "git@github.com:kkochis/adoptmyapp.git",
            "git@github.com:kkochis/adoptmyapp",
            // Scheme-relative
            "//github.com/kkochis/adoptmyapp",
            "//www.github.com/kkochis/adoptmyapp.git",
        ];

        for raw in valids {
            let repo = normalize(raw).unwrap_or_else(|e| panic!("{} failed: {}", raw, e));
            assert_eq!(repo.to_string(), EXPECTED, "input: {}", raw);
        }
    }

    #[test]
    fn test_reject_non_repositories() {
        let rejected = [
            "",
            "google.com",
            "adoptmyapp.com",
            "https://github.com/",
            "https://github.com/aodin",
            "https://github.com/aodin/",
            "git@github.com:aodin",
            "//gitlab.com/kkochis/adoptmyapp",
        ];

        for raw in rejected {
            assert!(normalize(raw).is_err(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn test_reject_non_github() {
        assert!(matches!(
            normalize("https://gitlab.com/user/repo"),
            Err(CanonicalizeError::NotAGitHubReference(_))
        ));
        assert!(matches!(
            normalize("https://bitbucket.org/user/repo"),
            Err(CanonicalizeError::NotAGitHubReference(_))
        ));
        assert!(matches!(
            normalize("github.community/user/repo"),
            Err(CanonicalizeError::NotAGitHubReference(_))
        ));
    }

    #[test]
    fn test_failure_kinds() {
        assert!(matches!(
            normalize("google.com"),
            Err(CanonicalizeError::NotAGitHubReference(_))
        ));
        assert!(matches!(
            normalize("https://github.com/aodin"),
            Err(CanonicalizeError::NotARepository(_))
        ));
        assert!(matches!(
            normalize("https://github.com/aodin/.git"),
            Err(CanonicalizeError::NotARepository(_))
        ));
        assert!(matches!(
            normalize("http://[github.com/user/repo"),
            Err(CanonicalizeError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_query_and_fragment_are_dropped() {
        let repo = normalize("https://github.com/user/repo?tab=readme#install").unwrap();
        assert_eq!(repo.to_string(), "https://github.com/user/repo");
        assert_eq!(repo.as_url().query(), None);
        assert_eq!(repo.as_url().fragment(), None);
    }

    #[test]
    fn test_backslash_in_name_is_not_a_repository() {
        // https treats `\\` as a separator, so these would grow a third segment
        for raw in [
            "git@github.com:a\\b/c",
            "git@github.com:a/b\\c",
            "ssh://git@github.com/a\\b/c",
        ] {
            assert!(
                matches!(normalize(raw), Err(CanonicalizeError::NotARepository(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_canonical_path_has_two_segments() {
        let inputs = [
            "git@github.com:kkochis/adoptmyapp.git",
            "git@github.com:some owner/odd#repo",
            "//github.com/kkochis/adoptmyapp/commit/4cbeeab",
            "https://github.com/kkochis/adoptmyapp/branches",
        ];

        for raw in inputs {
            let repo = normalize(raw).unwrap();
            assert_eq!(repo.as_url().path_segments().unwrap().count(), 2, "input: {}", raw);
            assert_eq!(repo.storage_key().matches('/').count(), 2, "input: {}", raw);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://github.com/kkochis/adoptmyapp/branches",
            "git@github.com:kkochis/adoptmyapp.git",
            "www.github.com/kkochis/adoptmyapp",
            "git@github.com:some owner/odd#repo",
            "https://github.com/user/repo%20name",
            "//github.com/kkochis/adoptmyapp",
        ];

        for raw in inputs {
            let once = normalize(raw).unwrap();
            let twice = normalize(&once.to_string()).unwrap();
            assert_eq!(once, twice, "input: {}", raw);
        }
    }

    #[test]
    fn test_ssh_special_characters_stay_in_path() {
        let repo = normalize("git@github.com:user/odd?name").unwrap();
        assert_eq!(repo.as_url().query(), None);
        assert_eq!(repo.repo(), "odd%3Fname");
    }

    #[test]
    fn test_accessors() {
        let repo: CanonicalRepo = "https://github.com/kkochis/adoptmyapp".parse().unwrap();
        assert_eq!(repo.owner(), "kkochis");
        assert_eq!(repo.repo(), "adoptmyapp");
        assert_eq!(repo.storage_key(), "github.com/kkochis/adoptmyapp");
    }

    #[test]
    fn test_api_url() {
        let repo = normalize("https://github.com/kkochis/adoptmyapp").unwrap();
        assert_eq!(
            repo.api_url(),
            "https://api.github.com/repos/kkochis/adoptmyapp"
        );
    }
}
