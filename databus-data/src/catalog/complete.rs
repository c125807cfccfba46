//! Suggest the next level of a partially typed Databus identifier.
//!
//! Identifiers follow `https://{host}/{account}/{group}/{artifact}/{version}/{file}`.
//! The number of segments typed so far selects what is listed next.

use log::debug;

use super::endpoint::SparqlEndpoint;
use super::query::{load_accounts, load_artifacts, load_files, load_groups, load_versions};

const MAX_PARTS: usize = 6;

/// What a partial identifier asks to be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionLevel {
    /// Only the host was typed.
    Accounts,
    /// An account was typed.
    Groups,
    /// A group was typed.
    Artifacts,
    /// An artifact was typed.
    Versions,
    /// A version was typed.
    Files,
    /// Nothing further can be suggested.
    Complete,
}

/// A partial identifier split into what the catalog needs.
///
/// # Examples
/// ```
/// use databus_data::catalog::{CompletionLevel, PartialIdentifier};
///
/// let partial = PartialIdentifier::parse("https://databus.example.org/alice/");
/// assert_eq!(partial.endpoint(), "https://databus.example.org/sparql");
/// assert_eq!(partial.level(), CompletionLevel::Groups);
/// assert_eq!(partial.prefix(), "https://databus.example.org/alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialIdentifier {
    input: String,
    endpoint: String,
    prefix: String,
    level: CompletionLevel,
}

impl PartialIdentifier {
    /// Split `input` into endpoint, prefix and level.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let stripped = input.replace("https://", "");
        let trimmed = stripped.trim_end_matches(['/', ' ']);
        let parts: Vec<&str> = trimmed.rsplitn(MAX_PARTS, '/').collect();
        let host = parts.last().copied().unwrap_or_default();
        let level = match parts.len() {
            1 => CompletionLevel::Accounts,
            2 => CompletionLevel::Groups,
            3 => CompletionLevel::Artifacts,
            4 => CompletionLevel::Versions,
            5 => CompletionLevel::Files,
            _ => CompletionLevel::Complete,
        };
        let prefix = input
            .rsplit_once('/')
            .map_or(input, |(head, _)| head)
            .to_owned();
        Self {
            input: input.to_owned(),
            endpoint: format!("https://{host}/sparql"),
            prefix,
            level,
        }
    }

    /// The identifier as typed.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// SPARQL endpoint of the Databus the identifier points at.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Input up to its last `/`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// What will be listed.
    #[must_use]
    pub const fn level(&self) -> CompletionLevel {
        self.level
    }
}

/// Suggestions for the next identifier level.
///
/// Any lookup failure, or an identifier that is already complete, yields the
/// input itself as the only suggestion.
pub async fn complete_identifier<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    partial: &PartialIdentifier,
) -> Vec<String> {
    let prefix = partial.prefix();
    let found = match partial.level() {
        CompletionLevel::Accounts => load_accounts(endpoint).await,
        CompletionLevel::Groups => load_groups(endpoint, &format!("{prefix}#this")).await,
        CompletionLevel::Artifacts => load_artifacts(endpoint, prefix).await,
        CompletionLevel::Versions => load_versions(endpoint, prefix).await,
        CompletionLevel::Files => load_files(endpoint, prefix).await,
        CompletionLevel::Complete => return vec![partial.input().to_owned()],
    };
    match found {
        Ok(suggestions) => suggestions,
        Err(err) => {
            debug!("completion lookup for {} failed: {err}", partial.input());
            vec![partial.input().to_owned()]
        }
    }
}
