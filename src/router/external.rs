//! Routes into documentation hosted elsewhere.
//!
//! Each [`ExternalLink`] maps an FQSEN prefix to a URL template. `{FQSEN}`
//! in the template is replaced by the element name with the leading
//! backslash dropped and the remaining separators turned into `/`.

use super::{Rule, RuleSet, Subject};
use anyhow::{bail, Result};
use std::str::FromStr;

const PLACEHOLDER: &str = "{FQSEN}";

/// One prefix → URL template mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLink {
    prefix: String,
    template: String,
}

impl ExternalLink {
    pub fn new(prefix: &str, template: impl Into<String>) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            template: template.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn accepts(&self, fqsen: &str) -> bool {
        fqsen.starts_with(&self.prefix)
    }

    fn url(&self, fqsen: &str) -> String {
        let path = fqsen.trim_start_matches('\\').replace('\\', "/");
        self.template.replace(PLACEHOLDER, &path)
    }
}

/// Parses `PREFIX=URL`, as given on the command line.
impl FromStr for ExternalLink {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((prefix, template)) = s.split_once('=') else {
            bail!("invalid external link '{}': expected PREFIX=URL", s);
        };
        if prefix.trim().is_empty() || template.trim().is_empty() {
            bail!("invalid external link '{}': prefix and URL must be non-empty", s);
        }
        Ok(Self::new(prefix.trim(), template.trim()))
    }
}

/// `Symfony\` and `\Symfony` both become `\Symfony\`.
fn normalize_prefix(prefix: &str) -> String {
    let inner = prefix.trim_matches('\\');
    if inner.is_empty() {
        return "\\".to_string();
    }
    format!("\\{}\\", inner)
}

/// Router for elements documented by someone else.
#[derive(Debug, Clone, Default)]
pub struct ExternalRouter {
    links: Vec<ExternalLink>,
}

impl ExternalRouter {
    pub fn new(links: Vec<ExternalLink>) -> Self {
        Self { links }
    }
}

impl RuleSet for ExternalRouter {
    fn rules(&self) -> Vec<Rule> {
        let mut rules = vec![Rule::new(
            "url",
            |s| {
                s.as_reference()
                    .is_some_and(|r| r.starts_with("http://") || r.starts_with("https://"))
            },
            |s| s.as_reference().map(str::to_string),
        )];

        // Links are tried in the order they were configured.
        for link in &self.links {
            let matcher = link.clone();
            let generator = link.clone();
            rules.push(Rule::new(
                format!("external {}", link.prefix),
                move |s| subject_fqsen(s).is_some_and(|f| matcher.accepts(&f)),
                move |s| subject_fqsen(s).map(|f| generator.url(&f)),
            ));
        }
        rules
    }
}

/// FQSEN with a leading backslash, so `Foo\Bar` references match too.
fn subject_fqsen(subject: &Subject<'_>) -> Option<String> {
    let fqsen = subject.fqsen()?;
    if fqsen.contains("://") {
        return None;
    }
    if fqsen.starts_with('\\') {
        Some(fqsen.to_string())
    } else {
        Some(format!("\\{}", fqsen))
    }
}
