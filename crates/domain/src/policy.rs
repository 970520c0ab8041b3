//! Topic access policy documents and publisher inference.
//!
//! Policies are untyped JSON owned by the cloud provider. Only the parts
//! needed to infer publishers are modeled; everything else is ignored.

use std::fmt::{Display, Formatter};

use serde::Deserialize;
use serde_json::Value;

/// Action string that grants permission to publish to a topic.
pub const PUBLISH_ACTION: &str = "sns:Publish";

/// Reason recorded when the topic no longer exists or exposes no policy.
pub const POLICY_NOT_FOUND_REASON: &str = "Topic policy not found";

const ALLOW_EFFECT: &str = "Allow";
const PUBLISHER_SEPARATOR: &str = "; ";

/// A JSON field that is either a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Single value.
    One(T),
    /// List of values.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Returns the values as a slice, in document order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values.as_slice(),
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Principal of a policy statement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// Plain principal such as `*`.
    Text(String),
    /// Structured principal such as `{"AWS": "arn:aws:iam::123:root"}`.
    Structured(Value),
}

impl Display for Principal {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => formatter.write_str(value),
            Self::Structured(value) => write!(formatter, "{value}"),
        }
    }
}

/// One statement of a policy document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PolicyStatement {
    /// `Allow` or `Deny`.
    #[serde(rename = "Effect", default)]
    pub effect: Option<String>,
    /// Actions the statement applies to.
    #[serde(rename = "Action", default)]
    pub action: OneOrMany<String>,
    /// Who the statement applies to.
    #[serde(rename = "Principal", default)]
    pub principal: Option<Principal>,
}

impl PolicyStatement {
    /// Returns whether the statement allows publishing.
    #[must_use]
    pub fn allows_publish(&self) -> bool {
        self.effect.as_deref() == Some(ALLOW_EFFECT)
            && self
                .action
                .as_slice()
                .iter()
                .any(|action| action == PUBLISH_ACTION)
    }

    /// Returns the principal text, empty when the statement has none.
    #[must_use]
    pub fn principal_text(&self) -> String {
        self.principal
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Parsed topic policy document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PolicyDocument {
    /// Statements in document order.
    #[serde(rename = "Statement", default)]
    pub statements: OneOrMany<PolicyStatement>,
}

impl PolicyDocument {
    /// Parses the JSON text of a policy attribute.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns principals allowed to publish, in statement order.
    #[must_use]
    pub fn publishers(&self) -> Publishers {
        Publishers(
            self.statements
                .as_slice()
                .iter()
                .filter(|statement| statement.allows_publish())
                .map(PolicyStatement::principal_text)
                .collect(),
        )
    }
}

/// Outcome of inspecting one topic's access policy.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicPolicy {
    /// The policy was fetched and parsed.
    Document(PolicyDocument),
    /// The policy could not be fetched or parsed.
    Unavailable {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl TopicPolicy {
    /// Builds a policy from the raw attribute value.
    ///
    /// A missing attribute is an empty document. Malformed JSON becomes
    /// [`TopicPolicy::Unavailable`].
    #[must_use]
    pub fn from_attribute(attribute: Option<&str>) -> Self {
        match attribute {
            None => Self::Document(PolicyDocument::default()),
            Some(text) => match PolicyDocument::parse(text) {
                Ok(document) => Self::Document(document),
                Err(error) => Self::Unavailable {
                    reason: error.to_string(),
                },
            },
        }
    }

    /// Returns inferred publishers; unavailable policies have none.
    #[must_use]
    pub fn publishers(&self) -> Publishers {
        match self {
            Self::Document(document) => document.publishers(),
            Self::Unavailable { .. } => Publishers::default(),
        }
    }
}

/// Principals inferred as publishers of a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publishers(Vec<String>);

impl Publishers {
    /// Returns the principals in encounter order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        self.0.as_slice()
    }

    /// Returns the report column value: `; `-joined, empty when none.
    #[must_use]
    pub fn to_report_value(&self) -> String {
        self.0.join(PUBLISHER_SEPARATOR)
    }
}
