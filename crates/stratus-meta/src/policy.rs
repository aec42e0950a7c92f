//! Bucket policy model and the public-read evaluator.
//!
//! Policies follow the AWS IAM grammar subset: `Version` plus a list of
//! statements with `Effect`, `Principal`, `Action` and `Resource`.
//! `Principal` and `Action` may each be a single string or an array of
//! strings, so both are held as raw JSON values and interpreted lazily.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An S3 bucket policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketPolicy {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyStatement>,
}

/// One statement of a bucket policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// `Allow` or `Deny`.
    #[serde(rename = "Effect")]
    pub effect: String,
    /// `"*"` grants to everyone; other principal forms are ignored here.
    #[serde(rename = "Principal")]
    pub principal: Value,
    /// Action name or list of action names.
    #[serde(rename = "Action")]
    pub action: Value,
    /// Resource ARN or list; not matched by the evaluator.
    #[serde(rename = "Resource", default)]
    pub resource: Value,
}

impl BucketPolicy {
    /// Parse a policy document from its JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the bytes are not a
    /// valid policy document.
    pub fn parse(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Whether the policy grants anonymous object reads.
    ///
    /// True iff some statement allows `Principal="*"` an action set that
    /// includes `s3:GetObject` or `s3:*`. Any such grant on the bucket makes
    /// every object in it publicly readable; resources are not matched.
    #[must_use]
    pub fn is_public_read(&self) -> bool {
        self.statement.iter().any(|stmt| {
            stmt.effect == "Allow"
                && stmt.principal.as_str() == Some("*")
                && statement_actions(&stmt.action)
                    .any(|action| action == "s3:GetObject" || action == "s3:*")
        })
    }

    /// The canonical public-read policy for a bucket.
    #[must_use]
    pub fn public_read(bucket: &str) -> Self {
        Self {
            version: "2012-10-17".to_owned(),
            statement: vec![PolicyStatement {
                effect: "Allow".to_owned(),
                principal: Value::String("*".to_owned()),
                action: Value::String("s3:GetObject".to_owned()),
                resource: Value::String(format!("arn:aws:s3:::{bucket}/*")),
            }],
        }
    }
}

/// Iterate the actions of a statement, whether scalar or array.
fn statement_actions(action: &Value) -> impl Iterator<Item = &str> {
    let scalar = action.as_str().into_iter();
    let list = action
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    scalar.chain(list)
}
