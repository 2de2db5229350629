//! Diffing organization members against SCIM identities.
//!
//! A member counts as provisioned when any one of its verified emails, or
//! its login, is a SCIM username. Depending on the identity provider, SCIM
//! usernames carry either the corporate email or the GitHub handle. Members
//! without a verified email are reported separately and never diffed.

use crate::identity::{DirectoryMembers, MemberDirectory, OrgMember, ScimIdentities};
use serde::Serialize;

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    /// Members whose verified emails and login all lack a SCIM identity, in
    /// fetch order.
    pub missing_from_scim: MemberDirectory,
    /// Members without any verified email, passed through from the
    /// directory fetch.
    pub unverified_members: Vec<String>,
}

impl ReconciliationResult {
    /// `true` when every member with a verified email is provisioned.
    pub fn is_clean(&self) -> bool {
        self.missing_from_scim.is_empty()
    }
}

/// Compare the directory against the SCIM identity set.
///
/// Pure: reads both inputs, mutates neither, and returns the same result for
/// the same input values. Each test is a case-insensitive hash lookup.
pub fn reconcile(directory: &DirectoryMembers, scim: &ScimIdentities) -> ReconciliationResult {
    let missing_from_scim = directory
        .members()
        .iter()
        .filter(|member| !is_provisioned(member, scim))
        .cloned()
        .collect();

    ReconciliationResult {
        missing_from_scim,
        unverified_members: directory.unverified().to_vec(),
    }
}

fn is_provisioned(member: &OrgMember, scim: &ScimIdentities) -> bool {
    member
        .verified_emails
        .iter()
        .any(|email| scim.contains(email))
        || scim.contains(&member.login)
}
