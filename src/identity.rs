//! In-memory identity collections produced by the pagers.
//!
//! Both sides are normalized at ingestion: SCIM usernames and verified
//! emails are lower-cased so that reconciliation compares them
//! case-insensitively. Member logins keep their original case.

use crate::error::FetchError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};

/// Lower-cased SCIM usernames of one organization.
#[derive(Debug, Default)]
pub struct ScimIdentities {
    identities: HashSet<String>,
    incomplete: Option<FetchError>,
}

impl ScimIdentities {
    /// Build a complete identity set from raw usernames.
    pub fn from_usernames<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            identities: usernames
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
            incomplete: None,
        }
    }

    /// Add a username, normalizing its case.
    pub fn insert(&mut self, username: &str) -> bool {
        self.identities.insert(username.to_lowercase())
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, value: &str) -> bool {
        self.identities.contains(&value.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identities.iter().map(String::as_str)
    }

    /// Record why the listing stopped before its last page.
    pub fn mark_incomplete(&mut self, reason: FetchError) {
        self.incomplete = Some(reason);
    }

    /// `false` when pagination ended early and the set may be missing
    /// identities.
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_none()
    }

    pub fn incomplete_reason(&self) -> Option<&FetchError> {
        self.incomplete.as_ref()
    }
}

impl PartialEq for ScimIdentities {
    fn eq(&self, other: &Self) -> bool {
        self.identities == other.identities && self.is_complete() == other.is_complete()
    }
}

/// An organization member and its organization-verified emails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrgMember {
    pub login: String,
    pub verified_emails: Vec<String>,
}

impl OrgMember {
    /// Create a member, lower-casing its emails and keeping their order.
    pub fn new<I, S>(login: impl Into<String>, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            login: login.into(),
            verified_emails: emails
                .into_iter()
                .map(|email| email.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn has_verified_email(&self) -> bool {
        !self.verified_emails.is_empty()
    }
}

/// Members keyed by login, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDirectory {
    entries: Vec<OrgMember>,
    index: HashMap<String, usize>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. A login seen before keeps its position and has its
    /// emails replaced.
    pub fn insert(&mut self, member: OrgMember) {
        match self.index.get(&member.login) {
            Some(&position) => self.entries[position] = member,
            None => {
                self.index.insert(member.login.clone(), self.entries.len());
                self.entries.push(member);
            }
        }
    }

    pub fn get(&self, login: &str) -> Option<&[String]> {
        self.index
            .get(login)
            .map(|&position| self.entries[position].verified_emails.as_slice())
    }

    pub fn contains(&self, login: &str) -> bool {
        self.index.contains_key(login)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrgMember> {
        self.entries.iter()
    }

    pub fn logins(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|member| member.login.as_str())
    }
}

impl FromIterator<OrgMember> for MemberDirectory {
    fn from_iter<T: IntoIterator<Item = OrgMember>>(iter: T) -> Self {
        let mut directory = Self::new();
        for member in iter {
            directory.insert(member);
        }
        directory
    }
}

impl<'a> IntoIterator for &'a MemberDirectory {
    type Item = &'a OrgMember;
    type IntoIter = std::slice::Iter<'a, OrgMember>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Serialized as a JSON object `{login: [emails]}` in insertion order.
impl Serialize for MemberDirectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for member in &self.entries {
            map.serialize_entry(&member.login, &member.verified_emails)?;
        }
        map.end()
    }
}

/// Everything the directory query returned, split by email status.
///
/// A login lives in exactly one of `members` (at least one verified email)
/// or `unverified` (none).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryMembers {
    members: MemberDirectory,
    unverified: Vec<String>,
    unverified_index: HashSet<String>,
}

impl DirectoryMembers {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a member under `members` or `unverified`.
    pub fn push(&mut self, member: OrgMember) {
        if member.has_verified_email() {
            if self.unverified_index.remove(&member.login) {
                self.unverified.retain(|login| *login != member.login);
            }
            self.members.insert(member);
        } else if !self.members.contains(&member.login)
            && self.unverified_index.insert(member.login.clone())
        {
            self.unverified.push(member.login);
        }
    }

    /// Members with at least one verified email.
    pub fn members(&self) -> &MemberDirectory {
        &self.members
    }

    /// Logins without any verified email, in fetch order.
    pub fn unverified(&self) -> &[String] {
        &self.unverified
    }

    /// Total number of distinct members seen.
    pub fn total(&self) -> usize {
        self.members.len() + self.unverified.len()
    }

    pub fn into_parts(self) -> (MemberDirectory, Vec<String>) {
        (self.members, self.unverified)
    }
}

impl FromIterator<OrgMember> for DirectoryMembers {
    fn from_iter<T: IntoIterator<Item = OrgMember>>(iter: T) -> Self {
        let mut directory = Self::new();
        for member in iter {
            directory.push(member);
        }
        directory
    }
}
