//! Property tests for reconciliation.

use proptest::prelude::*;
use scim_audit::{DirectoryMembers, OrgMember, ReconciliationResult, ScimIdentities, reconcile};
use std::collections::BTreeSet;

fn login_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,7}"
}

fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}@(acme|corp)\\.com"
}

fn members_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(
        (login_strategy(), prop::collection::vec(email_strategy(), 0..3)),
        0..20,
    )
}

fn scim_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof![email_strategy(), login_strategy()], 0..20)
}

/// Distinct logins paired with their original and a shuffled order.
fn permuted_members_strategy()
-> impl Strategy<Value = (Vec<(String, Vec<String>)>, Vec<(String, Vec<String>)>)> {
    let emails = prop::collection::vec(email_strategy(), 0..3);
    prop::collection::hash_map(login_strategy(), emails, 0..20).prop_flat_map(|members| {
        let members: Vec<_> = members.into_iter().collect();
        (Just(members.clone()), Just(members).prop_shuffle())
    })
}

fn missing_pairs(result: &ReconciliationResult) -> BTreeSet<(String, Vec<String>)> {
    result
        .missing_from_scim
        .iter()
        .map(|member| (member.login.clone(), member.verified_emails.clone()))
        .collect()
}

fn build_directory(members: &[(String, Vec<String>)]) -> DirectoryMembers {
    members
        .iter()
        .map(|(login, emails)| OrgMember::new(login.clone(), emails))
        .collect()
}

proptest! {
    #[test]
    fn test_missing_and_unverified_partition_members(
        members in members_strategy(),
        usernames in scim_strategy(),
    ) {
        let directory = build_directory(&members);
        let scim = ScimIdentities::from_usernames(&usernames);
        let result = reconcile(&directory, &scim);

        for member in result.missing_from_scim.iter() {
            prop_assert!(directory.members().contains(&member.login));
            prop_assert!(member.has_verified_email());
            prop_assert!(!scim.contains(&member.login));
            prop_assert!(member.verified_emails.iter().all(|email| !scim.contains(email)));
        }
        for login in &result.unverified_members {
            prop_assert!(!result.missing_from_scim.contains(login));
        }
        prop_assert_eq!(&result.unverified_members[..], directory.unverified());
    }

    #[test]
    fn test_scim_order_does_not_matter(
        members in members_strategy(),
        usernames in scim_strategy(),
    ) {
        let directory = build_directory(&members);
        let mut reversed = usernames.clone();
        reversed.reverse();

        let forward = reconcile(&directory, &ScimIdentities::from_usernames(&usernames));
        let backward = reconcile(&directory, &ScimIdentities::from_usernames(&reversed));

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn test_member_order_does_not_matter(
        (members, shuffled) in permuted_members_strategy(),
        usernames in scim_strategy(),
    ) {
        let scim = ScimIdentities::from_usernames(&usernames);
        let directory = build_directory(&members);
        let shuffled_directory = build_directory(&shuffled);

        let original = reconcile(&directory, &scim);
        let permuted = reconcile(&shuffled_directory, &scim);

        prop_assert_eq!(missing_pairs(&original), missing_pairs(&permuted));
        prop_assert_eq!(&original.unverified_members[..], directory.unverified());
        prop_assert_eq!(&permuted.unverified_members[..], shuffled_directory.unverified());

        let original_unverified: BTreeSet<_> = original.unverified_members.iter().collect();
        let permuted_unverified: BTreeSet<_> = permuted.unverified_members.iter().collect();
        prop_assert_eq!(original_unverified, permuted_unverified);
    }

    #[test]
    fn test_scim_case_does_not_matter(
        members in members_strategy(),
        usernames in scim_strategy(),
    ) {
        let directory = build_directory(&members);
        let shouted: Vec<String> = usernames.iter().map(|name| name.to_uppercase()).collect();

        let lower = reconcile(&directory, &ScimIdentities::from_usernames(&usernames));
        let upper = reconcile(&directory, &ScimIdentities::from_usernames(&shouted));

        prop_assert_eq!(lower, upper);
    }

    #[test]
    fn test_reconcile_is_repeatable(
        members in members_strategy(),
        usernames in scim_strategy(),
    ) {
        let directory = build_directory(&members);
        let scim = ScimIdentities::from_usernames(&usernames);

        let first = reconcile(&directory, &scim);
        let second = reconcile(&directory, &scim);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_provisioning_every_email_leaves_nothing_missing(members in members_strategy()) {
        let directory = build_directory(&members);
        let every_email: Vec<String> = directory
            .members()
            .iter()
            .flat_map(|member| member.verified_emails.clone())
            .collect();

        let result = reconcile(&directory, &ScimIdentities::from_usernames(&every_email));
        prop_assert!(result.is_clean());
    }
}
