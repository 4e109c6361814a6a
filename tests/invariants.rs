//! Invariants (A)-(F) and the round-trip/idempotence properties of spec §8.

use authgraph_core::cnf::MAX_USER_NAME_LENGTH;
use authgraph_core::engine::AuthorizationCore;
use authgraph_core::err::Error;
use authgraph_core::iam::{ObjectRef, PrivilegeKind};

async fn setup() -> (AuthorizationCore, ObjectRef) {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "O").unwrap();
	core.create_user(&dba, "A").unwrap();
	let object = ObjectRef::class("T");
	core.register_owned_object("O", object.clone()).await.unwrap();
	(core, object)
}

/// (A) Every grant entry's grantor is non-null, and the object it names still resolves.
#[tokio::test]
async fn invariant_a_grantor_is_never_null_and_object_resolves() {
	let (core, object) = setup().await;
	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();

	let a_obj = core.directory.authorization_object("A").unwrap();
	let entry = a_obj.find(&object, "O").unwrap();
	assert!(!entry.grantor.is_empty());
	assert!(core.directory.object_owner(&entry.object).is_ok());
}

/// (B) No two grant entries in the same authorization object share an `(object, grantor)` key.
#[tokio::test]
async fn invariant_b_no_duplicate_object_grantor_keys() {
	let (core, object) = setup().await;
	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();
	// Granting again from the same grantor must update the existing entry, not add a second one.
	core.grant(&o, "A", &object, &[], PrivilegeKind::Insert.bit(), false).await.unwrap();

	let a_obj = core.directory.authorization_object("A").unwrap();
	let mut seen = std::collections::HashSet::new();
	for g in &a_obj.grants {
		assert!(seen.insert((g.object.clone(), g.grantor.clone())), "duplicate (object, grantor) key");
	}
}

/// (C) Every privilege bit held traces back to a grant-option-carrying chain from the owner.
/// Exercised indirectly: A cannot grant a bit it was given without the grant option.
#[tokio::test]
async fn invariant_c_privilege_requires_an_unbroken_grant_option_chain() {
	let (core, object) = setup().await;
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "B").unwrap();
	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();

	let a = core.login("A").unwrap();
	let err = core.grant(&a, "B", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap_err();
	assert!(matches!(err, Error::NoGrantOption(_)));
}

/// (D) Flattened groups equal the transitive closure of direct-groups, with no cycles.
#[tokio::test]
async fn invariant_d_flattened_groups_are_the_transitive_closure() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "G1").unwrap();
	core.create_user(&dba, "G2").unwrap();
	core.create_user(&dba, "M").unwrap();
	core.add_member("G2", "G1").unwrap();
	core.add_member("G1", "M").unwrap();

	let m = core.directory.find_principal("M").unwrap();
	assert!(m.direct_groups.contains("G1"));
	assert!(m.groups.contains("G1"));
	assert!(m.groups.contains("G2"));
	assert!(m.groups.contains("PUBLIC"));

	// A cycle is rejected outright.
	let err = core.add_member("M", "G2").unwrap_err();
	assert!(matches!(err, Error::MemberCausesCycles(_, _)));
}

/// (E) `GRANT` followed by `REVOKE` of the same privilege leaves no more than before.
#[tokio::test]
async fn invariant_e_grant_then_revoke_is_a_no_op_on_privileges() {
	let (core, object) = setup().await;
	let o = core.login("O").unwrap();
	let before = core.cache.resolve(&core.directory, "A", &object);

	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();
	core.revoke(&o, "A", &object, &[], PrivilegeKind::Select.bit()).await.unwrap();

	let after = core.cache.resolve(&core.directory, "A", &object);
	assert_eq!(before.granted() & PrivilegeKind::Select.bit(), after.granted() & PrivilegeKind::Select.bit());
	assert!(!after.has(PrivilegeKind::Select));
}

/// (F) After `DROP USER`, no trace of the dropped principal remains anywhere.
#[tokio::test]
async fn invariant_f_drop_user_leaves_no_trace() {
	let (core, object) = setup().await;
	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();

	core.drop_user(&o, "A", || false).await.unwrap();

	assert!(core.directory.find_principal("A").is_err());
	let o_principal = core.directory.find_principal("O").unwrap();
	assert!(!o_principal.direct_groups.contains("A"));
	assert!(!o_principal.groups.contains("A"));
	// The cache no longer resolves to anything meaningful for the dropped principal's old index;
	// re-querying recomputes from a directory that doesn't know the name at all.
	assert!(core.directory.cache_index_of("A").is_err());
	assert!(core.gateway.rows_for_grantee("A").await.unwrap().is_empty());
}

/// Round-trip: granting the same privilege twice with identical grant-option is a no-op.
#[tokio::test]
async fn roundtrip_granting_twice_identically_is_a_no_op() {
	let (core, object) = setup().await;
	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), true).await.unwrap();
	let once = core.cache.resolve(&core.directory, "A", &object);
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), true).await.unwrap();
	let twice = core.cache.resolve(&core.directory, "A", &object);
	assert_eq!(once, twice);

	let a_obj = core.directory.authorization_object("A").unwrap();
	assert_eq!(a_obj.grants.iter().filter(|g| g.object == object && g.grantor == "O").count(), 1);
}

/// Round-trip: revoking a privilege a principal does not hold returns `GRANT_NOT_FOUND` without
/// side effects.
#[tokio::test]
async fn roundtrip_revoking_unheld_privilege_is_grant_not_found() {
	let (core, object) = setup().await;
	let o = core.login("O").unwrap();
	let err = core.revoke(&o, "A", &object, &[], PrivilegeKind::Select.bit()).await.unwrap_err();
	assert!(matches!(err, Error::GrantNotFound { .. }));

	let a_obj = core.directory.authorization_object("A").unwrap();
	assert!(a_obj.grants.is_empty());
}

/// Round-trip: `drop_member(g, drop_member(g, add_member(g, m)))` leaves no trace of `m` in `g`.
#[tokio::test]
async fn roundtrip_add_then_drop_member_leaves_no_trace() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "G").unwrap();
	core.create_user(&dba, "M").unwrap();

	core.add_member("G", "M").unwrap();
	core.drop_member("G", "M").unwrap();

	let m = core.directory.find_principal("M").unwrap();
	assert!(!m.direct_groups.contains("G"));
	assert!(!m.groups.contains("G"));

	// Dropping it again fails: there is no trace left to drop.
	let err = core.drop_member("G", "M").unwrap_err();
	assert!(matches!(err, Error::MemberNotFound(_, _)));
}

/// Boundary: a user name exactly at the configured maximum length is accepted; one more is
/// `USER_NAME_TOO_LONG`.
#[tokio::test]
async fn boundary_user_name_length() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();

	let at_max: String = "A".repeat(*MAX_USER_NAME_LENGTH);
	core.create_user(&dba, &at_max).unwrap();

	let one_more: String = "A".repeat(*MAX_USER_NAME_LENGTH + 1);
	let err = core.create_user(&dba, &one_more).unwrap_err();
	assert!(matches!(err, Error::UserNameTooLong(_)));
}
