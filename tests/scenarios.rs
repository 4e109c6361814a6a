//! End-to-end scenarios, literal from spec §8 "Scenarios".

use authgraph_core::engine::AuthorizationCore;
use authgraph_core::err::Error;
use authgraph_core::iam::{ObjectRef, PrivilegeKind};

async fn core_with_owner(owner: &str) -> (AuthorizationCore, ObjectRef) {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, owner).unwrap();
	let object = ObjectRef::class("T");
	core.register_owned_object(owner, object.clone()).await.unwrap();
	(core, object)
}

/// Scenario 1: grant-option chain followed by a revoke at the root cascades through the whole
/// chain, and every grant entry it touches vanishes.
#[tokio::test]
async fn scenario_1_revoke_cascades_through_grant_option_chain() {
	let (core, object) = core_with_owner("O").await;
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "A").unwrap();
	core.create_user(&dba, "B").unwrap();

	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), true).await.unwrap();

	let a = core.login("A").unwrap();
	core.grant(&a, "B", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();

	core.revoke(&o, "A", &object, &[], PrivilegeKind::Select.bit()).await.unwrap();

	let a_bits = core.cache.resolve(&core.directory, "A", &object);
	let b_bits = core.cache.resolve(&core.directory, "B", &object);
	assert!(!a_bits.has(PrivilegeKind::Select));
	assert!(!b_bits.has(PrivilegeKind::Select));

	let a_obj = core.directory.authorization_object("A").unwrap();
	let b_obj = core.directory.authorization_object("B").unwrap();
	assert!(a_obj.grants.iter().all(|g| g.object != object));
	assert!(b_obj.grants.iter().all(|g| g.object != object));
}

/// Scenario 2: re-granting without the grant option leaves the grantee unable to grant onward.
#[tokio::test]
async fn scenario_2_grant_without_option_blocks_onward_grant() {
	let (core, object) = core_with_owner("O").await;
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "A").unwrap();
	core.create_user(&dba, "B").unwrap();

	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();

	let a = core.login("A").unwrap();
	let err = core.grant(&a, "B", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap_err();
	assert!(matches!(err, Error::NoGrantOption(_)));
}

/// Scenario 3: a logged-in user cannot be dropped until the session logs out.
#[tokio::test]
async fn scenario_3_cannot_drop_active_user_until_logout() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	let u = core.create_user(&dba, "U").unwrap();
	assert!(u.direct_groups.contains("PUBLIC"));
	assert!(u.groups.contains("PUBLIC"));

	let u_session = core.login("U").unwrap();
	let err = core.drop_user(&dba, "U", || false).await.unwrap_err();
	assert!(matches!(err, Error::NotAllowToDropActiveUser(_)));

	core.logout(&u_session);
	core.drop_user(&dba, "U", || false).await.unwrap();
	assert!(core.directory.find_principal("U").is_err());
}
