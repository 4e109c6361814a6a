//! `AuthorizationCore::check` (spec §4.5 "Privilege resolution", §4.6) and the `Validator` façade
//! wired onto `AuthorizationCore`.

use authgraph_core::dbs::{Options, Session};
use authgraph_core::engine::AuthorizationCore;
use authgraph_core::err::Error;
use authgraph_core::iam::{ObjectKind, ObjectRef, PrivilegeKind};

#[tokio::test]
async fn check_fails_without_privilege_and_succeeds_after_grant() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "O").unwrap();
	core.create_user(&dba, "A").unwrap();
	let object = ObjectRef::class("T");
	core.register_owned_object("O", object.clone()).await.unwrap();

	let a_session = core.login("A").unwrap();
	let opts = Options::new();

	let err = core.check(&a_session, &opts, &object, PrivilegeKind::Select.bit()).unwrap_err();
	assert!(matches!(err, Error::SelectFailure(_)));

	let o = core.login("O").unwrap();
	core.grant(&o, "A", &object, &[], PrivilegeKind::Select.bit(), false).await.unwrap();
	core.check(&a_session, &opts, &object, PrivilegeKind::Select.bit()).unwrap();
}

/// `perms = false` bypasses every privilege check, mirroring import/bulk-load paths.
#[tokio::test]
async fn check_is_bypassed_when_perms_is_disabled() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "A").unwrap();
	let object = ObjectRef::class("T");
	core.register_owned_object("DBA", object.clone()).await.unwrap();

	let a_session = core.login("A").unwrap();
	let opts = Options::new().new_with_perms(false);
	core.check(&a_session, &opts, &object, PrivilegeKind::Select.bit()).unwrap();
}

/// `Validator::check_ownership`, reached through `AuthorizationCore::validator`.
#[tokio::test]
async fn validator_ownership_check_rejects_non_owner() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "OWNER").unwrap();
	core.create_user(&dba, "OTHER").unwrap();
	let object = ObjectRef::class("T");
	core.register_owned_object("OWNER", object.clone()).await.unwrap();

	let owner = core.directory.find_principal("OWNER").unwrap();
	let other = core.directory.find_principal("OTHER").unwrap();
	assert!(core.validator.check_ownership(&owner, &object).is_ok());
	assert!(core.validator.check_ownership(&other, &object).is_err());
}

/// `Validator::validate_grant_statement` rejects privilege kinds that don't admit on the object's
/// kind (spec §4.5 "GRANT/REVOKE validation").
#[tokio::test]
async fn validator_rejects_execute_on_a_class() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "A").unwrap();
	let object = ObjectRef::class("T");

	let err = core.validator.validate_grant_statement(&["A".to_string()], &object, PrivilegeKind::Execute.bit()).unwrap_err();
	assert!(matches!(err, Error::AuthorizationFailure(_)));

	let proc = ObjectRef::procedure("P");
	assert_eq!(proc.kind, ObjectKind::Procedure);
	core.validator.validate_grant_statement(&["A".to_string()], &proc, PrivilegeKind::Execute.bit()).unwrap();
}

/// `set_comment` (spec §4.2): only the principal itself or an administrative member may set it.
#[tokio::test]
async fn set_comment_is_restricted_to_self_or_admin() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "A").unwrap();
	core.create_user(&dba, "B").unwrap();

	let a_session = core.login("A").unwrap();
	core.set_comment(&a_session, "A", "hello").unwrap();

	let b_session = core.login("B").unwrap();
	let err = core.set_comment(&b_session, "A", "hijacked").unwrap_err();
	assert!(matches!(err, Error::DbaOnly));

	core.set_comment(&dba, "A", "set by admin").unwrap();
}

/// `transfer_ownership` invalidates the privilege cache for the transferred object.
#[tokio::test]
async fn transfer_ownership_invalidates_the_cache() {
	let core = AuthorizationCore::new().await.unwrap();
	let dba = core.login("DBA").unwrap();
	core.create_user(&dba, "OLD").unwrap();
	core.create_user(&dba, "NEW").unwrap();
	let object = ObjectRef::class("T");
	core.register_owned_object("OLD", object.clone()).await.unwrap();

	// Populate the cache before transferring.
	let _ = core.cache.resolve(&core.directory, "OLD", &object);

	core.transfer_ownership(&object, "NEW").unwrap();
	assert_eq!(core.directory.object_owner(&object).unwrap(), "NEW");
}
