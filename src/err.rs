use thiserror::Error;

/// An error originating from the authorization core.
///
/// This is a closed set: every operation described by the grant graph engine, the auth row
/// gateway and the authorization-adjacent portion of the semantic validator returns either
/// success or exactly one of these variants. Some variants carry up to a handful of string
/// parameters identifying the offending name(s), mirroring the way the original implementation
/// attaches up to three string arguments to a raised error.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
	// ---- Resolution ----------------------------------------------------------------------
	#[error("invalid user '{0}'")]
	InvalidUser(String),
	#[error("user '{0}' is not a member of this database")]
	UserIsNotInDb(String),
	#[error("class '{0}' does not exist")]
	ClassDoesNotExist(String),
	#[error("'{0}' is not a class")]
	IsNotAClass(String),
	#[error("class '{0}' is missing")]
	MissingClass(String),

	// ---- Authorization ---------------------------------------------------------------------
	#[error("no SELECT privilege on '{0}'")]
	SelectFailure(String),
	#[error("no INSERT privilege on '{0}'")]
	InsertFailure(String),
	#[error("no UPDATE privilege on '{0}'")]
	UpdateFailure(String),
	#[error("no DELETE privilege on '{0}'")]
	DeleteFailure(String),
	#[error("no ALTER privilege on '{0}'")]
	AlterFailure(String),
	#[error("no INDEX privilege on '{0}'")]
	IndexFailure(String),
	#[error("no EXECUTE privilege on '{0}'")]
	ExecuteFailure(String),
	#[error("missing grant option for the requested privilege on '{0}'")]
	NoGrantOption(String),
	#[error("authorization failure on '{0}'")]
	AuthorizationFailure(String),
	#[error("only the DBA may perform this operation")]
	DbaOnly,
	#[error("'{0}' is not the owner of '{1}'")]
	NotOwner(String, String),
	#[error("access error on '{0}'")]
	AccessError(String),
	#[error("the authorization catalog is corrupted: {0}")]
	Corrupted(String),

	// ---- Grant/revoke semantics --------------------------------------------------------------
	#[error("cannot grant a privilege on an object to its own owner")]
	CantGrantOwner,
	#[error("cannot revoke a privilege from an object's owner")]
	CantRevokeOwner,
	#[error("cannot revoke a privilege from oneself")]
	CantRevokeSelf,
	#[error("no grant found for '{grantee}' on '{object}'")]
	GrantNotFound {
		grantee: String,
		object: String,
	},
	#[error("'{0}' is not a member of '{1}'")]
	MemberNotFound(String, String),
	#[error("adding '{0}' to '{1}' would create a membership cycle")]
	MemberCausesCycles(String, String),
	#[error("cannot add '{0}' as a member of '{1}'")]
	CantAddMember(String, String),
	#[error("cannot drop user '{0}'")]
	CantDropUser(String),
	#[error("user '{0}' still owns database objects")]
	UserHasDatabaseObjects(String),
	#[error("user '{0}' is currently logged in and cannot be dropped")]
	NotAllowToDropActiveUser(String),
	#[error("user name '{0}' exceeds the maximum configured length")]
	UserNameTooLong(String),
	#[error("comment exceeds the maximum configured length")]
	CommentOverflow,

	// ---- Semantic (validator) ----------------------------------------------------------------
	#[error("partition '{partition}' has a range that is not strictly increasing")]
	PartitionRangeError {
		partition: String,
	},
	#[error("duplicate value in LIST partition '{0}'")]
	PartitionListDuplicate(String),
	#[error("partition count exceeds the configured maximum")]
	InvalidPartitionSize,
	#[error("view '{0}' participates in a cyclic view reference")]
	CyclicReferenceViewSpec(String),
	#[error("assignment arity mismatch: left-hand side has a different arity than the right-hand side")]
	IllegalLhs,
	#[error("arms of the set operation are not union-compatible: {0}")]
	UnionIncompatible(String),
	#[error("ORDER BY position {0} is out of range of the select list")]
	SortSpecRangeErr(i64),
	#[error("invalid function index expression: {0}")]
	InvalidFunctionIndex(String),
	#[error("invalid filter index predicate: {0}")]
	InvalidFilterIndex(String),
	#[error("column count mismatch in view specification for '{0}'")]
	ViewColumnCountMismatch(String),
	#[error("view specification for '{0}' is not deterministic or contains a disallowed construct")]
	ViewSpecNotDeterministic(String),
	#[error("invalid partition expression: {0}")]
	InvalidPartitionExpr(String),
	#[error("'{0}' is not assignable to the target attribute's type")]
	NotAssignable(String),

	// ---- Supplemented (show-metadata) ---------------------------------------------------------
	#[error("argument mismatch for SHOW command '{0}'")]
	ShowArgumentMismatch(String),
	#[error("unknown SHOW command '{0}'")]
	UnknownShowCommand(String),

	// ---- Fatal -------------------------------------------------------------------------------
	#[error("generic error: {0}")]
	Generic(String),
	#[error("out of memory")]
	OutOfMemory,
	#[error("transaction was unilaterally aborted by the lock manager")]
	LkUnilaterallyAborted,
}

impl Error {
	/// Whether this error should abandon an in-progress savepoint rollback, because the
	/// surrounding transaction is already gone.
	///
	/// Per §7: "Mid-operation failures inside a partitioned GRANT/REVOKE trigger rollback to the
	/// operation-entry savepoint unless the failure is `LK_UNILATERALLY_ABORTED`."
	pub fn is_transaction_aborted(&self) -> bool {
		matches!(self, Error::LkUnilaterallyAborted)
	}
}
