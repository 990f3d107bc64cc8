//! User tests for [`InMemoryUserRepository`].

use crate::in_memory::helpers::{runtime, user_command, user_repo};
use mockable::DefaultClock;
use rstest::rstest;
use std::io;
use todo_store::context::OperationContext;
use todo_store::error::ErrorKind;
use todo_store::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{PasswordHash, UserDomainError, UserId, UserName, UserUpdateData},
    ports::{UserRepository, UserRepositoryError},
};
use tokio::runtime::Runtime;

type Repo = InMemoryUserRepository<DefaultClock>;

#[rstest]
fn valid_user_is_created_and_found_by_name(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let ctx = OperationContext::background();

    let created = rt
        .block_on(user_repo.create(&ctx, user_command("ann123", "abcdef")))
        .expect("create");
    let by_id = rt
        .block_on(user_repo.get_by_id(&ctx, created.id()))
        .expect("get_by_id");
    let by_name = rt
        .block_on(user_repo.get_by_name(&ctx, created.name()))
        .expect("get_by_name");

    assert_eq!(by_id, created);
    assert_eq!(by_name, created);
    assert_eq!(created.password_hash().as_str(), "abcdef");
    assert!(created.created_at().timestamp() > 0);
}

#[rstest]
fn short_user_name_fails_validation() {
    let err = UserName::new("ab").expect_err("two characters is too short");
    assert!(matches!(err, UserDomainError::NameTooShort { .. }));
    assert_eq!(UserRepositoryError::from(err).kind(), ErrorKind::Validation);
}

#[rstest]
fn duplicate_user_name_is_rejected(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let ctx = OperationContext::background();
    rt.block_on(user_repo.create(&ctx, user_command("ann123", "abcdef")))
        .expect("first create");

    let result = rt.block_on(user_repo.create(&ctx, user_command("ann123", "ghijkl")));

    let err = result.expect_err("duplicate name should fail");
    assert!(matches!(err, UserRepositoryError::DuplicateName(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[rstest]
fn unknown_name_is_not_found(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let name = UserName::new("nobody").expect("name");

    let result = rt.block_on(user_repo.get_by_name(&OperationContext::background(), &name));

    assert!(matches!(result, Err(UserRepositoryError::NotFoundByName(ref n)) if *n == name));
}

#[rstest]
fn update_overwrites_only_supplied_fields(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let ctx = OperationContext::background();
    let created = rt
        .block_on(user_repo.create(&ctx, user_command("ann123", "abcdef")))
        .expect("create");

    let renamed = rt
        .block_on(user_repo.update_by_id(
            &ctx,
            created.id(),
            UserUpdateData::new().with_name(UserName::new("annie").expect("name")),
        ))
        .expect("rename");
    assert_eq!(renamed.name().as_str(), "annie");
    assert_eq!(renamed.password_hash().as_str(), "abcdef");

    let rehashed = rt
        .block_on(user_repo.update_by_id(
            &ctx,
            created.id(),
            UserUpdateData::new().with_password_hash(PasswordHash::new("zyxwvu").expect("hash")),
        ))
        .expect("rehash");
    assert_eq!(rehashed.name().as_str(), "annie");
    assert_eq!(rehashed.password_hash().as_str(), "zyxwvu");
    assert_eq!(rehashed.created_at(), created.created_at());
}

#[rstest]
fn empty_update_returns_user_unchanged(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let ctx = OperationContext::background();
    let created = rt
        .block_on(user_repo.create(&ctx, user_command("ann123", "abcdef")))
        .expect("create");

    let unchanged = rt
        .block_on(user_repo.update_by_id(&ctx, created.id(), UserUpdateData::new()))
        .expect("empty update");

    assert_eq!(unchanged, created);
}

#[rstest]
fn empty_update_of_missing_user_is_not_found(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let missing = UserId::from_raw(405);

    let result = rt.block_on(user_repo.update_by_id(
        &OperationContext::background(),
        missing,
        UserUpdateData::new(),
    ));

    assert!(matches!(result, Err(UserRepositoryError::NotFound(id)) if id == missing));
}

#[rstest]
fn update_of_missing_user_is_not_found(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let missing = UserId::from_raw(404);

    let result = rt.block_on(user_repo.update_by_id(
        &OperationContext::background(),
        missing,
        UserUpdateData::new().with_name(UserName::new("ghost").expect("name")),
    ));

    assert!(matches!(result, Err(UserRepositoryError::NotFound(id)) if id == missing));
}

#[rstest]
fn delete_is_idempotent(runtime: io::Result<Runtime>, user_repo: Repo) {
    let rt = runtime.expect("runtime creation");
    let ctx = OperationContext::background();
    let created = rt
        .block_on(user_repo.create(&ctx, user_command("bob-the-user", "abcdef")))
        .expect("create");

    rt.block_on(user_repo.delete_by_id(&ctx, created.id()))
        .expect("first delete");
    rt.block_on(user_repo.delete_by_id(&ctx, created.id()))
        .expect("second delete");

    let err = rt
        .block_on(user_repo.get_by_id(&ctx, created.id()))
        .expect_err("deleted user should be gone");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
