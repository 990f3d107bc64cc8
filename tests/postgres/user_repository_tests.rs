//! User persistence tests for [`PostgresUserRepository`].

use crate::postgres::helpers::{TestSchema, test_runtime, test_schema};
use rstest::rstest;
use todo_store::context::OperationContext;
use todo_store::error::ErrorKind;
use todo_store::user::{
    domain::{CreateUserCommand, PasswordHash, UserId, UserName, UserUpdateData},
    ports::{UserRepository, UserRepositoryError},
};

fn command(name: &str, password_hash: &str) -> CreateUserCommand {
    CreateUserCommand {
        name: UserName::new(name).expect("name"),
        password_hash: PasswordHash::new(password_hash).expect("hash"),
    }
}

#[rstest]
fn user_is_stored_and_found_by_id_and_name(test_schema: TestSchema) {
    let db = test_schema;
    let rt = test_runtime().expect("tokio runtime");
    let repo = db.user_repo();
    let ctx = OperationContext::background();

    let created = rt
        .block_on(repo.create(&ctx, command("ann123", "abcdef")))
        .expect("create");
    let by_id = rt
        .block_on(repo.get_by_id(&ctx, created.id()))
        .expect("get_by_id");
    let by_name = rt
        .block_on(repo.get_by_name(&ctx, created.name()))
        .expect("get_by_name");

    assert_eq!(by_id, created);
    assert_eq!(by_name, created);
    assert!(created.created_at().timestamp() > 0);
}

#[rstest]
fn duplicate_user_name_is_a_validation_error(test_schema: TestSchema) {
    let db = test_schema;
    let rt = test_runtime().expect("tokio runtime");
    let repo = db.user_repo();
    let ctx = OperationContext::background();
    rt.block_on(repo.create(&ctx, command("ann123", "abcdef")))
        .expect("first create");

    let err = rt
        .block_on(repo.create(&ctx, command("ann123", "123456")))
        .expect_err("duplicate name should fail");

    assert!(matches!(err, UserRepositoryError::DuplicateName(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(db.count_rows("users").expect("count"), 1);
}

#[rstest]
fn rename_onto_taken_name_is_rejected(test_schema: TestSchema) {
    let db = test_schema;
    let rt = test_runtime().expect("tokio runtime");
    let repo = db.user_repo();
    let ctx = OperationContext::background();
    rt.block_on(repo.create(&ctx, command("ann123", "abcdef")))
        .expect("create ann");
    let bob = rt
        .block_on(repo.create(&ctx, command("bob456", "abcdef")))
        .expect("create bob");

    let err = rt
        .block_on(repo.update_by_id(
            &ctx,
            bob.id(),
            UserUpdateData::new().with_name(UserName::new("ann123").expect("name")),
        ))
        .expect_err("rename should clash");

    assert!(matches!(err, UserRepositoryError::DuplicateName(_)));
    let reloaded = rt
        .block_on(repo.get_by_id(&ctx, bob.id()))
        .expect("get_by_id");
    assert_eq!(reloaded, bob);
}

#[rstest]
fn update_keeps_omitted_fields(test_schema: TestSchema) {
    let db = test_schema;
    let rt = test_runtime().expect("tokio runtime");
    let repo = db.user_repo();
    let ctx = OperationContext::background();
    let created = rt
        .block_on(repo.create(&ctx, command("ann123", "abcdef")))
        .expect("create");

    let updated = rt
        .block_on(repo.update_by_id(
            &ctx,
            created.id(),
            UserUpdateData::new().with_password_hash(PasswordHash::new("zyxwvu").expect("hash")),
        ))
        .expect("update");

    assert_eq!(updated.name(), created.name());
    assert_eq!(updated.password_hash().as_str(), "zyxwvu");
    assert_eq!(updated.created_at(), created.created_at());
}

#[rstest]
fn empty_update_writes_nothing(test_schema: TestSchema) {
    let db = test_schema;
    let rt = test_runtime().expect("tokio runtime");
    let repo = db.user_repo();
    let ctx = OperationContext::background();
    let created = rt
        .block_on(repo.create(&ctx, command("ann123", "abcdef")))
        .expect("create");
    db.execute(concat!(
        "CREATE FUNCTION reject_user_writes() RETURNS trigger AS $$ ",
        "BEGIN RAISE EXCEPTION 'users is read-only'; END $$ LANGUAGE plpgsql; ",
        "CREATE TRIGGER users_read_only BEFORE UPDATE ON users ",
        "FOR EACH ROW EXECUTE FUNCTION reject_user_writes();"
    ))
    .expect("install write guard");

    let unchanged = rt
        .block_on(repo.update_by_id(&ctx, created.id(), UserUpdateData::new()))
        .expect("empty update must not write");

    assert_eq!(unchanged, created);
}

#[rstest]
fn missing_user_is_not_found(test_schema: TestSchema) {
    let db = test_schema;
    let rt = test_runtime().expect("tokio runtime");
    let repo = db.user_repo();
    let ctx = OperationContext::background();
    let missing = UserId::from_raw(9_999);

    let by_id = rt.block_on(repo.get_by_id(&ctx, missing));
    let by_name = rt.block_on(repo.get_by_name(&ctx, &UserName::new("nobody").expect("name")));
    let update = rt.block_on(repo.update_by_id(&ctx, missing, UserUpdateData::new()));

    assert!(matches!(by_id, Err(UserRepositoryError::NotFound(id)) if id == missing));
    assert!(matches!(by_name, Err(UserRepositoryError::NotFoundByName(_))));
    assert!(matches!(update, Err(UserRepositoryError::NotFound(id)) if id == missing));
    rt.block_on(repo.delete_by_id(&ctx, missing))
        .expect("deleting a missing user succeeds");
}

#[rstest]
fn short_stored_name_is_a_data_integrity_error(test_schema: TestSchema) {
    let db = test_schema;
    let rt = test_runtime().expect("tokio runtime");
    let repo = db.user_repo();
    let ctx = OperationContext::background();
    let created = rt
        .block_on(repo.create(&ctx, command("ann123", "abcdef")))
        .expect("create");
    db.execute(&format!(
        "UPDATE users SET name = '  ab  ' WHERE id = {}",
        created.id()
    ))
    .expect("corrupt name");

    let err = rt
        .block_on(repo.get_by_id(&ctx, created.id()))
        .expect_err("trimmed name is too short");
    assert_eq!(err.kind(), ErrorKind::DataIntegrity);
}
