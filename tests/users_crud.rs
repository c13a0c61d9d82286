mod common;

use common::{fields, four_users, nicknames, seed_users, three_users, user, users_db};
use reminder_db::{Column, CrudService, DbError, Fields, Filter, OrderBy, ReadQuery, Users};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case::single(vec![user("user1", "Иван", "Иванов")])]
#[case::several(three_users())]
#[tokio::test]
async fn create_returns_instance_and_flush_fills_generated_fields(#[case] rows: Vec<Fields>) {
    let db = users_db().await;
    let mut session = db.session();
    let mut users = CrudService::<Users>::new(&mut session);

    let mut created = Vec::new();
    for row in &rows {
        let c = users.create(row.clone()).unwrap();
        c.with(|u| {
            assert_eq!(u.nickname, row["nickname"]);
            assert_eq!(u.name, row["name"]);
            assert_eq!(u.surname, row["surname"]);
            assert!(u.id.is_none() && u.created_at.is_none());
        });
        created.push(c);
    }
    users.session().flush().await.unwrap();

    for (row, c) in rows.iter().zip(&created) {
        let u = c.get();
        assert!(u.id.is_some(), "id is written back by the flush");
        assert!(u.created_at.is_some(), "created_at is written back by the flush");
        assert_eq!(u.nickname, row["nickname"]);
        assert_eq!(u.name, row["name"]);
        assert_eq!(u.surname, row["surname"]);
    }

    let saved = users.read_all().await.unwrap();
    assert_eq!(saved.len(), rows.len());
    for (c, saved) in created.iter().zip(&saved) {
        assert_eq!(&c.get(), saved);
    }
    session.close().await;
}

#[tokio::test]
async fn duplicate_nickname_fails_at_flush_and_keeps_first_row() {
    let db = users_db().await;
    let mut session = db.session();
    let mut users = CrudService::<Users>::new(&mut session);

    users.create(user("user1", "Иван", "Иванов")).unwrap();
    users.session().flush().await.unwrap();
    assert_eq!(users.count(&[], false).await.unwrap(), 1);

    let duplicate = users.create(user("user1", "Иван", "Иванов")).unwrap();
    let err = users.session().flush().await.unwrap_err();
    assert!(err.is_integrity(), "{err}");
    assert!(duplicate.get().id.is_none(), "a failed flush writes nothing back");

    let saved = users.read_all().await.unwrap();
    assert_eq!(nicknames(&saved), ["user1"]);
    session.commit().await.unwrap();
    session.close().await;

    let mut session = db.session();
    assert_eq!(CrudService::<Users>::new(&mut session).count(&[], false).await.unwrap(), 1);
    session.close().await;
}

#[rstest]
#[case::empty_nickname(json!({"nickname": "", "name": "John", "surname": "Doe"}))]
#[case::null_nickname(json!({"nickname": null, "name": "John", "surname": "Doe"}))]
#[case::null_name(json!({"nickname": "test", "name": null, "surname": "Doe"}))]
#[case::empty_name(json!({"nickname": "test", "name": "", "surname": "Doe"}))]
#[case::empty_surname(json!({"nickname": "test", "name": "John", "surname": ""}))]
#[case::null_surname(json!({"nickname": "test", "name": "John", "surname": null}))]
#[case::no_fields(json!({}))]
#[tokio::test]
async fn invalid_user_data_fails_at_flush(#[case] row: serde_json::Value) {
    let db = users_db().await;
    let mut session = db.session();
    let mut users = CrudService::<Users>::new(&mut session);

    users.create(fields(row)).unwrap();
    let err = users.session().flush().await.unwrap_err();
    assert!(err.is_integrity(), "{err}");

    users.session().rollback().await.unwrap();
    assert_eq!(users.count(&[], false).await.unwrap(), 0);
    session.close().await;
}

#[rstest]
#[case::unknown_field(json!({"nickname": "a", "name": "b", "surname": "c", "age": 30}))]
#[case::wrong_type(json!({"nickname": 1, "name": "b", "surname": "c"}))]
#[tokio::test]
async fn create_rejects_fields_outside_the_schema(#[case] row: serde_json::Value) {
    let db = users_db().await;
    let mut session = db.session();
    let mut users = CrudService::<Users>::new(&mut session);

    let err = users.create(fields(row)).unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)), "{err}");
    assert_eq!(users.session().pending_count(), 0);
    session.close().await;
}

#[tokio::test]
async fn read_on_empty_table_returns_nothing() {
    let db = users_db().await;
    let mut session = db.session();
    let mut users = CrudService::<Users>::new(&mut session);
    assert!(users.read_all().await.unwrap().is_empty());
    session.close().await;
}

#[rstest]
#[case::nickname(three_users(), Users::NICKNAME.eq("user2"), 1)]
#[case::name(three_users(), Users::NAME.eq("Мария"), 1)]
#[case::surname(three_users(), Users::SURNAME.eq("Иванов"), 1)]
#[case::shared_name(
    vec![user("user1", "Иван", "Иванов"), user("user2", "Иван", "Петров"), user("user3", "Иван", "Петров")],
    Users::NAME.eq("Иван"),
    3
)]
#[case::no_match(three_users(), Users::NAME.eq("Empty"), 0)]
#[tokio::test]
async fn read_with_single_filter(#[case] rows: Vec<Fields>, #[case] filter: Filter<Users>, #[case] expected: usize) {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &rows).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let found = users.read(&ReadQuery::new().filter(filter.clone())).await.unwrap();
    assert_eq!(found.len(), expected);
    for u in &found {
        let actual = serde_json::to_value(u).unwrap();
        assert_eq!(&actual[filter.column()], filter.value());
    }
    session.close().await;
}

#[rstest]
#[case::nickname_and_name(three_users(), vec![Users::NICKNAME.eq("user2"), Users::NAME.eq("Алексей")], 1)]
#[case::no_match(three_users(), vec![Users::NAME.eq("Мария"), Users::SURNAME.eq("Empty")], 0)]
#[case::shared_name(
    vec![user("user1", "Алексей", "Иванов"), user("user2", "Алексей", "Петров"), user("user3", "Мария", "Сидорова")],
    vec![Users::NAME.eq("Алексей")],
    2
)]
#[tokio::test]
async fn read_with_multiple_filters(
    #[case] rows: Vec<Fields>,
    #[case] filters: Vec<Filter<Users>>,
    #[case] expected: usize,
) {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &rows).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let found = users.read(&ReadQuery::new().filters(filters.clone())).await.unwrap();
    assert_eq!(found.len(), expected);
    for u in &found {
        let actual = serde_json::to_value(u).unwrap();
        for f in &filters {
            assert_eq!(&actual[f.column()], f.value());
        }
    }
    session.close().await;
}

#[tokio::test]
async fn read_with_or_filters() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let q = ReadQuery::new()
        .filters([Users::NICKNAME.eq("user1"), Users::NAME.eq("Мария")])
        .use_or(true)
        .order_by(Users::NICKNAME);
    assert_eq!(nicknames(&users.read(&q).await.unwrap()), ["user1", "user3"]);
    assert_eq!(
        users
            .count(&[Users::NICKNAME.eq("user1"), Users::NAME.eq("Мария")], true)
            .await
            .unwrap(),
        2
    );
    session.close().await;
}

#[tokio::test]
async fn read_with_comparison_and_pattern_filters() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let q = ReadQuery::new().filter(Users::NICKNAME.like("user%")).filter(Users::ID.gt(1)).order_by(Users::ID);
    assert_eq!(nicknames(&users.read(&q).await.unwrap()), ["user2", "user3"]);

    let q = ReadQuery::new().filter(Users::NICKNAME.in_list(["user1", "user3"])).order_by(Users::NICKNAME);
    assert_eq!(nicknames(&users.read(&q).await.unwrap()), ["user1", "user3"]);

    let none: [&str; 0] = [];
    let q = ReadQuery::new().filter(Users::NICKNAME.in_list(none));
    assert!(users.read(&q).await.unwrap().is_empty());

    assert_eq!(users.count(&[Users::CREATED_AT.is_not_null()], false).await.unwrap(), 3);
    assert_eq!(users.count(&[Users::NAME.ne("Иван")], false).await.unwrap(), 2);
    session.close().await;
}

#[tokio::test]
async fn read_rejects_unknown_filter_column() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let age: Column<Users> = Column::new("age");
    let err = users.read(&ReadQuery::new().filter(age.eq(30))).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(ref m) if m.contains("age")), "{err}");

    let err = users.read(&ReadQuery::new().order_by(age.desc())).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)));
    session.close().await;
}

#[tokio::test]
async fn read_sorted_by_single_field() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(
        &mut session,
        &[user("B", "A", "C"), user("A", "C", "A"), user("C", "B", "B")],
    )
    .await
    .unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    for column in [Users::NICKNAME, Users::NAME, Users::SURNAME] {
        let asc = users.read(&ReadQuery::new().order_by(column)).await.unwrap();
        let desc = users.read(&ReadQuery::new().order_by(column.desc())).await.unwrap();
        let project = |v: &[Users]| -> Vec<String> {
            v.iter()
                .map(|u| serde_json::to_value(u).unwrap()[column.name()].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(project(&asc), ["A", "B", "C"], "{} asc", column.name());
        assert_eq!(project(&desc), ["C", "B", "A"], "{} desc", column.name());
    }
    session.close().await;
}

#[rstest]
#[case::nickname_name(vec![Users::NICKNAME, Users::NAME])]
#[case::nickname_name_surname(vec![Users::NICKNAME, Users::NAME, Users::SURNAME])]
#[case::id_surname_name(vec![Users::ID, Users::SURNAME, Users::NAME])]
#[case::name_surname(vec![Users::NAME, Users::SURNAME])]
#[tokio::test]
async fn read_sorted_by_multiple_fields(#[case] columns: Vec<Column<Users>>) {
    let db = users_db().await;
    let mut session = db.session();
    let rows = vec![
        fields(json!({"id": 2, "nickname": "B", "name": "A", "surname": "C"})),
        fields(json!({"id": 1, "nickname": "A", "name": "C", "surname": "A"})),
        fields(json!({"id": 3, "nickname": "C", "name": "B", "surname": "B"})),
        fields(json!({"id": 4, "nickname": "D", "name": "A", "surname": "B"})),
    ];
    seed_users(&mut session, &rows).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);
    let all = users.read_all().await.unwrap();

    for descending in [false, true] {
        let order: Vec<OrderBy<Users>> = columns
            .iter()
            .map(|c| if descending { c.desc() } else { c.asc() })
            .collect();
        let got = users.read(&ReadQuery::new().order_by_all(order)).await.unwrap();

        let key = |u: &Users| -> Vec<serde_json::Value> {
            let v = serde_json::to_value(u).unwrap();
            columns.iter().map(|c| v[c.name()].clone()).collect()
        };
        let mut expected = all.clone();
        expected.sort_by(|a, b| {
            let (ka, kb) = (key(a), key(b));
            let ord = ka
                .iter()
                .zip(&kb)
                .map(|(x, y)| match (x.as_i64(), y.as_i64()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => x.as_str().cmp(&y.as_str()),
                })
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        assert_eq!(
            got.iter().map(key).collect::<Vec<_>>(),
            expected.iter().map(key).collect::<Vec<_>>(),
            "descending={descending}"
        );
    }
    session.close().await;
}

#[tokio::test]
async fn read_with_limit() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &four_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);
    let all = users.read(&ReadQuery::new().order_by(Users::ID)).await.unwrap();

    for limit in 1..all.len() {
        let got = users
            .read(&ReadQuery::new().order_by(Users::ID).limit(limit as u64))
            .await
            .unwrap();
        assert_eq!(got, all[..limit]);
    }
    let got = users.read(&ReadQuery::new().limit(0)).await.unwrap();
    assert_eq!(got.len(), all.len(), "zero limit means no limit");
    session.close().await;
}

#[tokio::test]
async fn read_with_offset() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &four_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);
    let all = users.read(&ReadQuery::new().order_by(Users::ID)).await.unwrap();

    for offset in 0..=all.len() {
        let got = users
            .read(&ReadQuery::new().order_by(Users::ID).offset(offset as u64))
            .await
            .unwrap();
        assert_eq!(got, all[offset..]);
    }
    let got = users
        .read(&ReadQuery::new().order_by(Users::ID).limit(2).offset(1))
        .await
        .unwrap();
    assert_eq!(got, all[1..3]);
    session.close().await;
}

#[rstest]
#[case::single_match(Users::NICKNAME.eq("A"), Users::NAME, 1, vec!["A"])]
#[case::two_by_surname(Users::NAME.eq("A"), Users::SURNAME, 2, vec!["D", "B"])]
#[case::limit_above_count(Users::SURNAME.eq("B"), Users::NICKNAME, 10, vec!["C", "D"])]
#[case::no_match(Users::NICKNAME.eq("Z"), Users::NAME, 5, vec![])]
#[tokio::test]
async fn read_with_filter_order_and_limit(
    #[case] filter: Filter<Users>,
    #[case] order: Column<Users>,
    #[case] limit: u64,
    #[case] expected: Vec<&str>,
) {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &four_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let got = users
        .read(&ReadQuery::new().filter(filter).order_by(order).limit(limit))
        .await
        .unwrap();
    assert_eq!(nicknames(&got), expected);
    session.close().await;
}

#[tokio::test]
async fn update_changes_matching_rows() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let n = users
        .update(&[Users::NICKNAME.eq("user2")], &fields(json!({"name": "Пётр"})), false)
        .await
        .unwrap();
    assert_eq!(n, 1);
    let got = users.read(&ReadQuery::new().filter(Users::NICKNAME.eq("user2"))).await.unwrap();
    assert_eq!(got[0].name, "Пётр");

    let n = users
        .update(
            &[Users::NICKNAME.eq("user1"), Users::NICKNAME.eq("user3")],
            &fields(json!({"surname": "Общий"})),
            true,
        )
        .await
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(users.count(&[Users::SURNAME.eq("Общий")], false).await.unwrap(), 2);

    let n = users
        .update(&[Users::NICKNAME.eq("nobody")], &fields(json!({"name": "X"})), false)
        .await
        .unwrap();
    assert_eq!(n, 0);
    session.close().await;
}

#[tokio::test]
async fn update_rejects_empty_filters_and_empty_updates() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let err = users.update(&[], &fields(json!({"name": "X"})), false).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidValue(_)), "{err}");

    let err = users
        .update(&[Users::NICKNAME.eq("user1")], &Fields::new(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidValue(_)), "{err}");

    assert_eq!(users.count(&[Users::NAME.eq("X")], false).await.unwrap(), 0);
    session.close().await;
}

#[rstest]
#[case::unknown_update(json!({"age": 30}))]
#[case::primary_key(json!({"id": 10}))]
#[case::server_default(json!({"created_at": "2020-01-01 00:00:00"}))]
#[case::wrong_type(json!({"name": 5}))]
#[tokio::test]
async fn update_rejects_invalid_updates(#[case] updates: serde_json::Value) {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let err = users
        .update(&[Users::NICKNAME.eq("user1")], &fields(updates), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)), "{err}");
    session.close().await;
}

#[tokio::test]
async fn update_into_duplicate_nickname_is_an_integrity_error() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let err = users
        .update(&[Users::NICKNAME.eq("user2")], &fields(json!({"nickname": "user1"})), false)
        .await
        .unwrap_err();
    assert!(err.is_integrity(), "{err}");
    session.close().await;
}

#[tokio::test]
async fn delete_by_filters_and_everything() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    assert_eq!(users.delete(&[Users::NICKNAME.eq("user1")], false).await.unwrap(), 1);
    assert_eq!(users.delete(&[Users::NICKNAME.eq("user1")], false).await.unwrap(), 0);
    assert_eq!(
        users
            .delete(&[Users::NAME.eq("Алексей"), Users::NAME.eq("nobody")], false)
            .await
            .unwrap(),
        0
    );
    assert_eq!(users.count(&[], false).await.unwrap(), 2);

    assert_eq!(users.delete(&[], false).await.unwrap(), 2);
    assert_eq!(users.count(&[], false).await.unwrap(), 0);
    session.close().await;
}

#[tokio::test]
async fn delete_rejects_unknown_filter_column() {
    let db = users_db().await;
    let mut session = db.session();
    seed_users(&mut session, &three_users()).await.unwrap();
    let mut users = CrudService::<Users>::new(&mut session);

    let err = users.delete(&[Column::new("age").eq(1)], false).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)), "{err}");
    assert_eq!(users.count(&[], false).await.unwrap(), 3);
    session.close().await;
}
