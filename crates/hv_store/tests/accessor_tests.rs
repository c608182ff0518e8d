//! Integration tests for the encrypted accessor against in-memory SQLite.

use hv_crypto::{hash_index, DataKey, KdfParams, Password};
use hv_model::{EntityId, Group, Member, Message};
use hv_store::{entity, tables, Bind, EncryptedAccessor, Filter, GroupEntity, Store, StoreError};

async fn open_store() -> Store {
    Store::open_in_memory().await.expect("open in-memory store")
}

fn member_accessor(key: &DataKey) -> EncryptedAccessor<Member> {
    EncryptedAccessor::new(tables::MEMBERS, key.clone())
}

async fn insert_member(store: &Store, accessor: &EncryptedAccessor<Member>, member: &Member) {
    let data = accessor.seal(member).expect("seal member");
    sqlx::query(
        "INSERT INTO members (id, idhash, phash, created, updated, data) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(member.id.as_str())
    .bind(hash_index(member.username.as_bytes()).to_hex())
    .bind("$argon2id$stub")
    .bind(member.created_at.to_rfc3339())
    .bind(member.updated_at.to_rfc3339())
    .bind(data)
    .execute(&store.pool)
    .await
    .expect("insert member row");
}

async fn insert_conversation_row(store: &Store, id: &str) {
    sqlx::query("INSERT INTO conversations (id, created, updated, data) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind("2026-01-01T00:00:00+00:00")
        .bind("2026-01-01T00:00:00+00:00")
        .bind(vec![0u8; 8])
        .execute(&store.pool)
        .await
        .expect("insert conversation row");
}

#[tokio::test]
async fn opening_a_file_backed_store_runs_migrations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("haven.db");
    let store = Store::open(&path).await.expect("open file-backed store");

    // Schema is in place and empty.
    for table in ["groups", "members", "conversations", "messages"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&store.pool)
            .await
            .expect("count rows");
        assert_eq!(count, 0);
    }
}

#[tokio::test]
async fn get_missing_row_is_not_found() {
    let store = open_store().await;
    let accessor = member_accessor(&DataKey::generate());
    let err = accessor
        .get(&store.pool, &EntityId::from("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound("members")));
}

#[tokio::test]
async fn roundtrip_through_the_store() {
    let store = open_store().await;
    let key = DataKey::generate();
    let accessor = member_accessor(&key);

    let member = Member::new("alice", "Alice");
    insert_member(&store, &accessor, &member).await;

    let loaded = accessor.get(&store.pool, &member.id).await.unwrap();
    assert_eq!(loaded, member);
}

#[tokio::test]
async fn wrong_key_is_a_crypto_error_not_a_missing_row() {
    let store = open_store().await;
    let right = DataKey::generate();
    let accessor = member_accessor(&right);

    let member = Member::new("alice", "Alice");
    insert_member(&store, &accessor, &member).await;

    let wrong = member_accessor(&DataKey::generate());
    let err = wrong.get(&store.pool, &member.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Crypto(_)));
}

#[tokio::test]
async fn lookup_by_index_hash() {
    let store = open_store().await;
    let key = DataKey::generate();
    let accessor = member_accessor(&key);

    let member = Member::new("alice", "Alice");
    insert_member(&store, &accessor, &member).await;

    let found = accessor
        .get_by_index_hash(&store.pool, &hash_index(b"alice"))
        .await
        .unwrap();
    assert_eq!(found, member);

    let err = accessor
        .get_by_index_hash(&store.pool, &hash_index(b"bob"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound("members")));
}

#[tokio::test]
async fn list_returns_every_row_decrypted() {
    let store = open_store().await;
    let key = DataKey::generate();
    let accessor = member_accessor(&key);

    let alice = Member::new("alice", "Alice");
    let bob = Member::new("bob", "Bob");
    insert_member(&store, &accessor, &alice).await;
    insert_member(&store, &accessor, &bob).await;

    let mut usernames: Vec<String> = accessor
        .list(&store.pool)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.username)
        .collect();
    usernames.sort();
    assert_eq!(usernames, vec!["alice", "bob"]);
}

#[tokio::test]
async fn set_reencrypts_in_place_and_requires_an_existing_row() {
    let store = open_store().await;
    let key = DataKey::generate();
    let accessor = member_accessor(&key);

    let member = Member::new("alice", "Alice");
    insert_member(&store, &accessor, &member).await;

    let renamed = member.with_updates(hv_model::MemberUpdate {
        name: Some("Alice L.".into()),
        ..Default::default()
    });
    accessor.set(&store.pool, &member.id, &renamed).await.unwrap();

    let loaded = accessor.get(&store.pool, &member.id).await.unwrap();
    assert_eq!(loaded.name, "Alice L.");

    let err = accessor
        .set(&store.pool, &EntityId::from("ghost"), &renamed)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound("members")));
}

#[tokio::test]
async fn set_with_index_hash_moves_the_lookup() {
    let store = open_store().await;
    let key = DataKey::generate();
    let accessor = member_accessor(&key);

    let member = Member::new("alice", "Alice");
    insert_member(&store, &accessor, &member).await;

    let renamed = member.with_updates(hv_model::MemberUpdate {
        username: Some("alicia".into()),
        ..Default::default()
    });
    accessor
        .set_with_index_hash(&store.pool, &member.id, &hash_index(b"alicia"), &renamed)
        .await
        .unwrap();

    assert!(accessor
        .get_by_index_hash(&store.pool, &hash_index(b"alice"))
        .await
        .is_err());
    let found = accessor
        .get_by_index_hash(&store.pool, &hash_index(b"alicia"))
        .await
        .unwrap();
    assert_eq!(found.username, "alicia");
}

#[tokio::test]
async fn duplicate_index_hash_is_a_conflict() {
    let store = open_store().await;
    let key = DataKey::generate();
    let accessor = member_accessor(&key);

    insert_member(&store, &accessor, &Member::new("alice", "Alice")).await;

    // Same username, same idhash: the unique constraint must trip.
    let dup = Member::new("alice", "Another Alice");
    let data = accessor.seal(&dup).unwrap();
    let err: StoreError = sqlx::query(
        "INSERT INTO members (id, idhash, phash, created, updated, data) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(dup.id.as_str())
    .bind(hash_index(b"alice").to_hex())
    .bind("$argon2id$stub")
    .bind(dup.created_at.to_rfc3339())
    .bind(dup.updated_at.to_rfc3339())
    .bind(data)
    .execute(&store.pool)
    .await
    .unwrap_err()
    .into();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn payloads_are_bound_to_their_table() {
    let store = open_store().await;
    let key = DataKey::generate();
    let members = member_accessor(&key);

    let member = Member::new("alice", "Alice");
    insert_member(&store, &members, &member).await;

    // Same key, different table binding: the AAD must reject the swap.
    let stolen: (Vec<u8>,) = sqlx::query_as("SELECT data FROM members WHERE id = ?")
        .bind(member.id.as_str())
        .fetch_one(&store.pool)
        .await
        .unwrap();
    let conversations = EncryptedAccessor::<Member>::new(tables::CONVERSATIONS, key.clone());
    assert!(matches!(
        conversations.open(&stolen.0),
        Err(StoreError::Crypto(_))
    ));
}

#[tokio::test]
async fn filtered_listing_binds_metadata_columns() {
    let store = open_store().await;
    let key = DataKey::generate();
    let accessor = EncryptedAccessor::<Message>::new(tables::MESSAGES, key.clone());

    insert_conversation_row(&store, "c1").await;
    insert_conversation_row(&store, "c2").await;

    for (conversation, content) in [("c1", "one"), ("c1", "two"), ("c2", "three")] {
        let msg = Message::new(
            EntityId::from("author-less"),
            EntityId::from(conversation),
            content,
        );
        let data = accessor.seal(&msg).unwrap();
        sqlx::query(
            "INSERT INTO messages (id, conversation, author, created, updated, data) \
             VALUES (?, ?, NULL, ?, ?, ?)",
        )
        .bind(msg.id.as_str())
        .bind(conversation)
        .bind(msg.created_at.to_rfc3339())
        .bind(msg.updated_at.to_rfc3339())
        .bind(data)
        .execute(&store.pool)
        .await
        .unwrap();
    }

    let filter = Filter::new().clause("conversation = ?", Bind::Text("c1".into()));
    let mut contents: Vec<String> = accessor
        .list_filtered(&store.pool, &filter)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    contents.sort();
    assert_eq!(contents, vec!["one", "two"]);
}

#[tokio::test]
async fn deleting_a_conversation_cascades_to_its_messages() {
    let store = open_store().await;
    insert_conversation_row(&store, "c1").await;

    sqlx::query(
        "INSERT INTO messages (id, conversation, author, created, updated, data) \
         VALUES ('m1', 'c1', NULL, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00', x'00')",
    )
    .execute(&store.pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM conversations WHERE id = 'c1'")
        .execute(&store.pool)
        .await
        .unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&store.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn group_entity_seals_a_recoverable_bundle() {
    let store = open_store().await;
    let password = Password::parse("Aa1!aaaaaaaaaaaa").unwrap();
    let data_key = DataKey::generate();
    let group = Group::new("g1", "Book Club", "weekly reads");

    let sealed = GroupEntity::seal(&group, &password, &data_key, &KdfParams::insecure_fast())
        .expect("seal group entity");
    entity::insert_group(&store.pool, &sealed).await.unwrap();

    assert!(entity::group_exists(&store.pool).await.unwrap());

    let row = entity::fetch_group_by_hash(&store.pool, &hash_index(b"g1"))
        .await
        .unwrap()
        .expect("group row by handle hash");
    assert_eq!(row.id, group.id.as_str());

    // The payload decrypts back to the original group under the data key.
    let accessor = EncryptedAccessor::<Group>::new(tables::GROUPS, data_key.clone());
    let decrypted = accessor.open(&row.data).unwrap();
    assert_eq!(decrypted, group);
}
