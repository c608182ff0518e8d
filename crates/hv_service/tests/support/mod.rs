//! Shared fixtures for the service integration tests.
#![allow(dead_code)]

use hv_crypto::{DataKey, KdfParams};
use hv_model::Member;
use hv_service::group::{AuthenticateGroupRequest, CreateGroupRequest, GroupService};
use hv_service::member::{CreateMemberRequest, MemberService};
use hv_store::Store;

pub const GROUP_PASSWORD: &str = "Aa1!aaaaaaaaaaaa";
pub const MEMBER_PASSWORD: &str = "Bb2@bbbbbbbbbbbb";

pub async fn open_store() -> Store {
    Store::open_in_memory().await.expect("open in-memory store")
}

/// Build a group service with test-grade KDF cost.
pub fn group_service(store: &Store) -> GroupService {
    GroupService::with_kdf_params(store.clone(), KdfParams::insecure_fast())
}

/// Create the deployment group and authenticate against it, returning the
/// service and the unwrapped data key capability.
pub async fn setup_group(store: &Store) -> (GroupService, DataKey) {
    let service = group_service(store);
    service
        .create(CreateGroupRequest {
            handle: "g1".into(),
            name: "Book Club".into(),
            description: "weekly reads".into(),
            password: GROUP_PASSWORD.into(),
        })
        .await
        .expect("create group");
    let key = service
        .authenticate(AuthenticateGroupRequest {
            handle: "g1".into(),
            password: GROUP_PASSWORD.into(),
        })
        .await
        .expect("authenticate group");
    (service, key)
}

/// Add a member with the standard test password.
pub async fn add_member(store: &Store, key: &DataKey, username: &str, name: &str) -> Member {
    MemberService::new(store.clone())
        .create(
            CreateMemberRequest {
                username: username.into(),
                name: name.into(),
                password: MEMBER_PASSWORD.into(),
            },
            key,
        )
        .await
        .expect("create member")
}
