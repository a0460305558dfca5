use std::sync::Arc;

use ecorewards_domain::draw::DrawEntryRepository;
use ecorewards_domain::shared::{DrawId, TierId};
use ecorewards_domain::user::{UserAccount, UserRepository};
use ecorewards_infrastructure::persistence::repositories::{
    SqliteDrawEntryRepository, SqliteUserRepository,
};

mod test_helpers;

#[tokio::test]
async fn draw_entries_upsert_increment_integration() {
    let pool = test_helpers::setup_in_memory_db().await;
    let users = SqliteUserRepository::new(Arc::new(pool.clone()));
    let repo = SqliteDrawEntryRepository::new(Arc::new(pool));

    let user = UserAccount::new("casey".to_string(), TierId::from_string("green_champion"))
        .expect("create user");
    users.save(&user).await.expect("save user");

    let draw = DrawId::from_string("draw-1");
    let tier = TierId::from_string("green_champion");

    repo.add_entries(&draw, user.id(), 5, 5, &tier)
        .await
        .expect("first add");
    repo.add_entries(&draw, user.id(), 3, 3, &tier)
        .await
        .expect("second add");

    let allocations = repo.for_user(user.id()).await.expect("list allocations");
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].entry_count(), 8);
    assert_eq!(allocations[0].submitted_points(), 8);
    assert_eq!(allocations[0].pending_entries(), 8);
}

#[tokio::test]
async fn draw_entries_ack_tracking_integration() {
    let pool = test_helpers::setup_in_memory_db().await;
    let users = SqliteUserRepository::new(Arc::new(pool.clone()));
    let repo = SqliteDrawEntryRepository::new(Arc::new(pool));

    let user = UserAccount::new("casey".to_string(), TierId::from_string("green_champion"))
        .expect("create user");
    users.save(&user).await.expect("save user");

    let draw = DrawId::from_string("draw-1");
    let tier = TierId::from_string("green_champion");

    repo.add_entries(&draw, user.id(), 5, 5, &tier)
        .await
        .expect("add");

    let pending = repo.unacked().await.expect("unacked");
    assert_eq!(pending.len(), 1);

    repo.mark_acked(&draw, user.id()).await.expect("ack");
    assert!(repo.unacked().await.expect("unacked").is_empty());

    // New entries after an ack go pending again until the next ack.
    repo.add_entries(&draw, user.id(), 2, 2, &tier)
        .await
        .expect("add more");
    let pending = repo.unacked().await.expect("unacked");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].pending_entries(), 2);
}
