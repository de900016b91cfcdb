use uuid::Uuid;

use crate::domain::entities::StoredRefreshRecord;
use crate::repositories::refresh_record::{
    CasOutcome, InMemoryRefreshRecordRepository, RefreshRecordRepository,
};

#[tokio::test]
async fn test_compare_and_swap_outcomes() {
    let repo = InMemoryRefreshRecordRepository::new();
    let subject = Uuid::new_v4();
    let record = StoredRefreshRecord::new(subject, "h1".into(), Uuid::new_v4());

    assert_eq!(
        repo.compare_and_swap(subject, "h1", record.rotate("h2".into())).await.unwrap(),
        CasOutcome::Missing
    );

    repo.put(record.clone()).await.unwrap();
    assert_eq!(
        repo.compare_and_swap(subject, "h1", record.rotate("h2".into())).await.unwrap(),
        CasOutcome::Swapped
    );
    // The same expectation a second time loses
    assert_eq!(
        repo.compare_and_swap(subject, "h1", record.rotate("h3".into())).await.unwrap(),
        CasOutcome::Mismatch
    );

    let stored = repo.find(subject).await.unwrap().unwrap();
    assert_eq!(stored.refresh_token_hash, "h2");
    assert_eq!(stored.generation, 2);
}

#[tokio::test]
async fn test_put_overwrites_and_delete_removes() {
    let repo = InMemoryRefreshRecordRepository::new();
    let subject = Uuid::new_v4();
    repo.put(StoredRefreshRecord::new(subject, "old".into(), Uuid::new_v4())).await.unwrap();
    repo.put(StoredRefreshRecord::new(subject, "new".into(), Uuid::new_v4())).await.unwrap();
    assert_eq!(repo.find(subject).await.unwrap().unwrap().refresh_token_hash, "new");

    assert!(repo.delete(subject).await.unwrap());
    assert!(!repo.delete(subject).await.unwrap());
    assert!(repo.find(subject).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_session_keeps_newer_login() {
    let repo = InMemoryRefreshRecordRepository::new();
    let subject = Uuid::new_v4();
    let old_session = Uuid::new_v4();
    let new_session = Uuid::new_v4();
    repo.put(StoredRefreshRecord::new(subject, "new".into(), new_session)).await.unwrap();

    assert!(!repo.delete_session(subject, old_session).await.unwrap());
    assert!(repo.find(subject).await.unwrap().is_some());

    assert!(repo.delete_session(subject, new_session).await.unwrap());
    assert!(repo.find(subject).await.unwrap().is_none());
}
