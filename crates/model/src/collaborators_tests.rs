use super::fakes::*;
use super::*;
use oj_core::Ticket;

#[tokio::test]
async fn fake_ticket_tracker_returns_seeded_ticket() {
    let tracker = FakeTicketTracker::new();
    tracker.seed(Ticket::new("ENG-1", "Add Multiply", "desc"));
    let ticket = tracker.get_ticket("ENG-1").await.expect("seeded");
    assert_eq!(ticket.title, "Add Multiply");
}

#[tokio::test]
async fn fake_ticket_tracker_missing_ticket_errors() {
    let tracker = FakeTicketTracker::new();
    let err = tracker.get_ticket("ENG-404").await.unwrap_err();
    assert!(matches!(err, CollaboratorError::NotFound(_)));
}

#[tokio::test]
async fn fake_vcs_client_records_calls_in_order() {
    let vcs = FakeVcsClient::new("/tmp/work", "diff --git a/x b/x");
    vcs.create_worktree("feature/x", "main").await.expect("worktree");
    vcs.get_diff().await.expect("diff");
    vcs.stage().await.expect("stage");
    vcs.commit("message").await.expect("commit");
    vcs.push("feature/x").await.expect("push");

    let calls = vcs.calls.lock();
    assert_eq!(calls.len(), 5);
    assert!(matches!(calls[0], VcsCall::CreateWorktree { .. }));
    assert!(matches!(calls[4], VcsCall::Push { .. }));
}

#[tokio::test]
async fn fake_pr_creator_returns_configured_url() {
    let creator = FakePrCreator::new("https://example.invalid/pr/1");
    let handle = creator
        .create_pr(std::path::Path::new("/tmp/work"), "title", "body", "main")
        .await
        .expect("create_pr");
    assert_eq!(handle.url, "https://example.invalid/pr/1");
    assert_eq!(creator.calls.lock().len(), 1);
}
