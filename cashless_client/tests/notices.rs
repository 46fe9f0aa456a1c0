mod common;

use std::time::Duration;

use cashless_client::notices::NoticeKind;
use common::offline_controller;
use tokio::time::advance;

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn notice_clears_after_three_seconds() {
    let (controller, _temp) = offline_controller();

    controller.set_recharge_amount("not a number").await;
    controller.submit_recharge().await.unwrap_err();
    settle().await;

    advance(Duration::from_millis(2_900)).await;
    settle().await;
    assert_eq!(
        controller.snapshot().await.error_message(),
        Some("Enter a valid amount")
    );

    advance(Duration::from_millis(200)).await;
    settle().await;
    assert_eq!(controller.snapshot().await.error_message(), None);
}

#[tokio::test(start_paused = true)]
async fn new_notice_resets_countdown() {
    let (controller, _temp) = offline_controller();

    controller.notify(NoticeKind::Success, "first").await;
    settle().await;
    advance(Duration::from_secs(2)).await;
    settle().await;

    controller.notify(NoticeKind::Success, "second").await;
    settle().await;
    advance(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(controller.snapshot().await.success_message(), Some("second"));

    advance(Duration::from_millis(1_100)).await;
    settle().await;
    assert_eq!(controller.snapshot().await.success_message(), None);
}

#[tokio::test(start_paused = true)]
async fn slots_expire_independently() {
    let (controller, _temp) = offline_controller();

    controller.notify(NoticeKind::Error, "failed").await;
    settle().await;
    advance(Duration::from_secs(2)).await;
    controller.notify(NoticeKind::Success, "saved").await;
    settle().await;

    advance(Duration::from_millis(1_100)).await;
    settle().await;
    let state = controller.snapshot().await;
    assert_eq!(state.error_message(), None);
    assert_eq!(state.success_message(), Some("saved"));
}

#[tokio::test(start_paused = true)]
async fn manual_clear_cancels_timer() {
    let (controller, _temp) = offline_controller();

    controller.notify(NoticeKind::Error, "first").await;
    controller.clear_notice(NoticeKind::Error).await;
    assert_eq!(controller.snapshot().await.error_message(), None);

    controller.notify(NoticeKind::Error, "second").await;
    settle().await;
    advance(Duration::from_millis(2_500)).await;
    settle().await;
    assert_eq!(controller.snapshot().await.error_message(), Some("second"));
}
