use std::sync::Arc;

use chrono::{NaiveTime, Utc};

use crate::{
    alarm::RequestId,
    haptics::HapticKind,
    notification::{
        CalendarTrigger, DeliveredNotification, DeliveryHandler, LocalNotificationCenter,
        NotificationBridge, NotificationCenter, NotificationContent, NotificationRequest,
        NotificationResponse, delivery_channel, local_center::get_target_delay,
    },
    presenter::{AlarmPresenter, DEFAULT_PULSE_INTERVAL},
    test_utils::{FakeNotificationCenter, RecordingHaptics},
};

use super::*;

struct TestContext {
    pub center: Arc<FakeNotificationCenter>,
    pub haptics: RecordingHaptics,
    pub delivery_handler: DeliveryHandler,
    pub controller: AlarmController,
}

impl TestContext {
    fn new() -> Self {
        let center = Arc::new(FakeNotificationCenter::authorized());
        let haptics = RecordingHaptics::default();
        let (delivery_handler, deliveries) = delivery_channel();
        let machine = AlarmStateMachine::new(
            NotificationBridge::new(center.clone()),
            AlarmPresenter::new(Arc::new(haptics.clone())),
        );
        let controller = AlarmController::create(machine, deliveries);

        Self {
            center,
            haptics,
            delivery_handler,
            controller,
        }
    }

    /// Simulates the platform delivering the pending alarm while the app is in
    /// the foreground.
    fn deliver_in_foreground(&self) {
        let options = self.delivery_handler.will_present(&delivered());
        assert!(options.is_empty(), "The platform banner must be suppressed");
    }

    fn deliver_through_interaction(&self) {
        self.delivery_handler.did_receive(&NotificationResponse {
            notification: delivered(),
        });
    }
}

fn delivered() -> DeliveredNotification {
    DeliveredNotification {
        request: NotificationRequest {
            identifier: RequestId::alarm(),
            content: NotificationContent {
                title: "GetUpPlease".to_owned(),
                body: "Time to wake up!".to_owned(),
                sound: None,
            },
            trigger: CalendarTrigger {
                time: eight(),
                repeats: false,
            },
        },
        delivered_at: Utc::now(),
    }
}

fn eight() -> AlarmTime {
    AlarmTime::from_hm(8, 0).unwrap()
}

/// Lets the controller task drain its queues.
async fn settle() {
    time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn full_alarm_cycle() {
    let ctx = TestContext::new();

    let state = ctx.controller.arm(eight()).await.unwrap();
    assert_eq!(state, AlarmState::Armed(eight()));

    ctx.deliver_in_foreground();
    settle().await;

    assert_eq!(ctx.controller.state(), AlarmState::Firing);
    assert_eq!(ctx.haptics.count(HapticKind::Notification), 1);

    time::sleep(DEFAULT_PULSE_INTERVAL * 2).await;
    assert_eq!(ctx.haptics.count(HapticKind::Notification), 3);

    let pulses_before_dismiss = ctx.haptics.pulses().len();
    let state = ctx.controller.dismiss().await.unwrap();
    time::sleep(DEFAULT_PULSE_INTERVAL * 3).await;

    assert_eq!(state, AlarmState::Idle);
    assert_eq!(ctx.controller.state(), AlarmState::Idle);
    assert_eq!(
        ctx.haptics.pulses()[pulses_before_dismiss..],
        [HapticKind::Success]
    );
}

#[tokio::test(start_paused = true)]
async fn firing_flag_is_observable_from_controller() {
    let ctx = TestContext::new();
    let firing = ctx.controller.subscribe_firing();
    ctx.controller.arm(eight()).await.unwrap();
    assert!(!*firing.borrow());

    ctx.deliver_through_interaction();
    settle().await;
    assert!(*firing.borrow());

    ctx.controller.dismiss().await.unwrap();
    assert!(!*firing.borrow());
}

#[tokio::test(start_paused = true)]
async fn redundant_deliveries_start_one_session() {
    let ctx = TestContext::new();
    ctx.controller.arm(eight()).await.unwrap();

    ctx.deliver_in_foreground();
    ctx.deliver_through_interaction();
    ctx.deliver_in_foreground();
    settle().await;

    assert_eq!(ctx.controller.state(), AlarmState::Firing);
    assert_eq!(ctx.haptics.count(HapticKind::Notification), 1);

    time::sleep(DEFAULT_PULSE_INTERVAL).await;
    assert_eq!(ctx.haptics.count(HapticKind::Notification), 2);
}

#[tokio::test(start_paused = true)]
async fn stale_delivery_after_cancel_is_ignored() {
    let ctx = TestContext::new();
    ctx.controller.arm(eight()).await.unwrap();
    ctx.controller.cancel().await.unwrap();

    ctx.deliver_through_interaction();
    settle().await;
    time::sleep(DEFAULT_PULSE_INTERVAL * 2).await;

    assert_eq!(ctx.controller.state(), AlarmState::Idle);
    assert!(ctx.center.pending().is_empty());
    assert_eq!(ctx.haptics.count(HapticKind::Notification), 0);
}

#[tokio::test(start_paused = true)]
async fn observers_see_every_transition() {
    let ctx = TestContext::new();
    let mut observer = ctx.controller.subscribe();

    ctx.controller.arm(eight()).await.unwrap();
    observer.changed().await.unwrap();
    assert_eq!(*observer.borrow_and_update(), AlarmState::Armed(eight()));

    ctx.deliver_in_foreground();
    observer.changed().await.unwrap();
    assert_eq!(*observer.borrow_and_update(), AlarmState::Firing);

    ctx.controller.dismiss().await.unwrap();
    observer.changed().await.unwrap();
    assert_eq!(*observer.borrow_and_update(), AlarmState::Idle);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_vibration() {
    let ctx = TestContext::new();
    let haptics = ctx.haptics.clone();
    ctx.controller.arm(eight()).await.unwrap();
    ctx.deliver_in_foreground();
    settle().await;

    ctx.controller.shutdown().await;
    time::sleep(DEFAULT_PULSE_INTERVAL * 3).await;

    assert_eq!(haptics.count(HapticKind::Notification), 1);
}

#[tokio::test(start_paused = true)]
async fn local_center_drives_alarm_end_to_end() {
    let haptics = RecordingHaptics::default();
    let (delivery_handler, deliveries) = delivery_channel();
    let center = Arc::new(LocalNotificationCenter::new(
        delivery_handler,
        chrono_tz::UTC,
        true,
    ));
    let bridge = NotificationBridge::new(center.clone());
    bridge.request_authorization().await.unwrap();
    let machine = AlarmStateMachine::new(bridge, AlarmPresenter::new(Arc::new(haptics.clone())));
    let controller = AlarmController::create(machine, deliveries);
    let fire_at = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    let expected_delay = get_target_delay(&fire_at, &Utc::now());

    controller.arm(eight()).await.unwrap();
    time::sleep(expected_delay.to_std().unwrap() + Duration::from_millis(500)).await;

    assert_eq!(controller.state(), AlarmState::Firing);
    assert!(center.pending_requests().await.is_empty());

    controller.dismiss().await.unwrap();
    assert_eq!(controller.state(), AlarmState::Idle);
}
