use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;

use crate::config::AppConfig;
use crate::domain::homework::client::SharedStatusApi;
use crate::domain::homework::parse_homework_status;
use crate::domain::telegram::client::SharedNotifier;
use crate::utils::error::AppError;

/// The polling loop.
///
/// Owns the timestamp cursor and the two external collaborators. One state:
/// fetch, interpret the most recent submission, notify, advance the cursor,
/// sleep. Every error is logged and swallowed here; the loop never
/// terminates on its own.
pub struct Poller {
    api: SharedStatusApi,
    notifier: SharedNotifier,
    cursor: i64,
    poll_interval: Duration,
    retry_initial: Duration,
    retry_max: Duration,
}

impl Poller {
    pub fn new(
        api: SharedStatusApi,
        notifier: SharedNotifier,
        start_cursor: i64,
        config: &AppConfig,
    ) -> Self {
        Self {
            api,
            notifier,
            cursor: start_cursor,
            poll_interval: config.poll_interval,
            retry_initial: config.retry_initial,
            retry_max: config.retry_max,
        }
    }

    /// Last successfully processed point in the submission history.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// One polling iteration. Returns whether a notification went out.
    ///
    /// The cursor only advances after the whole iteration succeeded, so a
    /// failed send is re-attempted with the same `from_date` on the next
    /// round.
    pub async fn poll_once(&mut self) -> Result<bool, AppError> {
        let response = self.api.fetch_statuses(self.cursor).await?;

        let mut notified = false;
        if let Some(homework) = response.homeworks.first() {
            tracing::info!(
                homework = %homework.homework_name,
                status = %homework.status,
                "Review status changed"
            );
            let message = parse_homework_status(homework)?;
            self.notifier.send_message(&message).await?;
            notified = true;
        }

        if let Some(current_date) = response.current_date {
            self.cursor = current_date;
        }

        Ok(notified)
    }

    /// Runs the loop until the task is dropped (see `shutdown_signal`).
    ///
    /// Successful iterations sleep the poll interval and reset the backoff;
    /// failed ones sleep the next backoff delay instead.
    pub async fn run(mut self) {
        let mut retry = create_backoff(self.retry_initial, self.retry_max);

        loop {
            match self.poll_once().await {
                Ok(notified) => {
                    retry.reset();
                    tracing::debug!(
                        notified,
                        cursor = self.cursor,
                        sleep_secs = self.poll_interval.as_secs(),
                        "Iteration finished"
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    let delay = retry.next_backoff().unwrap_or(self.retry_max);
                    if e.is_transient() {
                        tracing::warn!(error = %e, retry_secs = delay.as_secs(), "Transient failure, will retry");
                    } else {
                        tracing::error!(error = %e, retry_secs = delay.as_secs(), "Iteration failed, will retry");
                    }
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Retry policy for failed iterations.
///
/// Starts at `initial`, doubles, never exceeds `max`, never gives up.
fn create_backoff(initial: Duration, max: Duration) -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: initial,
        max_interval: max,
        max_elapsed_time: None,
        multiplier: 2.0,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::homework::client::MockStatusApi;
    use crate::domain::homework::dto::{Homework, StatusResponse};
    use crate::domain::telegram::client::MockNotifier;

    const APPROVED_MESSAGE: &str = "У вас проверили работу \"X\"!\n\n\
         Ревьюеру всё понравилось, можно приступать к следующему уроку.";

    fn test_config() -> AppConfig {
        AppConfig {
            praktikum_token: "praktikum-token".to_string(),
            telegram_token: "telegram-token".to_string(),
            telegram_chat_id: "42".to_string(),
            api_url: "https://example.com/api/".to_string(),
            poll_interval: Duration::from_secs(1200),
            retry_initial: Duration::from_secs(5),
            retry_max: Duration::from_secs(300),
        }
    }

    fn approved_response() -> StatusResponse {
        StatusResponse {
            homeworks: vec![Homework {
                homework_name: "X".to_string(),
                status: "approved".to_string(),
            }],
            current_date: Some(1000),
            error: None,
            code: None,
            message: None,
        }
    }

    fn empty_response(current_date: Option<i64>) -> StatusResponse {
        StatusResponse {
            current_date,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn should_notify_and_advance_cursor_for_new_submission() {
        // Arrange
        let mut api = MockStatusApi::new();
        api.expect_fetch_statuses()
            .withf(|from_date| *from_date == 0)
            .times(1)
            .returning(|_| Ok(approved_response()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_message()
            .withf(|text| text == APPROVED_MESSAGE)
            .times(1)
            .returning(|_| Ok(()));

        let mut poller = Poller::new(Arc::new(api), Arc::new(notifier), 0, &test_config());

        // Act
        let result = poller.poll_once().await;

        // Assert
        assert!(matches!(result, Ok(true)));
        assert_eq!(poller.cursor(), 1000);
    }

    #[tokio::test]
    async fn should_not_notify_for_empty_submission_list() {
        // Arrange
        let mut api = MockStatusApi::new();
        api.expect_fetch_statuses()
            .times(1)
            .returning(|_| Ok(empty_response(Some(2000))));

        let mut notifier = MockNotifier::new();
        notifier.expect_send_message().times(0);

        let mut poller = Poller::new(Arc::new(api), Arc::new(notifier), 500, &test_config());

        // Act
        let result = poller.poll_once().await;

        // Assert - cursor still advances from the server-supplied value
        assert!(matches!(result, Ok(false)));
        assert_eq!(poller.cursor(), 2000);
    }

    #[tokio::test]
    async fn should_keep_cursor_when_response_has_no_current_date() {
        // Arrange
        let mut api = MockStatusApi::new();
        api.expect_fetch_statuses()
            .times(1)
            .returning(|_| Ok(empty_response(None)));

        let notifier = MockNotifier::new();
        let mut poller = Poller::new(Arc::new(api), Arc::new(notifier), 500, &test_config());

        // Act
        poller.poll_once().await.unwrap();

        // Assert
        assert_eq!(poller.cursor(), 500);
    }

    #[tokio::test]
    async fn should_propagate_fetch_error_without_notifying() {
        // Arrange
        let mut api = MockStatusApi::new();
        api.expect_fetch_statuses().times(1).returning(|_| {
            Err(AppError::Api {
                code: "not_authenticated".to_string(),
                message: "invalid token".to_string(),
            })
        });

        let mut notifier = MockNotifier::new();
        notifier.expect_send_message().times(0);

        let mut poller = Poller::new(Arc::new(api), Arc::new(notifier), 500, &test_config());

        // Act
        let result = poller.poll_once().await;

        // Assert
        assert!(matches!(result, Err(AppError::Api { .. })));
        assert_eq!(poller.cursor(), 500);
    }

    #[tokio::test]
    async fn should_survive_transport_failure_and_recover_next_iteration() {
        // Arrange - first fetch fails, second succeeds
        let mut api = MockStatusApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_fetch_statuses()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::Transport("connection refused".to_string())));
        api.expect_fetch_statuses()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(approved_response()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_message()
            .times(1)
            .returning(|_| Ok(()));

        let mut poller = Poller::new(Arc::new(api), Arc::new(notifier), 0, &test_config());

        // Act
        let first = poller.poll_once().await;
        let second = poller.poll_once().await;

        // Assert - the failed iteration left the cursor untouched
        assert!(matches!(first, Err(AppError::Transport(_))));
        assert!(matches!(second, Ok(true)));
        assert_eq!(poller.cursor(), 1000);
    }

    #[tokio::test]
    async fn should_fail_on_unknown_status_without_sending() {
        // Arrange
        let mut api = MockStatusApi::new();
        api.expect_fetch_statuses().times(1).returning(|_| {
            Ok(StatusResponse {
                homeworks: vec![Homework {
                    homework_name: "X".to_string(),
                    status: "graded".to_string(),
                }],
                current_date: Some(1000),
                error: None,
                code: None,
                message: None,
            })
        });

        let mut notifier = MockNotifier::new();
        notifier.expect_send_message().times(0);

        let mut poller = Poller::new(Arc::new(api), Arc::new(notifier), 0, &test_config());

        // Act
        let result = poller.poll_once().await;

        // Assert - the failed iteration does not advance the cursor
        assert!(matches!(result, Err(AppError::UnknownStatus(_))));
        assert_eq!(poller.cursor(), 0);
    }

    #[tokio::test]
    async fn should_keep_cursor_when_send_fails() {
        // Arrange
        let mut api = MockStatusApi::new();
        api.expect_fetch_statuses()
            .times(1)
            .returning(|_| Ok(approved_response()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_message()
            .times(1)
            .returning(|_| Err(AppError::Notify("HTTP 502: bad gateway".to_string())));

        let mut poller = Poller::new(Arc::new(api), Arc::new(notifier), 0, &test_config());

        // Act
        let result = poller.poll_once().await;

        // Assert - the submission will be re-notified with the same cursor
        assert!(matches!(result, Err(AppError::Notify(_))));
        assert_eq!(poller.cursor(), 0);
    }

    #[test]
    fn create_backoff_should_start_at_initial_interval() {
        let backoff = create_backoff(Duration::from_secs(5), Duration::from_secs(300));
        assert_eq!(backoff.initial_interval, Duration::from_secs(5));
    }

    #[test]
    fn create_backoff_should_cap_at_max_interval() {
        let backoff = create_backoff(Duration::from_secs(5), Duration::from_secs(300));
        assert_eq!(backoff.max_interval, Duration::from_secs(300));
    }

    #[test]
    fn create_backoff_should_never_give_up() {
        let mut backoff = create_backoff(Duration::from_millis(1), Duration::from_millis(10));
        for _ in 0..50 {
            assert!(backoff.next_backoff().is_some());
        }
    }

    #[test]
    fn create_backoff_should_double_each_retry() {
        let backoff = create_backoff(Duration::from_secs(5), Duration::from_secs(300));
        assert!((backoff.multiplier - 2.0).abs() < f64::EPSILON);
    }
}
