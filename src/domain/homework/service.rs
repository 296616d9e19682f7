use super::dto::Homework;
use crate::utils::error::AppError;

/// Verdict for a rejected submission.
const VERDICT_REJECTED: &str = "К сожалению в работе нашлись ошибки.";

/// Verdict for an approved submission.
const VERDICT_APPROVED: &str =
    "Ревьюеру всё понравилось, можно приступать к следующему уроку.";

/// Verdict for a submission that entered review.
const VERDICT_REVIEWING: &str = "Ваша работа прошла тесты и поступила на ревью.";

/// Maps a status code to its fixed verdict text.
fn verdict_for(status: &str) -> Option<&'static str> {
    match status {
        "rejected" => Some(VERDICT_REJECTED),
        "approved" => Some(VERDICT_APPROVED),
        "reviewing" => Some(VERDICT_REVIEWING),
        _ => None,
    }
}

/// Builds the notification text for one submission.
///
/// Pure; fails with `UnknownStatus` when the status code is outside the
/// known vocabulary.
pub fn parse_homework_status(homework: &Homework) -> Result<String, AppError> {
    let verdict = verdict_for(&homework.status)
        .ok_or_else(|| AppError::UnknownStatus(homework.status.clone()))?;

    Ok(format!(
        "У вас проверили работу \"{}\"!\n\n{}",
        homework.homework_name, verdict
    ))
}
