// Sanitization utilities
// Maps internal failures onto the fixed texts a chat user is allowed to see

use crate::types::AptekaError;

pub const TEXT_INPUT_TOO_LARGE: &str =
    "Сообщение слишком длинное. Запишите голосовое не длиннее 20 секунд или перечислите меньше лекарств";
pub const TEXT_TRANSCRIPTION_FAILED: &str =
    "Не удалось распознать голосовое сообщение - попробуйте еще раз";
pub const TEXT_TRANSCRIPTION_UNAVAILABLE: &str =
    "Не удалось распознать голосовое сообщение - напишите названия лекарств текстом";
pub const TEXT_INVALID_PHARMACY: &str =
    "Не удалось создать аптеку: проверьте название, адрес и телефон";
pub const TEXT_GENERIC_FAILURE: &str = "Что-то пошло не так - попробуйте еще раз";

/// Text for the chat user. Never carries the underlying error message.
pub fn user_message(error: &AptekaError) -> &'static str {
    match error {
        AptekaError::InputTooLarge(_) => TEXT_INPUT_TOO_LARGE,
        AptekaError::TranscriptionFailure { .. } if error.is_retryable() => TEXT_TRANSCRIPTION_FAILED,
        AptekaError::TranscriptionFailure { .. } => TEXT_TRANSCRIPTION_UNAVAILABLE,
        AptekaError::ValidationFailure(_) => TEXT_INVALID_PHARMACY,
        AptekaError::PersistenceFailure(_)
        | AptekaError::DispatchFailure(_)
        | AptekaError::ConfigError(_)
        | AptekaError::Other(_) => TEXT_GENERIC_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_reply_depends_on_retryability() {
        let transient = AptekaError::TranscriptionFailure {
            message: "provider returned 503".into(),
            transient: true,
        };
        let permanent = AptekaError::TranscriptionFailure {
            message: "provider returned 400".into(),
            transient: false,
        };
        assert_eq!(user_message(&transient), TEXT_TRANSCRIPTION_FAILED);
        assert_eq!(user_message(&permanent), TEXT_TRANSCRIPTION_UNAVAILABLE);
    }

    #[test]
    fn test_internal_failures_share_generic_text() {
        for err in [
            AptekaError::PersistenceFailure("deadlock detected".into()),
            AptekaError::DispatchFailure("429".into()),
            AptekaError::ConfigError("missing bot token".into()),
        ] {
            assert_eq!(user_message(&err), TEXT_GENERIC_FAILURE);
        }
    }
}
