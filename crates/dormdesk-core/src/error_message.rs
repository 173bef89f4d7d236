// ── Error localization ──
//
// Maps API failures to user-facing Russian messages. Resolution order:
// known `error.code` → server `error.message` → the error's own display
// text → generic fallback when no response was received at all.

use dormdesk_api::Error;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Shown when nothing more specific is available.
pub const GENERIC_ERROR_MESSAGE: &str = "Произошла ошибка";

/// Server error codes with a localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Coworking service
    CoworkingNotFound,
    BookingNotFound,
    CoworkingNotAvailable,
    BookingInvalidStatusTransition,
    BookingAccessDenied,
    StudentAlreadyHasActiveBooking,

    // Gateway
    Unauthorized,
    Forbidden,

    // Application service
    AppApplicationNotFound,
    AppDocumentNotFound,
    AppInvalidDocumentType,
    AppMinorVoiceRequired,
    AppForbidden,
    AppAlreadyDecided,
}

impl ErrorCode {
    pub fn message(self) -> &'static str {
        match self {
            Self::CoworkingNotFound => "Коворкинг не найден",
            Self::BookingNotFound => "Бронирование не найдено",
            Self::CoworkingNotAvailable => "Коворкинг недоступен для бронирования",
            Self::BookingInvalidStatusTransition => "Некорректный переход статуса бронирования",
            Self::BookingAccessDenied => "Нет доступа к данному бронированию",
            Self::StudentAlreadyHasActiveBooking => {
                "У вас уже есть активное или ожидающее бронирование"
            }
            Self::Unauthorized => "Необходимо авторизоваться",
            Self::Forbidden => "Недостаточно прав",
            Self::AppApplicationNotFound => "Заявление не найдено",
            Self::AppDocumentNotFound => "Документ не найден",
            Self::AppInvalidDocumentType => "Недопустимый тип документа",
            Self::AppMinorVoiceRequired => {
                "Для несовершеннолетних требуется голосовое сообщение родителя"
            }
            Self::AppForbidden => "Нет доступа к данному заявлению",
            Self::AppAlreadyDecided => "Решение по заявлению уже принято",
        }
    }
}

/// Localized message for a raw server error code, if the code is known.
pub fn message_for_code(code: &str) -> Option<&'static str> {
    code.parse::<ErrorCode>().ok().map(ErrorCode::message)
}

/// Produce the user-facing message for an API failure.
pub fn error_message(err: &Error) -> String {
    if let Some(body) = err.body() {
        if let Some(message) = body.code().and_then(message_for_code) {
            return message.to_owned();
        }
        if let Some(message) = body.message().filter(|m| !m.is_empty()) {
            return message.to_owned();
        }
    }

    match err {
        // The 401 body is consumed by the session handling before it reaches us.
        Error::Unauthorized => ErrorCode::Unauthorized.message().to_owned(),
        e if e.is_transport() => GENERIC_ERROR_MESSAGE.to_owned(),
        e => e.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dormdesk_api::{ApiErrorBody, ApiErrorDetail};
    use strum::IntoEnumIterator;

    use super::*;

    fn api_error(code: Option<&str>, message: Option<&str>) -> Error {
        Error::Api {
            status: 409,
            body: Some(ApiErrorBody {
                error: Some(ApiErrorDetail {
                    code: code.map(String::from),
                    message: message.map(String::from),
                }),
            }),
        }
    }

    #[test]
    fn every_code_has_a_message() {
        for code in ErrorCode::iter() {
            assert!(!code.message().is_empty(), "{code} has no message");
            assert_eq!(code.as_ref().parse::<ErrorCode>().unwrap(), code);
        }
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            ErrorCode::StudentAlreadyHasActiveBooking.to_string(),
            "STUDENT_ALREADY_HAS_ACTIVE_BOOKING"
        );
        assert_eq!(
            "APP_MINOR_VOICE_REQUIRED".parse::<ErrorCode>().unwrap(),
            ErrorCode::AppMinorVoiceRequired
        );
    }

    #[test]
    fn known_code_wins_over_server_message() {
        let err = api_error(
            Some("STUDENT_ALREADY_HAS_ACTIVE_BOOKING"),
            Some("Student already has an active booking"),
        );
        assert_eq!(
            error_message(&err),
            "У вас уже есть активное или ожидающее бронирование"
        );
    }

    #[test]
    fn unknown_code_falls_back_to_server_message() {
        let err = api_error(Some("SOMETHING_NEW"), Some("Server says no"));
        assert_eq!(error_message(&err), "Server says no");
    }

    #[test]
    fn bodyless_error_uses_display() {
        let err = Error::Api {
            status: 502,
            body: None,
        };
        assert_eq!(error_message(&err), "Request failed with status code 502");
    }

    #[test]
    fn code_without_message_and_unknown_uses_display() {
        let err = api_error(Some("SOMETHING_NEW"), None);
        assert_eq!(error_message(&err), "Request failed with status code 409");
    }

    #[test]
    fn unauthorized_is_localized() {
        assert_eq!(error_message(&Error::Unauthorized), "Необходимо авторизоваться");
    }

    #[test]
    fn deserialization_uses_display() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert_eq!(error_message(&err), "Deserialization error: expected value");
    }
}
