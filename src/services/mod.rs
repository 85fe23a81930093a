pub mod comment_service;
pub mod error;
pub mod hot_place_service;
pub mod post_service;
pub mod recruitment_service;
pub mod tour_service;
pub mod user_service;

pub use comment_service::CommentService;
pub use error::ServiceError;
pub use hot_place_service::HotPlaceService;
pub use post_service::PostService;
pub use recruitment_service::RecruitmentService;
pub use tour_service::TourService;
pub use user_service::UserService;

/// Reject blank required text fields.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Same as [`require_text`] for patch fields, which may be absent.
pub(crate) fn require_text_if_present(field: &str, value: Option<&str>) -> Result<(), ServiceError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_invalid() {
        assert!(matches!(require_text("title", "  "), Err(ServiceError::Invalid(msg)) if msg == "title must not be empty"));
        assert!(require_text("title", "Busan").is_ok());
        assert!(require_text_if_present("title", None).is_ok());
        assert!(require_text_if_present("title", Some("")).is_err());
    }
}
