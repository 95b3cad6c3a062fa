// Field validation shared by create and patch use cases

use crate::domain::{validate_rating, MAX_RATING, MIN_RATING};
use crate::error::{AppError, Result};

pub const MAX_DISPLAY_NAME_LEN: usize = 50;
pub const MAX_USERNAME_LEN: usize = 32;
pub const MAX_BIO_LEN: usize = 280;
pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_POST_BODY_LEN: usize = 5000;
pub const MAX_COMMENT_LEN: usize = 2000;
pub const MAX_PAGE_SIZE: i64 = 100;

pub fn non_blank(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    max_chars(field, value, max_len)
}

pub fn max_chars(field: &str, value: &str, max_len: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::Validation(format!(
            "{field} too long ({len} > {max_len} characters)"
        )));
    }
    Ok(())
}

pub fn rating(value: i64) -> Result<()> {
    if !validate_rating(value) {
        return Err(AppError::Validation(format!(
            "rating {value} out of range ({MIN_RATING}-{MAX_RATING})"
        )));
    }
    Ok(())
}

pub fn username(value: &str) -> Result<()> {
    non_blank("username", value, MAX_USERNAME_LEN)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(AppError::Validation(
            "username must be alphanumeric, '_' or '.'".to_string(),
        ));
    }
    Ok(())
}

pub fn url(field: &str, value: &str) -> Result<()> {
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        return Err(AppError::Validation(format!("{field} must be an http(s) URL")));
    }
    Ok(())
}

pub fn page(limit: i64, offset: i64) -> Result<()> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    if offset < 0 {
        return Err(AppError::Validation("offset cannot be negative".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_rejected() {
        let err = non_blank("title", "   ", 10).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        assert!(max_chars("bio", "ééé", 3).is_ok());
        assert!(max_chars("bio", "éééé", 3).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(rating(1).is_ok());
        assert!(rating(10).is_ok());
        assert!(rating(0).unwrap_err().to_string().contains("out of range"));
        assert!(rating(11).is_err());
    }

    #[test]
    fn test_username_charset() {
        assert!(username("dj.shadow_99").is_ok());
        assert!(username("no spaces").is_err());
    }

    #[test]
    fn test_page_bounds() {
        assert!(page(20, 0).is_ok());
        assert!(page(0, 0).is_err());
        assert!(page(101, 0).is_err());
        assert!(page(10, -1).is_err());
    }
}
