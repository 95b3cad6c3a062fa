// Patch request DTOs
//
// Every field is optional; `None` leaves the column as it is. JSON `null`
// is treated the same as a missing key.

use crate::application::validation;
use crate::domain::{scalar_from_json, Scalar};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPatch {
    pub body: Option<String>,
}

impl ProfilePatch {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let mut fields = json_fields(value, &["display_name", "bio", "avatar_url"])?;
        Ok(Self {
            display_name: text(&mut fields, "display_name")?,
            bio: text(&mut fields, "bio")?,
            avatar_url: text(&mut fields, "avatar_url")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.display_name {
            validation::non_blank("display_name", name, validation::MAX_DISPLAY_NAME_LEN)?;
        }
        if let Some(bio) = &self.bio {
            validation::max_chars("bio", bio, validation::MAX_BIO_LEN)?;
        }
        if let Some(url) = &self.avatar_url {
            validation::url("avatar_url", url)?;
        }
        Ok(())
    }

    pub(crate) fn into_fields(self) -> Vec<(&'static str, Option<Scalar>)> {
        vec![
            ("display_name", self.display_name.map(Scalar::from)),
            ("bio", self.bio.map(Scalar::from)),
            ("avatar_url", self.avatar_url.map(Scalar::from)),
        ]
    }
}

impl PostPatch {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let mut fields = json_fields(value, &["song_id", "title", "body", "rating"])?;
        Ok(Self {
            song_id: text(&mut fields, "song_id")?,
            title: text(&mut fields, "title")?,
            body: text(&mut fields, "body")?,
            rating: integer(&mut fields, "rating")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.song_id.is_none() && self.title.is_none() && self.body.is_none() && self.rating.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(song_id) = &self.song_id {
            validation::non_blank("song_id", song_id, validation::MAX_TITLE_LEN)?;
        }
        if let Some(title) = &self.title {
            validation::non_blank("title", title, validation::MAX_TITLE_LEN)?;
        }
        if let Some(body) = &self.body {
            validation::max_chars("body", body, validation::MAX_POST_BODY_LEN)?;
        }
        if let Some(rating) = self.rating {
            validation::rating(rating)?;
        }
        Ok(())
    }

    pub(crate) fn into_fields(self) -> Vec<(&'static str, Option<Scalar>)> {
        vec![
            ("song_id", self.song_id.map(Scalar::from)),
            ("title", self.title.map(Scalar::from)),
            ("body", self.body.map(Scalar::from)),
            ("rating", self.rating.map(Scalar::from)),
        ]
    }
}

impl CommentPatch {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let mut fields = json_fields(value, &["body"])?;
        Ok(Self {
            body: text(&mut fields, "body")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(body) = &self.body {
            validation::non_blank("body", body, validation::MAX_COMMENT_LEN)?;
        }
        Ok(())
    }

    pub(crate) fn into_fields(self) -> Vec<(&'static str, Option<Scalar>)> {
        vec![("body", self.body.map(Scalar::from))]
    }
}

fn json_fields(value: serde_json::Value, allowed: &[&str]) -> Result<HashMap<String, Scalar>> {
    let serde_json::Value::Object(map) = value else {
        return Err(AppError::Validation(
            "patch body must be a JSON object".to_string(),
        ));
    };

    let mut fields = HashMap::new();
    for (key, value) in map {
        if !allowed.contains(&key.as_str()) {
            return Err(AppError::Validation(format!("unknown field: {key}")));
        }
        if let Some(scalar) = scalar_from_json(value)? {
            fields.insert(key, scalar);
        }
    }
    Ok(fields)
}

fn text(fields: &mut HashMap<String, Scalar>, key: &str) -> Result<Option<String>> {
    match fields.remove(key) {
        None => Ok(None),
        Some(Scalar::Text(s)) => Ok(Some(s)),
        Some(other) => Err(AppError::Validation(format!(
            "{key} must be text, got {}",
            other.kind()
        ))),
    }
}

fn integer(fields: &mut HashMap<String, Scalar>, key: &str) -> Result<Option<i64>> {
    match fields.remove(key) {
        None => Ok(None),
        Some(Scalar::Integer(i)) => Ok(Some(i)),
        Some(other) => Err(AppError::Validation(format!(
            "{key} must be an integer, got {}",
            other.kind()
        ))),
    }
}
