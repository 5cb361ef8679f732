//! Move request form parsing.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};
use uci_bridge::MoveRequest;

use crate::error::ApiError;

pub const FIELD_POSITION: &str = "position";
pub const FIELD_MOVES: &str = "moves";
pub const FIELD_WHITE_TIME: &str = "whitetime";
pub const FIELD_BLACK_TIME: &str = "blacktime";
pub const FIELD_WHITE_INC: &str = "whiteinc";
pub const FIELD_BLACK_INC: &str = "blackinc";

/// Raw name/value pairs from a url-encoded or multipart body, in the order
/// they were sent. A body of any other content type yields no fields.
#[derive(Debug, Default)]
pub struct FormFields(pub Vec<(String, String)>);

impl FormFields {
    /// First value sent for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, name: &'static str) -> Result<&str, ApiError> {
        self.get(name).ok_or(ApiError::MissingField(name))
    }

    /// Extract and validate the six move fields.
    pub fn to_move_request(&self) -> Result<MoveRequest, ApiError> {
        let position = line_safe(FIELD_POSITION, self.required(FIELD_POSITION)?)?;
        let moves = line_safe(FIELD_MOVES, self.required(FIELD_MOVES)?)?;
        let white_time = clock(FIELD_WHITE_TIME, self.required(FIELD_WHITE_TIME)?)?;
        let black_time = clock(FIELD_BLACK_TIME, self.required(FIELD_BLACK_TIME)?)?;
        let white_inc = clock(FIELD_WHITE_INC, self.required(FIELD_WHITE_INC)?)?;
        let black_inc = clock(FIELD_BLACK_INC, self.required(FIELD_BLACK_INC)?)?;

        if position.is_empty() {
            return Err(ApiError::InvalidField {
                field: FIELD_POSITION,
                reason: "must not be empty".to_string(),
            });
        }

        Ok(MoveRequest {
            position: position.to_string(),
            moves: moves.to_string(),
            black_time,
            white_time,
            black_inc,
            white_inc,
        })
    }
}

/// Text that goes into the engine command verbatim must stay on one line.
fn line_safe<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.chars().any(char::is_control) {
        return Err(ApiError::InvalidField {
            field,
            reason: "contains control characters".to_string(),
        });
    }
    Ok(value)
}

fn clock(field: &'static str, value: &str) -> Result<u64, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidField {
            field,
            reason: format!("expected a non-negative integer, got {:?}", value),
        })
}

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match content_type.as_str() {
            "multipart/form-data" => {
                let mut multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::BadForm(e.to_string()))?;
                let mut fields = Vec::new();
                while let Some(field) = multipart
                    .next_field()
                    .await
                    .map_err(|e| ApiError::BadForm(e.to_string()))?
                {
                    let Some(name) = field.name().map(str::to_string) else {
                        continue;
                    };
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadForm(e.to_string()))?;
                    fields.push((name, value));
                }
                Ok(Self(fields))
            }
            "application/x-www-form-urlencoded" => {
                let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::BadForm(e.to_string()))?;
                Ok(Self(fields))
            }
            _ => Ok(Self::default()),
        }
    }
}
