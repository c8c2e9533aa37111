use crate::model::PanelId;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ApiError(String),
    InvalidResponse(String, String),
    RateExceeded(String),
    ValidationError(String),
    UnknownPanel(PanelId),
    MailError(String),
    FormatError,
    InternalError,
}

impl Error {
    /// Whether the failure came from talking to the backend rather than from local input.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::ApiError(_) | Error::InvalidResponse(_, _) | Error::RateExceeded(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ApiError(e) => write!(f, "API error: {}", e),
            Error::InvalidResponse(body, reason) => {
                write!(f, "invalid API response ({}): {}", reason, body)
            }
            Error::RateExceeded(e) => write!(f, "rate exceeded: {}", e),
            Error::ValidationError(e) => write!(f, "{}", e),
            Error::UnknownPanel(id) => write!(f, "unknown panel {}", id),
            Error::MailError(e) => write!(f, "mail error: {}", e),
            Error::FormatError => write!(f, "format error"),
            Error::InternalError => write!(f, "internal error"),
        }
    }
}

impl std::error::Error for Error {}

fn html(status: Status, title: &str, detail: String) -> response::Result<'static> {
    let body = format!(
        "<html><body><h3>{} {}</h3><code>{}</code></body></html>",
        status.code, title, detail
    );
    Response::build()
        .status(status)
        .sized_body(body.len(), Cursor::new(body))
        .header(ContentType::new("text", "html"))
        .ok()
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Error::ValidationError(s) => html(Status::UnprocessableEntity, "Invalid input", s),
            Error::UnknownPanel(id) => {
                html(Status::NotFound, "Not Found", format!("No panel with id {}", id))
            }
            Error::RateExceeded(s) => html(
                Status::TooManyRequests,
                "Too Many Requests",
                format!("Downstream API response: {}", s),
            ),
            Error::ApiError(_) | Error::InvalidResponse(_, _) | Error::MailError(_) => {
                html(Status::BadGateway, "Bad Gateway", self.to_string())
            }
            Error::FormatError | Error::InternalError => html(
                Status::InternalServerError,
                "Unknown exception",
                format!("{:?}", self),
            ),
        }
    }
}
