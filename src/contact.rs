use crate::api::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const EMAILJS_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Template parameters handed to the email service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailPayload {
    pub user_name: String,
    pub user_email: String,
    pub message: String,
}

/// Sends contact messages somewhere a human reads them.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, payload: &EmailPayload) -> Result<(), Error>;
}

/// EmailJS REST delivery.
#[derive(Debug, Clone)]
pub struct EmailJs {
    api_url: String,
    service_id: String,
    template_id: String,
    public_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a EmailPayload,
}

impl EmailJs {
    pub fn new(
        api_url: String,
        service_id: String,
        template_id: String,
        public_key: String,
    ) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .build()
            .or(Err(Error::InternalError))?;

        Ok(EmailJs {
            api_url,
            service_id,
            template_id,
            public_key,
            client,
        })
    }
}

#[async_trait]
impl Mailer for EmailJs {
    async fn send(&self, payload: &EmailPayload) -> Result<(), Error> {
        let request = EmailJsRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: payload,
        };

        let response = self
            .client
            .post(self.api_url.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::MailError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(Error::MailError(format!("{}: {}", status, text)))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<EmailPayload, Error> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(Error::ValidationError(String::from(
                "Please fill in all fields.",
            )));
        }
        if !email.contains('@') {
            return Err(Error::ValidationError(format!(
                "Not an email address: {}",
                email
            )));
        }

        Ok(EmailPayload {
            user_name: name.to_owned(),
            user_email: email.to_owned(),
            message: message.to_owned(),
        })
    }

    /// Send the form through `mailer`, clearing it on success.
    pub async fn submit<M: Mailer + ?Sized>(&mut self, mailer: &M) -> Result<(), Error> {
        let payload = self.validate()?;

        mailer.send(&payload).await.map_err(|e| {
            log::error!("Error sending email: {}", e);
            e
        })?;
        log::info!("contact message from {} sent", payload.user_email);

        *self = ContactForm::default();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailPayload>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, payload: &EmailPayload) -> Result<(), Error> {
            if self.fail {
                return Err(Error::MailError(String::from("quota exceeded")));
            }
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn filled() -> ContactForm {
        ContactForm {
            name: String::from("Ada"),
            email: String::from("ada@example.com"),
            message: String::from("Do you install on flat roofs?"),
        }
    }

    #[tokio::test]
    async fn sent_form_is_cleared() {
        let mailer = RecordingMailer::default();
        let mut form = filled();

        form.submit(&mailer).await.unwrap();

        assert_eq!(ContactForm::default(), form);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!("ada@example.com", sent[0].user_email);
    }

    #[tokio::test]
    async fn failed_send_keeps_form() {
        let mailer = RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        };
        let mut form = filled();

        assert!(matches!(form.submit(&mailer).await, Err(Error::MailError(_))));
        assert_eq!(filled(), form);
    }

    #[tokio::test]
    async fn invalid_form_is_not_sent() {
        let mailer = RecordingMailer::default();

        let mut missing = filled();
        missing.message = String::from("  ");
        assert!(missing.submit(&mailer).await.is_err());

        let mut bad_email = filled();
        bad_email.email = String::from("ada.example.com");
        assert!(bad_email.submit(&mailer).await.is_err());

        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn emailjs_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1.0/email/send")
            .match_body(Matcher::Json(json!({
                "service_id": "service_x",
                "template_id": "template_y",
                "user_id": "public_z",
                "template_params": {
                    "user_name": "Ada",
                    "user_email": "ada@example.com",
                    "message": "Do you install on flat roofs?"
                }
            })))
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let mailer = EmailJs::new(
            format!("{}/api/v1.0/email/send", server.url()),
            String::from("service_x"),
            String::from("template_y"),
            String::from("public_z"),
        )
        .unwrap();
        let mut form = filled();

        form.submit(&mailer).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn emailjs_rejection() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/send")
            .with_status(400)
            .with_body("The public key is invalid")
            .create_async()
            .await;

        let mailer = EmailJs::new(
            format!("{}/send", server.url()),
            String::from("s"),
            String::from("t"),
            String::from("bad"),
        )
        .unwrap();

        match mailer.send(&filled().validate().unwrap()).await {
            Err(Error::MailError(message)) => assert!(message.contains("public key")),
            other => panic!("expected MailError, got {:?}", other),
        }
    }
}
