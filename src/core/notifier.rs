use crate::config::mail::MailConfig;
use crate::domain::model::{NotificationOutcome, NotificationRequest, OutboundMessage};
use crate::domain::ports::{MailCredentials, MailRelay, MailSession};
use crate::utils::error::{PortfolioError, Result};
use crate::utils::validation::validate_email;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

pub const REQUIRED_FIELDS_MESSAGE: &str = "All fields are required";
pub const INVALID_EMAIL_MESSAGE: &str = "Please provide a valid email address";
pub const SUBJECT_PREFIX: &str = "New Contact Form Submission: ";

/// 聯絡表單寄送流程的狀態；每一步只能前進或直接結束
enum DispatchState {
    Init,
    ValidateInput,
    ValidateConfig,
    OpenTransport(MailCredentials),
    VerifyTransport(Box<dyn MailSession>),
    Send(Box<dyn MailSession>),
    Done(NotificationOutcome),
}

impl DispatchState {
    fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ValidateInput => "validate-input",
            Self::ValidateConfig => "validate-config",
            Self::OpenTransport(_) => "open-transport",
            Self::VerifyTransport(_) => "verify-transport",
            Self::Send(_) => "send",
            Self::Done(_) => "done",
        }
    }
}

pub struct NotificationDispatcher<R: MailRelay> {
    relay: R,
    config: MailConfig,
    sequence: AtomicU64,
}

impl<R: MailRelay> NotificationDispatcher<R> {
    pub fn new(relay: R, config: MailConfig) -> Self {
        Self {
            relay,
            config,
            sequence: AtomicU64::new(0),
        }
    }

    pub async fn dispatch(&self, request: &NotificationRequest) -> NotificationOutcome {
        let mut state = DispatchState::Init;
        loop {
            if let DispatchState::Done(outcome) = state {
                return outcome;
            }
            tracing::debug!("Contact dispatch step: {}", state.name());
            state = self.step(state, request).await;
        }
    }

    async fn step(&self, state: DispatchState, request: &NotificationRequest) -> DispatchState {
        match state {
            DispatchState::Init => DispatchState::ValidateInput,

            DispatchState::ValidateInput => match validate_request(request) {
                Ok(()) => DispatchState::ValidateConfig,
                Err(message) => {
                    tracing::info!("Contact submission rejected: {}", message);
                    DispatchState::Done(NotificationOutcome::ValidationError { message })
                }
            },

            DispatchState::ValidateConfig => match self.config.credentials() {
                Ok(credentials) => DispatchState::OpenTransport(credentials),
                Err(e) => {
                    tracing::error!("❌ Mail configuration error: {}", e);
                    DispatchState::Done(NotificationOutcome::ConfigurationError)
                }
            },

            DispatchState::OpenTransport(credentials) => {
                match self.relay.connect(&credentials).await {
                    Ok(session) => DispatchState::VerifyTransport(session),
                    Err(e) => {
                        tracing::error!("❌ Could not open mail transport: {}", e);
                        DispatchState::Done(NotificationOutcome::TransportError {
                            retryable: false,
                        })
                    }
                }
            }

            DispatchState::VerifyTransport(session) => match session.verify().await {
                Ok(()) => DispatchState::Send(session),
                Err(e) => {
                    tracing::error!("❌ Mail transport verification failed: {}", e);
                    DispatchState::Done(NotificationOutcome::TransportError { retryable: false })
                }
            },

            DispatchState::Send(session) => {
                let message = self.compose(request);
                match session.send(&message).await {
                    Ok(message_id) => {
                        tracing::info!("✅ Contact message sent ({})", message_id);
                        DispatchState::Done(NotificationOutcome::Sent { message_id })
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Sending contact message failed: {}", e);
                        DispatchState::Done(NotificationOutcome::TransportError {
                            retryable: true,
                        })
                    }
                }
            }

            done @ DispatchState::Done(_) => done,
        }
    }

    fn compose(&self, request: &NotificationRequest) -> OutboundMessage {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let domain = self
            .config
            .username
            .as_deref()
            .and_then(|u| u.split_once('@').map(|(_, d)| d))
            .unwrap_or("localhost");
        let message_id = format!(
            "<{}.{}@{}>",
            Utc::now().timestamp_micros(),
            sequence,
            domain
        );

        OutboundMessage {
            message_id,
            from_name: self.config.sender_name.clone(),
            from_address: self.config.username.clone().unwrap_or_default(),
            to: self.config.recipient.clone(),
            reply_to: request.email.trim().to_string(),
            subject: format!("{}{}", SUBJECT_PREFIX, request.subject.trim()),
            html_body: render_html(request),
        }
    }
}

fn validate_request(request: &NotificationRequest) -> std::result::Result<(), String> {
    let fields = [
        &request.name,
        &request.email,
        &request.subject,
        &request.message,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(REQUIRED_FIELDS_MESSAGE.to_string());
    }
    if validate_email("email", &request.email).is_err() {
        return Err(INVALID_EMAIL_MESSAGE.to_string());
    }
    Ok(())
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 固定的 HTML 範本，訊息中的換行轉成 `<br>`
pub fn render_html(request: &NotificationRequest) -> String {
    let message = escape_html(request.message.trim())
        .replace("\r\n", "\n")
        .replace('\n', "<br>");

    format!(
        "<h2>New Contact Form Submission</h2>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Subject:</strong> {}</p>\n\
         <p><strong>Message:</strong></p>\n\
         <p>{}</p>\n",
        escape_html(request.name.trim()),
        escape_html(request.email.trim()),
        escape_html(request.subject.trim()),
        message
    )
}

/// 單一表單實例：送出期間拒絕重複送出，成功後清空欄位
#[derive(Default)]
pub struct ContactForm {
    fields: Mutex<NotificationRequest>,
    submitting: AtomicBool,
}

struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ContactForm {
    pub fn new(fields: NotificationRequest) -> Self {
        Self {
            fields: Mutex::new(fields),
            submitting: AtomicBool::new(false),
        }
    }

    pub async fn update(&self, fields: NotificationRequest) -> Result<()> {
        if self.is_submitting() {
            return Err(PortfolioError::SubmissionInFlight);
        }
        *self.fields.lock().await = fields;
        Ok(())
    }

    pub async fn fields(&self) -> NotificationRequest {
        self.fields.lock().await.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub async fn submit<R: MailRelay>(
        &self,
        dispatcher: &NotificationDispatcher<R>,
    ) -> Result<NotificationOutcome> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PortfolioError::SubmissionInFlight);
        }
        let _guard = SubmittingGuard(&self.submitting);

        let request = self.fields.lock().await.clone();
        let outcome = dispatcher.dispatch(&request).await;
        if matches!(outcome, NotificationOutcome::Sent { .. }) {
            self.fields.lock().await.clear();
        }
        Ok(outcome)
    }
}
