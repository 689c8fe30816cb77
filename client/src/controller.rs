// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! The client session and form controller.
//!
//! Holds everything the UI shows and runs one backend round trip per user
//! action. Every operation takes `&mut self`, so operations run one at a time
//! and each one reports into its own [`Operation`] slot.
use crate::api::ApiClient;
use crate::form::TaskForm;
use crate::session::Session;
use crate::status::{Operation, StatusBoard};

use common::{CurrentUser, Task};
use tracing::{debug, error, info, warn};

pub const MSG_EMAIL_REQUIRED: &str = "Please enter your email first.";
pub const MSG_EMAIL_AND_CODE_REQUIRED: &str = "Please enter both email and OTP code.";
pub const MSG_TOKEN_REQUIRED: &str = "Please log in or paste your access token first.";
pub const MSG_OTP_REQUESTED: &str = "OTP requested. Check your email.";

/// Where the user is in the OTP login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStage {
    #[default]
    Idle,
    OtpRequested,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Email,
    OtpCode,
    Token,
}

impl AuthField {
    pub fn next(self) -> Self {
        match self {
            AuthField::Email => AuthField::OtpCode,
            AuthField::OtpCode => AuthField::Token,
            AuthField::Token => AuthField::Email,
        }
    }
}

/// State of the login modal.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub otp_code: String,
    /// Manually pasted bearer token, applied with [`Controller::apply_token_input`].
    pub token_input: String,
    pub focus: AuthField,
    pub modal_open: bool,
    /// Hint shown after an OTP request.
    pub otp_info: Option<String>,
    pub stage: AuthStage,
}

pub struct Controller {
    api: ApiClient,
    session: Session,
    tasks: Vec<Task>,
    current_user: Option<CurrentUser>,
    status: StatusBoard,
    pub auth: AuthForm,
    pub form: TaskForm,
}

impl Controller {
    pub fn new(api: ApiClient, session: Session) -> Self {
        let auth = AuthForm {
            token_input: session.token().unwrap_or_default().to_string(),
            ..AuthForm::default()
        };

        Self {
            api,
            session,
            tasks: Vec::new(),
            current_user: None,
            status: StatusBoard::default(),
            auth,
            form: TaskForm::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn api_base_url(&self) -> &str {
        self.api.base_url()
    }

    #[cfg(test)]
    pub(crate) fn status_mut(&mut self) -> &mut StatusBoard {
        &mut self.status
    }

    /// Loads tasks and identity for a session restored from storage.
    pub async fn bootstrap(&mut self) {
        if self.session.is_authenticated() {
            info!("Resuming persisted session against {}", self.api.base_url());
            self.reload_session_data().await;
        }
    }

    /// Replaces the session token (empty logs out), then refetches the task
    /// list and the current user.
    pub async fn set_token(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.logout().await;
        } else {
            self.status.start(Operation::UpdateSession);
            if let Err(e) = self.session.login(value).await {
                error!("Failed to store the session token: {:?}", e);
                self.status.fail(Operation::UpdateSession, format!("{e:#}"));
                return;
            }
            self.status.succeed(Operation::UpdateSession);
        }

        self.reload_session_data().await;
    }

    /// Applies the token typed or pasted into the login modal.
    pub async fn apply_token_input(&mut self) {
        let value = self.auth.token_input.clone();
        self.set_token(&value).await;
    }

    /// Ends the session. Nothing shown for the previous account survives:
    /// token, identity, task list, OTP hint and per-account errors all go.
    pub async fn logout(&mut self) {
        self.current_user = None;
        self.tasks.clear();
        self.auth.stage = AuthStage::Idle;
        self.auth.token_input.clear();
        self.auth.otp_info = None;
        for op in [Operation::RequestOtp, Operation::LoginOtp, Operation::CreateTask] {
            self.status.clear(op);
        }

        self.status.start(Operation::UpdateSession);
        match self.session.logout().await {
            Ok(()) => self.status.succeed(Operation::UpdateSession),
            Err(e) => {
                error!("Failed to clear the persisted session: {:?}", e);
                self.status.fail(Operation::UpdateSession, format!("{e:#}"));
            }
        }
    }

    async fn reload_session_data(&mut self) {
        self.fetch_tasks().await;
        self.fetch_current_user().await;
    }

    /// Replaces the task list with the backend's. Does nothing without a token.
    pub async fn fetch_tasks(&mut self) {
        let Some(token) = self.session.token().map(str::to_string) else {
            debug!("No session token, not fetching tasks.");
            return;
        };

        self.status.start(Operation::FetchTasks);
        match self.api.list_tasks(&token).await {
            Ok(tasks) => {
                info!("Successfully retrieved {} tasks.", tasks.len());
                self.tasks = tasks;
                self.status.succeed(Operation::FetchTasks);
            }
            Err(e) => {
                error!("Failed to fetch tasks: {}", e);
                self.status.fail(Operation::FetchTasks, e.to_string());
            }
        }
    }

    /// Looks up who the token belongs to.
    ///
    /// Any failure, including an unreachable backend, ends the session. It is
    /// not reported as an error; the user simply appears logged out.
    pub async fn fetch_current_user(&mut self) {
        let Some(token) = self.session.token().map(str::to_string) else {
            self.current_user = None;
            return;
        };

        self.status.start(Operation::FetchCurrentUser);
        match self.api.current_user(&token).await {
            Ok(user) => {
                debug!("Session belongs to {} ({})", user.nickname, user.email);
                self.current_user = Some(user);
                self.auth.stage = AuthStage::Authenticated;
                self.status.succeed(Operation::FetchCurrentUser);
            }
            Err(e) => {
                if e.is_rejection() {
                    warn!("Session token rejected, logging out: {}", e);
                } else {
                    warn!("Identity check failed, logging out: {}", e);
                }
                self.status.clear(Operation::FetchCurrentUser);
                self.logout().await;
            }
        }
    }

    /// Asks the backend to issue a one-time code for the modal's email.
    pub async fn request_otp(&mut self) {
        let email = self.auth.email.trim().to_string();
        if email.is_empty() {
            self.status.fail(Operation::RequestOtp, MSG_EMAIL_REQUIRED);
            return;
        }

        self.status.start(Operation::RequestOtp);
        self.auth.otp_info = None;
        match self.api.request_otp(&email).await {
            Ok(issued) => {
                debug!(
                    "OTP requested for {} (new user: {:?})",
                    email, issued.user_created
                );
                self.auth.otp_info = Some(match issued.otp.filter(|otp| !otp.is_empty()) {
                    Some(otp) => format!("OTP (dev only): {otp}"),
                    None => MSG_OTP_REQUESTED.to_string(),
                });
                self.auth.stage = AuthStage::OtpRequested;
                self.status.succeed(Operation::RequestOtp);
            }
            Err(e) => {
                warn!("OTP request failed: {}", e);
                self.auth.stage = AuthStage::Idle;
                self.status.fail(Operation::RequestOtp, e.to_string());
            }
        }
    }

    /// Exchanges the modal's email and code for a session token.
    pub async fn login_with_otp(&mut self) {
        let email = self.auth.email.trim().to_string();
        let code = self.auth.otp_code.trim().to_string();
        if email.is_empty() || code.is_empty() {
            self.status.fail(Operation::LoginOtp, MSG_EMAIL_AND_CODE_REQUIRED);
            return;
        }

        self.status.start(Operation::LoginOtp);
        let token = match self.api.login_otp(&email, &code).await {
            Ok(token) => token,
            Err(e) => {
                warn!("OTP login failed: {}", e);
                self.auth.stage = AuthStage::Idle;
                self.status.fail(Operation::LoginOtp, e.to_string());
                return;
            }
        };

        if let Err(e) = self.session.login(&token.access_token).await {
            error!("Failed to store the session token: {:?}", e);
            self.auth.stage = AuthStage::Idle;
            self.status.fail(Operation::LoginOtp, format!("{e:#}"));
            return;
        }

        info!("Logged in with OTP.");
        self.auth.token_input = token.access_token;
        self.auth.otp_code.clear();
        self.auth.modal_open = false;
        self.auth.stage = AuthStage::Authenticated;
        self.status.succeed(Operation::LoginOtp);

        self.reload_session_data().await;
    }

    /// Submits the task form, then refetches the whole list.
    pub async fn create_task(&mut self) {
        let Some(payload) = self.form.submit() else {
            debug!("Task form has validation errors: {:?}", self.form.errors());
            // Field errors replace whatever the last attempt reported.
            self.status.clear(Operation::CreateTask);
            return;
        };

        let Some(token) = self.session.token().map(str::to_string) else {
            self.status.fail(Operation::CreateTask, MSG_TOKEN_REQUIRED);
            return;
        };

        self.status.start(Operation::CreateTask);
        match self.api.create_task(&token, &payload).await {
            Ok(task) => {
                info!("Task created successfully with ID: {}", task.id);
                self.form.reset();
                self.status.succeed(Operation::CreateTask);
                self.fetch_tasks().await;
            }
            Err(e) => {
                error!("Failed to create task: {}", e);
                self.status.fail(Operation::CreateTask, e.to_string());
            }
        }
    }

    pub fn open_auth_modal(&mut self) {
        self.auth.modal_open = true;
        self.auth.focus = AuthField::Email;
    }

    pub fn close_auth_modal(&mut self) {
        self.auth.modal_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormError, TaskField};
    use crate::storage::LocalStorage;

    // Nothing listens on port 9 locally; these tests never reach the network.
    async fn offline_controller() -> Controller {
        let storage = LocalStorage::open("sqlite::memory:").await.unwrap();
        let api = ApiClient::new("http://127.0.0.1:9", None).unwrap();
        Controller::new(api, Session::anonymous(storage))
    }

    #[tokio::test]
    async fn test_request_otp_requires_email() {
        let mut controller = offline_controller().await;
        controller.auth.email = "  ".to_string();

        controller.request_otp().await;

        assert_eq!(
            controller.status().error(Operation::RequestOtp),
            Some(MSG_EMAIL_REQUIRED)
        );
        assert_eq!(controller.auth.stage, AuthStage::Idle);
    }

    #[tokio::test]
    async fn test_login_requires_email_and_code() {
        let mut controller = offline_controller().await;
        controller.auth.email = "user@example.com".to_string();

        controller.login_with_otp().await;

        assert_eq!(
            controller.status().error(Operation::LoginOtp),
            Some(MSG_EMAIL_AND_CODE_REQUIRED)
        );
        assert!(controller.token().is_none());
    }

    #[tokio::test]
    async fn test_create_task_validates_before_token_check() {
        let mut controller = offline_controller().await;

        controller.create_task().await;

        assert!(!controller.form.errors().is_empty());
        // Validation failed first, so the token guard never ran.
        assert_eq!(controller.status().error(Operation::CreateTask), None);
    }

    #[tokio::test]
    async fn test_create_task_requires_token() {
        let mut controller = offline_controller().await;
        controller.form.title = "Buy milk".to_string();

        controller.create_task().await;

        assert_eq!(
            controller.status().error(Operation::CreateTask),
            Some(MSG_TOKEN_REQUIRED)
        );
        // The draft is kept so the user can retry after logging in.
        assert_eq!(controller.form.title, "Buy milk");
    }

    #[tokio::test]
    async fn test_invalid_form_replaces_previous_create_error() {
        let mut controller = offline_controller().await;
        controller.form.title = "Buy milk".to_string();
        controller.create_task().await;
        assert_eq!(
            controller.status().error(Operation::CreateTask),
            Some(MSG_TOKEN_REQUIRED)
        );

        controller.form.title.clear();
        controller.create_task().await;

        assert_eq!(controller.form.error_for(TaskField::Title), Some(&FormError::TitleRequired));
        assert_eq!(controller.status().error(Operation::CreateTask), None);
    }

    #[tokio::test]
    async fn test_logout_forgets_previous_account_state() {
        let mut controller = offline_controller().await;
        controller.auth.otp_info = Some("OTP (dev only): 123456".to_string());
        controller.status_mut().fail(Operation::UpdateSession, "disk full");
        controller.status_mut().fail(Operation::LoginOtp, "Invalid OTP code.");
        controller.status_mut().fail(Operation::CreateTask, MSG_TOKEN_REQUIRED);
        controller.status_mut().fail(Operation::FetchTasks, "Request failed with status code 500");

        controller.logout().await;

        assert_eq!(controller.auth.otp_info, None);
        assert_eq!(controller.status().error(Operation::UpdateSession), None);
        assert!(!controller.status().is_loading(Operation::UpdateSession));
        assert_eq!(controller.status().error(Operation::LoginOtp), None);
        assert_eq!(controller.status().error(Operation::CreateTask), None);
        // Backend failures are not tied to the account and stay visible.
        assert!(controller.status().error(Operation::FetchTasks).is_some());
    }

    #[tokio::test]
    async fn test_modal_open_and_close() {
        let mut controller = offline_controller().await;
        controller.auth.focus = AuthField::Token;

        controller.open_auth_modal();
        assert!(controller.auth.modal_open);
        assert_eq!(controller.auth.focus, AuthField::Email);

        controller.close_auth_modal();
        assert!(!controller.auth.modal_open);
    }

    #[test]
    fn test_auth_field_cycles() {
        assert_eq!(AuthField::Email.next(), AuthField::OtpCode);
        assert_eq!(AuthField::OtpCode.next(), AuthField::Token);
        assert_eq!(AuthField::Token.next(), AuthField::Email);
    }
}
