use anyhow::Result;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::auth::{DeviceAuthorization, GoogleAuth};
use crate::chat::ChatClient;
use crate::config::Config;
use crate::session::{ChatSession, Credential};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: ChatSession,

    // Input buffer state
    pub input: String,
    pub input_cursor: usize, // cursor position in input (chars)

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // In-flight work
    pub chat_task: Option<JoinHandle<Result<String>>>,
    pub device_task: Option<JoinHandle<Result<DeviceAuthorization>>>,
    pub login_task: Option<JoinHandle<Result<Credential>>>,
    pub device_prompt: Option<DeviceAuthorization>,

    // Chat panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Clients
    pub chat_client: ChatClient,
    pub auth: Option<GoogleAuth>,
}

impl App {
    pub fn new() -> Self {
        // Load config
        let config = Config::load().unwrap_or_else(|_| Config::new());

        let chat_client = ChatClient::new(&config.backend_url());

        // Sign-in needs both halves of the OAuth client registration
        let auth = match (config.client_id(), config.client_secret()) {
            (Some(id), Some(secret)) => Some(GoogleAuth::new(&id, &secret)),
            _ => None,
        };

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            session: ChatSession::new(),

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            chat_task: None,
            device_task: None,
            login_task: None,
            device_prompt: None,

            chat_area: None,

            chat_client,
            auth,
        }
    }

    /// Submit the input buffer. The session gate rejects blank input and
    /// anything typed while a request is outstanding; on acceptance the
    /// buffer is cleared and exactly one request task is spawned.
    pub fn submit_message(&mut self) {
        if let Some(text) = self.session.begin_request(&self.input) {
            self.input.clear();
            self.input_cursor = 0;
            self.scroll_to_bottom();

            let client = self.chat_client.clone();
            self.chat_task = Some(tokio::spawn(async move { client.send(&text).await }));
        }
    }

    /// Kick off the device sign-in flow: fetch the code/URL prompt first,
    /// then (once that lands) poll for the user's approval.
    pub fn start_login(&mut self) {
        if self.session.is_authenticated() || self.login_in_progress() {
            return;
        }
        if let Some(auth) = self.auth.clone() {
            self.device_task = Some(tokio::spawn(async move {
                auth.request_device_code().await
            }));
        }
    }

    pub fn login_in_progress(&self) -> bool {
        self.device_task.is_some() || self.login_task.is_some()
    }

    /// Drop the credential and notify the provider in the background. The
    /// conversation stays in memory; only the view hides it.
    pub fn sign_out(&mut self) {
        if let Some(credential) = self.session.sign_out() {
            if let Some(auth) = self.auth.clone() {
                tokio::spawn(async move {
                    let _ = auth.revoke(&credential).await;
                });
            }
        }
        self.device_prompt = None;
        self.input_mode = InputMode::Normal;
    }

    /// Join any finished background task and feed its outcome into the
    /// session. Called once per event-loop iteration.
    pub async fn poll_tasks(&mut self) {
        let chat_done = self.chat_task.as_ref().map(|t| t.is_finished()).unwrap_or(false);
        if chat_done {
            if let Some(task) = self.chat_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow::anyhow!("chat task failed: {}", e)),
                };
                self.session.complete_request(result);
                self.scroll_to_bottom();
            }
        }

        let device_done = self.device_task.as_ref().map(|t| t.is_finished()).unwrap_or(false);
        if device_done {
            if let Some(task) = self.device_task.take() {
                match task.await {
                    Ok(Ok(prompt)) => {
                        if let Some(auth) = self.auth.clone() {
                            let authorization = prompt.clone();
                            self.login_task = Some(tokio::spawn(async move {
                                auth.poll_for_credential(&authorization).await
                            }));
                        }
                        self.device_prompt = Some(prompt);
                    }
                    // Login failures are swallowed by contract
                    _ => self.session.login_failed(),
                }
            }
        }

        let login_done = self.login_task.as_ref().map(|t| t.is_finished()).unwrap_or(false);
        if login_done {
            if let Some(task) = self.login_task.take() {
                match task.await {
                    Ok(Ok(credential)) => self.session.login_succeeded(credential),
                    _ => self.session.login_failed(),
                }
                self.device_prompt = None;
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() || self.login_task.is_some() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    /// Scroll the chat so the newest entry (and the typing indicator, when
    /// a request is outstanding) is visible.
    pub fn scroll_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.messages() {
            total_lines += 1; // Sender line ("You:" or "Bot:")
            // Calculate wrapped lines for each line of content
            for line in msg.text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.session.is_pending() {
            total_lines += 2; // "Bot:" + typing indicator
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }
}
