use anyhow::Result;

/// Fallback reply shown when the chat request fails for any reason.
pub const ERROR_REPLY: &str = "Sorry, there was an error contacting the server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

/// Credential issued by the identity provider on successful sign-in.
///
/// Opaque to this client: it is held in memory for the session and handed
/// back to the provider on revocation. It is never attached to chat
/// requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
}

/// Conversation state machine: append-only message log, optional
/// credential, and the single-request pending gate.
///
/// All transitions are synchronous and side-effect free so the machine can
/// be driven (and tested) without any rendering or network layer. The
/// caller dispatches the actual request when `begin_request` accepts a
/// submission and feeds the outcome back through `complete_request`.
pub struct ChatSession {
    messages: Vec<Message>,
    credential: Option<Credential>,
    pending: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            credential: None,
            pending: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether a submission with this input would be accepted right now.
    /// Mirrors the enabled state of the send control.
    pub fn can_submit(&self, input: &str) -> bool {
        self.credential.is_some() && !self.pending && !input.trim().is_empty()
    }

    /// Accept a submission: append the user message and raise the pending
    /// flag. Returns the text to dispatch, or `None` if the submission is
    /// rejected (unauthenticated, request already outstanding, or blank
    /// after trimming). The message keeps the literal text as typed; only
    /// the blank check trims.
    pub fn begin_request(&mut self, input: &str) -> Option<String> {
        if !self.can_submit(input) {
            return None;
        }
        self.messages.push(Message {
            sender: Sender::User,
            text: input.to_string(),
        });
        self.pending = true;
        Some(input.to_string())
    }

    /// Record the outcome of the outstanding request. A success appends the
    /// reply text; any failure appends the fixed fallback reply. Either way
    /// the pending flag drops and the session returns to idle.
    ///
    /// Appends even if the user signed out while the request was in flight;
    /// the conversation is merely hidden, not cleared, by sign-out.
    pub fn complete_request(&mut self, result: Result<String>) {
        let text = result.unwrap_or_else(|_| ERROR_REPLY.to_string());
        self.messages.push(Message {
            sender: Sender::Bot,
            text,
        });
        self.pending = false;
    }

    /// Login callback: store the credential. The conversation view becomes
    /// reachable once this has run.
    pub fn login_succeeded(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    /// Login failures are swallowed: no state change, no user feedback.
    pub fn login_failed(&mut self) {}

    /// Drop the credential and hand it back so the caller can notify the
    /// provider (token revocation). The message log is kept.
    pub fn sign_out(&mut self) -> Option<Credential> {
        self.credential.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn signed_in_session() -> ChatSession {
        let mut session = ChatSession::new();
        session.login_succeeded(Credential {
            token: "tok123".to_string(),
        });
        session
    }

    #[test]
    fn unauthenticated_submit_is_rejected() {
        let mut session = ChatSession::new();
        assert!(!session.can_submit("hello"));
        assert_eq!(session.begin_request("hello"), None);
        assert!(session.messages().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn whitespace_only_input_is_a_noop() {
        let mut session = signed_in_session();
        for input in ["", " ", "   ", "\t", " \n "] {
            assert_eq!(session.begin_request(input), None);
        }
        assert!(session.messages().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn submitted_text_is_kept_verbatim() {
        let mut session = signed_in_session();
        let dispatched = session.begin_request("  hello there  ").unwrap();
        // Only the blank check trims; the message and request body carry
        // the text exactly as typed.
        assert_eq!(dispatched, "  hello there  ");
        assert_eq!(session.messages()[0].text, "  hello there  ");
        assert_eq!(session.messages()[0].sender, Sender::User);
    }

    #[test]
    fn successful_reply_is_appended_and_pending_clears() {
        let mut session = signed_in_session();
        session.begin_request("hello").unwrap();
        assert!(session.is_pending());

        session.complete_request(Ok("hi there".to_string()));

        assert_eq!(
            session.messages(),
            &[
                Message {
                    sender: Sender::User,
                    text: "hello".to_string()
                },
                Message {
                    sender: Sender::Bot,
                    text: "hi there".to_string()
                },
            ]
        );
        assert!(!session.is_pending());
    }

    #[test]
    fn failed_request_appends_fallback_reply() {
        let mut session = signed_in_session();
        session.begin_request("ping").unwrap();

        session.complete_request(Err(anyhow!("connection refused")));

        assert_eq!(session.messages()[1].sender, Sender::Bot);
        assert_eq!(session.messages()[1].text, ERROR_REPLY);
        assert!(!session.is_pending());
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut session = signed_in_session();
        session.begin_request("first").unwrap();

        assert_eq!(session.begin_request("second"), None);
        assert_eq!(session.messages().len(), 1);

        // Still accepts exactly one completion for the outstanding request.
        session.complete_request(Ok("reply".to_string()));
        assert_eq!(session.messages().len(), 2);
        assert!(session.can_submit("third"));
    }

    #[test]
    fn login_and_sign_out_transitions() {
        let mut session = ChatSession::new();
        assert!(!session.is_authenticated());

        session.login_succeeded(Credential {
            token: "tok123".to_string(),
        });
        assert!(session.is_authenticated());

        let revoked = session.sign_out().unwrap();
        assert_eq!(revoked.token, "tok123");
        assert!(!session.is_authenticated());
        assert!(session.sign_out().is_none());
    }

    #[test]
    fn login_failure_leaves_state_untouched() {
        let mut session = ChatSession::new();
        session.login_failed();
        assert!(!session.is_authenticated());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn conversation_survives_sign_out() {
        let mut session = signed_in_session();
        session.begin_request("hello").unwrap();
        session.sign_out();

        // A reply that lands after sign-out still gets recorded.
        session.complete_request(Ok("late reply".to_string()));
        assert_eq!(session.messages().len(), 2);
        assert!(!session.is_pending());
    }

    #[test]
    fn messages_keep_insertion_order() {
        let mut session = signed_in_session();
        for i in 0..3 {
            session.begin_request(&format!("question {i}")).unwrap();
            session.complete_request(Ok(format!("answer {i}")));
        }
        let texts: Vec<&str> = session.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "question 0",
                "answer 0",
                "question 1",
                "answer 1",
                "question 2",
                "answer 2"
            ]
        );
    }
}
