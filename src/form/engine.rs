//! FormEngine: runs one event through the questionnaire for one user.
//!
//! Loads the session, resolves commands, validates answers against the
//! current step and persists the result, all under the user's lock.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{DatabaseError, Error, ValidationError};
use crate::i18n::{Localizer, MessageKey, Translations};
use crate::store::{ProfileStore, SessionStore};

use super::event::{Command, FormEvent};
use super::locks::UserLocks;
use super::reply::{self, Reply};
use super::state::{FormSession, FormStep};
use super::validate;

/// What an event did to the user's form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A new session was created at the first step.
    Started,
    /// An answer was accepted and the session moved on.
    Advanced { from: FormStep, to: FormStep },
    /// An answer was rejected; the session is unchanged.
    Rejected {
        step: FormStep,
        error: ValidationError,
    },
    /// A command arrived mid-form; the current prompt was repeated.
    Reprompted { step: FormStep },
    /// The last answer was accepted and the profile written.
    Completed,
    /// The session was discarded.
    Cancelled,
    /// Informational reply, nothing stored changed.
    Idle,
}

/// Outcome of [`FormEngine::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handled {
    pub transition: Transition,
    pub replies: Vec<Reply>,
}

impl Handled {
    fn new(transition: Transition, replies: Vec<Reply>) -> Self {
        Self {
            transition,
            replies,
        }
    }

    fn idle(reply: Reply) -> Self {
        Self::new(Transition::Idle, vec![reply])
    }
}

/// Drives the questionnaire over injected session and profile stores.
pub struct FormEngine {
    sessions: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileStore>,
    translations: Arc<Translations>,
    locks: UserLocks,
}

impl FormEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        profiles: Arc<dyn ProfileStore>,
        translations: Arc<Translations>,
    ) -> Self {
        Self {
            sessions,
            profiles,
            translations,
            locks: UserLocks::new(),
        }
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Handle one inbound event for `user_id`.
    ///
    /// `language` is the user's language code as reported by the channel.
    /// Store failures propagate; the session is then left as it was.
    pub async fn handle(
        &self,
        user_id: &str,
        language: Option<&str>,
        event: &FormEvent,
    ) -> Result<Handled, Error> {
        let _guard = self.locks.acquire(user_id).await;
        let l = self.translations.localize(language);
        let session = self.load_session(user_id).await?;

        debug!(
            user_id,
            event = event.kind(),
            step = ?session.as_ref().map(|s| s.step),
            "Handling form event"
        );

        let handled = match (event, session) {
            (FormEvent::Command { command }, session) => {
                self.on_command(user_id, *command, session, &l).await?
            }
            (_, None) => Handled::idle(Reply::text(l.get(MessageKey::NotUnderstood))),
            (event, Some(session)) => self.on_answer(user_id, session, event, &l).await?,
        };
        Ok(handled)
    }

    /// Current session, discarding a stored one that can no longer be
    /// decoded so the user can start over.
    async fn load_session(&self, user_id: &str) -> Result<Option<FormSession>, Error> {
        match self.sessions.get_session(user_id).await {
            Ok(session) => Ok(session),
            Err(DatabaseError::Serialization(reason)) => {
                warn!(user_id, %reason, "Stored session is unreadable, discarding");
                self.sessions.clear_session(user_id).await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn on_command(
        &self,
        user_id: &str,
        command: Command,
        session: Option<FormSession>,
        l: &Localizer<'_>,
    ) -> Result<Handled, Error> {
        let session = match (command, session) {
            (Command::Cancel, Some(_)) => {
                self.sessions.clear_session(user_id).await?;
                info!(user_id, "Form cancelled");
                return Ok(Handled::new(
                    Transition::Cancelled,
                    vec![Reply::text(l.get(MessageKey::CancelActive))],
                ));
            }
            (_, Some(session)) => session,
            (Command::Cancel, None) => {
                return Ok(Handled::idle(Reply::text(l.get(MessageKey::CancelIdle))));
            }
            (Command::Start, None) => {
                return Ok(Handled::idle(Reply::text(l.get(MessageKey::Start))));
            }
            (Command::FillForm, None) => {
                self.sessions
                    .set_session(user_id, &FormSession::begin())
                    .await?;
                info!(user_id, "Form started");
                return Ok(Handled::new(
                    Transition::Started,
                    vec![Reply::text(l.get(MessageKey::FillForm))],
                ));
            }
            (Command::ShowData, None) => return self.show_data(user_id, l).await,
        };

        debug!(user_id, %command, step = %session.step, "Command mid-form, re-prompting");
        Ok(Handled::new(
            Transition::Reprompted { step: session.step },
            vec![step_prompt(session.step, l.get(session.step.retry_key()), l)],
        ))
    }

    async fn show_data(&self, user_id: &str, l: &Localizer<'_>) -> Result<Handled, Error> {
        let reply = match self.profiles.get_profile(user_id).await? {
            Some(profile) => Reply::Photo {
                file_id: profile.photo.file_id.clone(),
                caption: profile.summary(l),
            },
            None => Reply::text(l.get(MessageKey::NoProfile)),
        };
        Ok(Handled::idle(reply))
    }

    async fn on_answer(
        &self,
        user_id: &str,
        mut session: FormSession,
        event: &FormEvent,
        l: &Localizer<'_>,
    ) -> Result<Handled, Error> {
        let step = session.step;
        let value = match validate::accept(step, event) {
            Ok(value) => value,
            Err(error) => {
                info!(user_id, %step, %error, "Answer rejected");
                return Ok(Handled::new(
                    Transition::Rejected { step, error },
                    vec![step_prompt(step, l.get(error.retry_key()), l)],
                ));
            }
        };

        session.draft.apply(value);

        let Some(to) = session.advance() else {
            return self.complete(user_id, session, l).await;
        };

        self.sessions.set_session(user_id, &session).await?;
        info!(user_id, from = %step, %to, "Form advanced");
        Ok(Handled::new(
            Transition::Advanced { from: step, to },
            vec![confirmation(step, l)],
        ))
    }

    async fn complete(
        &self,
        user_id: &str,
        session: FormSession,
        l: &Localizer<'_>,
    ) -> Result<Handled, Error> {
        let Some(profile) = session.draft.complete(Utc::now()) else {
            warn!(user_id, "Session reached the last step with missing answers, discarding");
            self.sessions.clear_session(user_id).await?;
            return Ok(Handled::new(
                Transition::Cancelled,
                vec![Reply::text(l.get(MessageKey::InternalError))],
            ));
        };

        self.profiles.set_profile(user_id, &profile).await?;
        self.sessions.clear_session(user_id).await?;
        info!(user_id, "Form completed");

        Ok(Handled::new(
            Transition::Completed,
            vec![
                confirmation(session.step, l),
                Reply::text(l.get(MessageKey::ShowDataHint)),
            ],
        ))
    }
}

/// `text` with the options of `step` attached, when it has any.
fn step_prompt(step: FormStep, text: &str, l: &Localizer<'_>) -> Reply {
    match step {
        FormStep::FillGender => Reply::with_choices(text, reply::gender_choices(l)),
        FormStep::FillEducation => Reply::with_choices(text, reply::education_choices(l)),
        FormStep::FillWishNews => Reply::with_choices(text, reply::wish_news_choices(l)),
        FormStep::FillName | FormStep::FillAge | FormStep::UploadPhoto => Reply::text(text),
    }
}

/// Thanks for the answer to `answered`, carrying the next step's options.
/// The last step has none, so its thanks is the first completion reply.
fn confirmation(answered: FormStep, l: &Localizer<'_>) -> Reply {
    match answered {
        FormStep::FillName => Reply::text(l.get(MessageKey::ThankName)),
        FormStep::FillAge => {
            Reply::with_choices(l.get(MessageKey::ThankAge), reply::gender_choices(l))
        }
        FormStep::FillGender => Reply::text(l.get(MessageKey::ThankGender)),
        FormStep::UploadPhoto => {
            Reply::with_choices(l.get(MessageKey::ThankPhoto), reply::education_choices(l))
        }
        FormStep::FillEducation => Reply::with_choices(
            l.get(MessageKey::ThankEducation),
            reply::wish_news_choices(l),
        ),
        FormStep::FillWishNews => Reply::text(l.get(MessageKey::ThankNews)),
    }
}
