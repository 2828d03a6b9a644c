//! Explicit session context shared by the guard, the client and login flows.

use crate::session_fsm::{SessionMachine, SessionMachineInput, SessionState};
use crate::{GuardResult, LoginProvider, UserProfile, UserStore};
use chrono::{DateTime, Utc};
use hub_session_store::{SessionVault, TokenSet};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Why a session was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    Logout,
    /// The backend answered with an unauthorized error body.
    Unauthorized,
    RefreshReturnedNothing,
    StaleTokenWithoutUser,
    /// A user was present but no token was stored.
    MissingToken,
    /// A stale token and user were present but the provider was unknown.
    MissingProvider,
    Restore,
}

impl ClearReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearReason::Logout => "logout",
            ClearReason::Unauthorized => "unauthorized",
            ClearReason::RefreshReturnedNothing => "refresh_returned_nothing",
            ClearReason::StaleTokenWithoutUser => "stale_token_without_user",
            ClearReason::MissingToken => "missing_token",
            ClearReason::MissingProvider => "missing_provider",
            ClearReason::Restore => "restore",
        }
    }
}

/// Side effects the rest of the application may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    StateChanged(SessionState),
    SessionCleared { reason: ClearReason },
    /// Ask the user whether to log in again.
    LoginPromptRequested,
}

/// Receives [`GuardEvent`]s. Must not call back into the context.
pub type GuardEventCallback = Box<dyn Fn(GuardEvent) + Send + Sync>;

/// Point-in-time view of the session for display.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub user: Option<UserProfile>,
    pub provider: Option<LoginProvider>,
    pub has_token: bool,
    pub expire_at: Option<DateTime<Utc>>,
}

/// The session: persisted record, in-memory user/provider and lifecycle state.
///
/// Created once at startup, shared behind an `Arc`, cleared on logout.
pub struct SessionContext {
    vault: SessionVault,
    users: UserStore,
    fsm: Mutex<SessionMachine>,
    event_callback: Mutex<Option<GuardEventCallback>>,
    /// Bumped whenever the session is replaced or cleared. Writes that were
    /// started against an older epoch are dropped.
    epoch: Mutex<u64>,
}

impl SessionContext {
    /// An empty, logged-out context over `vault`. Nothing is read from storage.
    pub fn new(vault: SessionVault) -> Self {
        Self {
            vault,
            users: UserStore::new(),
            fsm: Mutex::new(SessionMachine::new()),
            event_callback: Mutex::new(None),
            epoch: Mutex::new(0),
        }
    }

    /// Rehydrate user and provider from the persisted record.
    ///
    /// Unreadable user or provider entries are ignored with a warning; the
    /// guard resolves any resulting inconsistency on the next request.
    pub fn bootstrap(vault: SessionVault) -> GuardResult<Self> {
        let context = Self::new(vault);

        match context.vault.get_user_json::<UserProfile>() {
            Ok(Some(user)) => context.users.set_user(user),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "ignoring unreadable stored user"),
        }

        if let Some(raw) = context.vault.get_provider()? {
            match raw.parse::<LoginProvider>() {
                Ok(provider) => context.users.set_provider(provider),
                Err(e) => warn!(error = %e, "ignoring unknown stored provider"),
            }
        }

        let has_token = context.vault.get_jwt()?.is_some();
        if has_token && context.users.is_logged_in() {
            context.transition(&SessionMachineInput::LoginSuccess);
        }

        debug!(
            logged_in = context.users.is_logged_in(),
            provider = ?context.users.provider(),
            has_token,
            "session context bootstrapped"
        );

        Ok(context)
    }

    pub fn vault(&self) -> &SessionVault {
        &self.vault
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn set_event_callback(&self, callback: GuardEventCallback) {
        *self.event_callback.lock() = Some(callback);
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(self.fsm.lock().state())
    }

    /// Record a successful login: persist everything and mark the session live.
    pub fn establish(
        &self,
        provider: LoginProvider,
        user: UserProfile,
        tokens: &TokenSet,
    ) -> GuardResult<()> {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        self.vault.set_tokens(tokens)?;
        self.vault.set_provider(provider.as_str())?;
        self.vault.set_user_json(&user)?;
        drop(epoch);

        info!(
            provider = %provider,
            user_id = user.id.as_deref().unwrap_or("-"),
            expire_at = %tokens.expire_at,
            "session established"
        );

        self.users.set_user(user);
        self.users.set_provider(provider);
        self.transition(&SessionMachineInput::LoginSuccess);
        Ok(())
    }

    /// Replace the persisted tokens after a refresh.
    pub fn store_tokens(&self, tokens: &TokenSet) -> GuardResult<()> {
        let _epoch = self.epoch.lock();
        self.vault.set_tokens(tokens)?;
        Ok(())
    }

    /// Current session epoch, captured before a refresh starts.
    pub(crate) fn epoch(&self) -> u64 {
        *self.epoch.lock()
    }

    /// Store refreshed tokens unless the session was cleared or replaced
    /// since `epoch`. Returns whether they were stored.
    pub(crate) fn store_tokens_if_current(
        &self,
        tokens: &TokenSet,
        epoch: u64,
    ) -> GuardResult<bool> {
        let current = self.epoch.lock();
        if *current != epoch {
            debug!(epoch, current = *current, "dropping tokens for a superseded session");
            return Ok(false);
        }
        self.vault.set_tokens(tokens)?;
        Ok(true)
    }

    /// Drop the session: in-memory user and provider plus every persisted key.
    ///
    /// In-memory state is cleared and the event emitted even when storage
    /// fails; the storage error is still returned.
    pub fn clear(&self, reason: ClearReason) -> GuardResult<()> {
        let epoch = self.epoch.lock();
        self.clear_locked(epoch, reason)
    }

    /// [`clear`](Self::clear), unless the session already moved past `epoch`.
    pub(crate) fn clear_if_current(&self, reason: ClearReason, epoch: u64) -> GuardResult<bool> {
        let current = self.epoch.lock();
        if *current != epoch {
            debug!(reason = reason.as_str(), "session already superseded, not clearing");
            return Ok(false);
        }
        self.clear_locked(current, reason).map(|()| true)
    }

    fn clear_locked(&self, mut epoch: MutexGuard<'_, u64>, reason: ClearReason) -> GuardResult<()> {
        *epoch += 1;
        self.users.clear_user();
        self.users.clear_provider();
        let result = self.vault.clear_all();
        drop(epoch);

        info!(reason = reason.as_str(), "session cleared");
        self.transition(&SessionMachineInput::SessionCleared);
        self.emit(GuardEvent::SessionCleared { reason });

        result.map_err(Into::into)
    }

    pub fn request_login_prompt(&self) {
        debug!("login prompt requested");
        self.emit(GuardEvent::LoginPromptRequested);
    }

    pub fn snapshot(&self) -> GuardResult<SessionSnapshot> {
        Ok(SessionSnapshot {
            state: self.state(),
            user: self.users.user(),
            provider: self.users.provider(),
            has_token: self.vault.get_jwt()?.is_some(),
            expire_at: self.vault.get_expire_at()?,
        })
    }

    /// Feed the lifecycle machine. Rejected transitions are logged and ignored.
    pub(crate) fn transition(&self, input: &SessionMachineInput) -> SessionState {
        let mut fsm = self.fsm.lock();
        let old_state = SessionState::from(fsm.state());

        if fsm.consume(input).is_err() {
            debug!(input = ?input, state = ?old_state, "ignoring session transition");
            return old_state;
        }

        let new_state = SessionState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "session state transition"
            );
            self.emit(GuardEvent::StateChanged(new_state));
        }

        new_state
    }

    fn emit(&self, event: GuardEvent) {
        if let Some(callback) = self.event_callback.lock().as_ref() {
            callback(event);
        }
    }
}
