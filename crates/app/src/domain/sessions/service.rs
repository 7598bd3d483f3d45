//! Checkout Sessions Service

use async_trait::async_trait;
use grocer::sessions::{CustomerDetails, SessionTimeline, TerminalAction};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, debug, info, warn};

use crate::{
    database::Db,
    domain::{
        sessions::{
            SessionsServiceError,
            data::{MAX_SESSION_LIST, NewSession, SessionFilter, SessionUpdate, TerminalUpdate},
            records::{SessionRecord, SessionSummary, SessionUuid},
            repository::PgSessionsRepository,
        },
        visitors::repository::PgVisitorsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgSessionsService {
    db: Db,
    sessions: PgSessionsRepository,
    visitors: PgVisitorsRepository,
}

impl PgSessionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            sessions: PgSessionsRepository::new(),
            visitors: PgVisitorsRepository::new(),
        }
    }
}

#[async_trait]
impl SessionsService for PgSessionsService {
    #[tracing::instrument(
        name = "sessions.service.create_session",
        skip(self, session),
        fields(session_uuid = %session.uuid, visitor_uuid = tracing::field::Empty),
        err
    )]
    async fn create_session(
        &self,
        session: NewSession,
    ) -> Result<SessionRecord, SessionsServiceError> {
        let mut tx = self.db.begin().await?;

        let visitor = self
            .visitors
            .find_by_token(&mut tx, session.visitor_token.trim())
            .await?
            .ok_or(SessionsServiceError::VisitorNotFound)?;

        Span::current().record("visitor_uuid", tracing::field::display(visitor.uuid));

        let record = self
            .sessions
            .create_session(&mut tx, visitor.uuid, session)
            .await?;

        tx.commit().await?;

        info!(session_uuid = %record.uuid, visitor_uuid = %visitor.uuid, "created checkout session");

        Ok(record)
    }

    #[tracing::instrument(
        name = "sessions.service.get_session",
        skip(self),
        fields(session_uuid = %session),
        err
    )]
    async fn get_session(&self, session: SessionUuid) -> Result<SessionRecord, SessionsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.sessions.get_session(&mut tx, session).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "sessions.service.update_session",
        skip(self, update),
        fields(session_uuid = %session),
        err
    )]
    async fn update_session(
        &self,
        session: SessionUuid,
        update: SessionUpdate,
    ) -> Result<SessionRecord, SessionsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.sessions.get_session_for_update(&mut tx, session).await?;
        let state = current.state();

        if state.is_terminal() {
            return Err(SessionsServiceError::AlreadyTerminated(state));
        }

        if update.is_empty() {
            debug!("empty session update");

            tx.commit().await?;

            return Ok(current);
        }

        let record = self
            .sessions
            .update_session(&mut tx, session, update)
            .await?
            .ok_or(SessionsServiceError::AlreadyTerminated(state))?;

        tx.commit().await?;

        debug!(session_uuid = %session, "updated checkout session");

        Ok(record)
    }

    #[tracing::instrument(
        name = "sessions.service.terminate_session",
        skip(self, terminal),
        fields(session_uuid = %session, action = terminal.action.as_str()),
        err
    )]
    async fn terminate_session(
        &self,
        session: SessionUuid,
        terminal: TerminalUpdate,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.sessions.get_session_for_update(&mut tx, session).await?;
        let mut timeline = current.timeline();

        timeline.terminate(terminal.action, now)?;

        let record = self
            .sessions
            .terminate_session(&mut tx, session, &timeline, &terminal.customer)
            .await?
            .ok_or(SessionsServiceError::AlreadyTerminated(current.state()))?;

        self.visitors
            .backfill_contact(
                &mut tx,
                record.visitor_uuid,
                record.customer.name.as_deref(),
                record.customer.phone.as_deref(),
            )
            .await?;

        tx.commit().await?;

        info!(
            session_uuid = %session,
            state = %record.state(),
            time_spent = record.time_spent,
            "checkout session terminated"
        );

        Ok(record)
    }

    #[tracing::instrument(name = "sessions.service.list_sessions", skip(self), err)]
    async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<SessionRecord>, SessionsServiceError> {
        let filter = SessionFilter {
            limit: filter.limit.clamp(1, MAX_SESSION_LIST),
            ..filter
        };

        let mut tx = self.db.begin().await?;

        let records = self.sessions.list_sessions(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(records)
    }

    #[tracing::instrument(name = "sessions.service.session_summary", skip(self), err)]
    async fn session_summary(&self) -> Result<SessionSummary, SessionsServiceError> {
        let mut tx = self.db.begin().await?;

        let summary = self.sessions.session_summary(&mut tx).await?;

        tx.commit().await?;

        Ok(summary)
    }

    #[tracing::instrument(
        name = "sessions.service.expire_stale_sessions",
        skip(self),
        fields(expired = tracing::field::Empty),
        err
    )]
    async fn expire_stale_sessions(
        &self,
        cutoff: Timestamp,
        now: Timestamp,
    ) -> Result<u64, SessionsServiceError> {
        let mut tx = self.db.begin().await?;

        let stale = self.sessions.lock_stale_sessions(&mut tx, cutoff).await?;
        let mut expired = 0_u64;

        for session in stale {
            let mut timeline = SessionTimeline::started(session.entry_time);

            timeline.terminate(TerminalAction::End, now)?;

            let ended = self
                .sessions
                .terminate_session(&mut tx, session.uuid, &timeline, &CustomerDetails::default())
                .await?;

            if ended.is_some() {
                expired += 1;
            } else {
                warn!(session_uuid = %session.uuid, "stale session already terminated");
            }
        }

        tx.commit().await?;

        Span::current().record("expired", expired);

        info!(expired, "expired stale checkout sessions");

        Ok(expired)
    }
}

#[automock]
#[async_trait]
pub trait SessionsService: Send + Sync {
    /// Open a checkout session for an existing visitor.
    async fn create_session(
        &self,
        session: NewSession,
    ) -> Result<SessionRecord, SessionsServiceError>;

    /// Retrieve a single session.
    async fn get_session(&self, session: SessionUuid) -> Result<SessionRecord, SessionsServiceError>;

    /// Write the provided fields of an active session.
    async fn update_session(
        &self,
        session: SessionUuid,
        update: SessionUpdate,
    ) -> Result<SessionRecord, SessionsServiceError>;

    /// Complete or end an active session at `now`.
    async fn terminate_session(
        &self,
        session: SessionUuid,
        terminal: TerminalUpdate,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsServiceError>;

    /// Sessions newest first.
    async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<SessionRecord>, SessionsServiceError>;

    /// Session counts per state.
    async fn session_summary(&self) -> Result<SessionSummary, SessionsServiceError>;

    /// End every session still active and untouched since `cutoff`.
    async fn expire_stale_sessions(
        &self,
        cutoff: Timestamp,
        now: Timestamp,
    ) -> Result<u64, SessionsServiceError>;
}
