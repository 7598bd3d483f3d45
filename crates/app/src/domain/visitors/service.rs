//! Visitors Service

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::visitors::{
        VisitorsServiceError,
        data::VisitorContact,
        records::{VisitorLookup, VisitorRecord, VisitorUuid},
        repository::PgVisitorsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgVisitorsService {
    db: Db,
    repository: PgVisitorsRepository,
}

impl PgVisitorsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgVisitorsRepository::new(),
        }
    }
}

#[async_trait]
impl VisitorsService for PgVisitorsService {
    #[tracing::instrument(
        name = "visitors.service.get_or_create",
        skip(self, token),
        fields(visitor_uuid = tracing::field::Empty, is_new = tracing::field::Empty),
        err
    )]
    async fn get_or_create(
        &self,
        token: Option<String>,
    ) -> Result<VisitorLookup, VisitorsServiceError> {
        let token = token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let mut tx = self.db.begin().await?;

        let existing = match token.as_deref() {
            Some(token) => self.repository.find_by_token(&mut tx, token).await?,
            None => None,
        };

        let lookup = match existing {
            Some(visitor) => VisitorLookup {
                visitor,
                is_new: false,
            },
            None => VisitorLookup {
                visitor: self
                    .repository
                    .create_visitor(&mut tx, VisitorUuid::new())
                    .await?,
                is_new: true,
            },
        };

        tx.commit().await?;

        let span = Span::current();

        span.record("visitor_uuid", tracing::field::display(lookup.visitor.uuid));
        span.record("is_new", lookup.is_new);

        if lookup.is_new {
            info!(
                visitor_uuid = %lookup.visitor.uuid,
                token = %lookup.visitor.token,
                "created visitor"
            );
        }

        Ok(lookup)
    }

    #[tracing::instrument(name = "visitors.service.get_by_token", skip(self), err)]
    async fn get_by_token(&self, token: String) -> Result<VisitorRecord, VisitorsServiceError> {
        let mut tx = self.db.begin().await?;

        let visitor = self
            .repository
            .find_by_token(&mut tx, token.trim())
            .await?
            .ok_or(VisitorsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(visitor)
    }

    #[tracing::instrument(name = "visitors.service.update_visitor", skip(self, contact), err)]
    async fn update_visitor(
        &self,
        token: String,
        contact: VisitorContact,
    ) -> Result<VisitorRecord, VisitorsServiceError> {
        let mut tx = self.db.begin().await?;

        let visitor = self
            .repository
            .update_visitor(&mut tx, token.trim(), contact)
            .await?;

        tx.commit().await?;

        info!(visitor_uuid = %visitor.uuid, "updated visitor");

        Ok(visitor)
    }
}

#[automock]
#[async_trait]
pub trait VisitorsService: Send + Sync {
    /// Return the visitor holding `token`, or mint a new one with the next serial.
    async fn get_or_create(
        &self,
        token: Option<String>,
    ) -> Result<VisitorLookup, VisitorsServiceError>;

    /// Retrieve a visitor by token.
    async fn get_by_token(&self, token: String) -> Result<VisitorRecord, VisitorsServiceError>;

    /// Overwrite contact fields that carry a non-blank value.
    async fn update_visitor(
        &self,
        token: String,
        contact: VisitorContact,
    ) -> Result<VisitorRecord, VisitorsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn new_visitors_get_sequential_serials() -> TestResult {
        let ctx = TestContext::new().await;

        let first = ctx.visitors.get_or_create(None).await?;
        let second = ctx.visitors.get_or_create(None).await?;

        assert!(first.is_new);
        assert!(second.is_new);
        assert_eq!(second.visitor.serial, first.visitor.serial + 1);
        assert_eq!(first.visitor.token, format!("Visitor-{}", first.visitor.serial));

        Ok(())
    }

    #[tokio::test]
    async fn known_token_returns_existing_visitor() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.visitors.get_or_create(None).await?;
        let again = ctx
            .visitors
            .get_or_create(Some(format!(" {} ", created.visitor.token)))
            .await?;

        assert!(!again.is_new);
        assert_eq!(again.visitor, created.visitor);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_mints_a_new_visitor() -> TestResult {
        let ctx = TestContext::new().await;

        let lookup = ctx
            .visitors
            .get_or_create(Some("Visitor-9999".to_string()))
            .await?;

        assert!(lookup.is_new);
        assert_ne!(lookup.visitor.token, "Visitor-9999");

        Ok(())
    }

    #[tokio::test]
    async fn update_ignores_blank_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let lookup = ctx.visitors.get_or_create(None).await?;
        let token = lookup.visitor.token;

        ctx.visitors
            .update_visitor(
                token.clone(),
                VisitorContact {
                    name: Some("Karim".to_string()),
                    phone: Some("01700000000".to_string()),
                    email: None,
                },
            )
            .await?;

        let updated = ctx
            .visitors
            .update_visitor(
                token,
                VisitorContact {
                    name: Some("  ".to_string()),
                    phone: Some("01900000000".to_string()),
                    email: Some("karim@example.com".to_string()),
                },
            )
            .await?;

        assert_eq!(updated.name.as_deref(), Some("Karim"));
        assert_eq!(updated.phone.as_deref(), Some("01900000000"));
        assert_eq!(updated.email.as_deref(), Some("karim@example.com"));

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_token_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.visitors.get_by_token("Visitor-0".to_string()).await;

        assert!(
            matches!(result, Err(VisitorsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
