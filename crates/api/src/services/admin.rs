//! Administration service: branches, counters, staff accounts and
//! corrections.

use domain::models::{Branch, Counter, CounterOverview, CounterSession, Role, StaffUser};
use domain::QueueError;
use persistence::entities::UserRoleDb;
use persistence::repositories::{
    BranchRepository, CounterRepository, CounterSessionRepository, QueueRepository,
    UserRepository,
};
use shared::password::{check_password_policy, hash_password};
use sqlx::PgPool;
use tracing::info;

use crate::error::ApiError;
use crate::services::queue::require_positive;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503"))
}

/// Clerks must belong to a branch; admins may be global.
pub fn check_assignment(role: Role, branch_id: Option<i64>) -> Result<(), QueueError> {
    match (role, branch_id) {
        (Role::Clerk, None) => Err(QueueError::validation(
            "branchId",
            "Clerks must be assigned to a branch",
        )),
        (_, Some(id)) if id <= 0 => Err(QueueError::validation(
            "branchId",
            "branchId must be a positive integer",
        )),
        _ => Ok(()),
    }
}

fn check_password(password: &str) -> Result<(), QueueError> {
    check_password_policy(password).map_err(|e| QueueError::validation("password", e.to_string()))
}

/// Input for creating a staff account.
#[derive(Debug, Clone)]
pub struct NewStaffUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub branch_id: Option<i64>,
}

pub struct AdminService {
    branches: BranchRepository,
    counters: CounterRepository,
    sessions: CounterSessionRepository,
    users: UserRepository,
    queue: QueueRepository,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            branches: BranchRepository::new(pool.clone()),
            counters: CounterRepository::new(pool.clone()),
            sessions: CounterSessionRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            queue: QueueRepository::new(pool),
        }
    }

    // Branches

    pub async fn create_branch(&self, name: &str) -> Result<Branch, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueueError::validation("name", "Branch name is required").into());
        }

        match self.branches.create(name).await {
            Ok(branch) => {
                info!(branch_id = branch.id, name, "Branch created");
                Ok(branch.into())
            }
            Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(
                "Branch name already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_branches(&self, include_inactive: bool) -> Result<Vec<Branch>, ApiError> {
        let branches = self.branches.list(include_inactive).await?;
        Ok(branches.into_iter().map(Into::into).collect())
    }

    pub async fn set_branch_active(&self, id: i64, is_active: bool) -> Result<Branch, ApiError> {
        require_positive("branchId", id)?;

        let branch = self
            .branches
            .set_active(id, is_active)
            .await?
            .ok_or(QueueError::BranchNotFound)?;

        info!(branch_id = id, is_active, "Branch activation changed");
        Ok(branch.into())
    }

    // Counters

    pub async fn create_counter(&self, branch_id: i64, number: i32) -> Result<Counter, ApiError> {
        require_positive("branchId", branch_id)?;

        if self.branches.find_by_id(branch_id).await?.is_none() {
            return Err(QueueError::BranchNotFound.into());
        }

        match self.counters.create(branch_id, number).await {
            Ok(counter) => {
                info!(branch_id, counter_id = counter.id, number, "Counter created");
                Ok(counter.into())
            }
            Err(e) if is_unique_violation(&e) => Err(QueueError::DuplicateCounterNumber.into()),
            Err(e) if is_foreign_key_violation(&e) => Err(QueueError::BranchNotFound.into()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_counters(
        &self,
        branch_id: i64,
    ) -> Result<Vec<CounterOverview>, ApiError> {
        require_positive("branchId", branch_id)?;

        if self.branches.find_by_id(branch_id).await?.is_none() {
            return Err(QueueError::BranchNotFound.into());
        }

        let counters = self.counters.list_with_occupancy(branch_id, true).await?;
        Ok(counters.into_iter().map(Into::into).collect())
    }

    /// Deactivating a counter also closes its open session.
    pub async fn set_counter_active(&self, id: i64, is_active: bool) -> Result<Counter, ApiError> {
        require_positive("counterId", id)?;

        let counter = self
            .counters
            .set_active(id, is_active)
            .await?
            .ok_or(QueueError::CounterNotFound)?;

        if !is_active {
            if let Some(open) = self.sessions.find_open_for_counter(id).await? {
                self.sessions.end_session(open.id).await?;
                info!(
                    counter_id = id,
                    session_id = open.id,
                    user_id = open.user_id,
                    "Open session closed by counter deactivation"
                );
            }
        }

        info!(counter_id = id, is_active, "Counter activation changed");
        Ok(counter.into())
    }

    // Staff

    pub async fn create_user(&self, input: NewStaffUser) -> Result<StaffUser, ApiError> {
        check_password(&input.password)?;
        check_assignment(input.role, input.branch_id)?;

        if let Some(branch_id) = input.branch_id {
            if self.branches.find_active(branch_id).await?.is_none() {
                return Err(QueueError::BranchNotFound.into());
            }
        }

        let password_hash = hash_password(&input.password)
            .map_err(|e| ApiError::Internal(format!("Password error: {}", e)))?;

        let created = self
            .users
            .create(
                input.username.trim(),
                &password_hash,
                input.full_name.trim(),
                UserRoleDb::from(input.role),
                input.branch_id,
            )
            .await;

        match created {
            Ok(user) => {
                info!(user_id = user.id, role = %input.role, "Staff user created");
                Ok(user.into())
            }
            Err(e) if is_unique_violation(&e) => Err(QueueError::DuplicateUsername.into()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_users(&self, branch_id: Option<i64>) -> Result<Vec<StaffUser>, ApiError> {
        if let Some(id) = branch_id {
            require_positive("branchId", id)?;
        }
        let users = self.users.list(branch_id).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Deactivating a user also closes their open counter session.
    pub async fn set_user_active(
        &self,
        acting_user_id: i64,
        id: i64,
        is_active: bool,
    ) -> Result<StaffUser, ApiError> {
        require_positive("userId", id)?;

        if !is_active && acting_user_id == id {
            return Err(ApiError::Forbidden(
                "Cannot deactivate your own account".to_string(),
            ));
        }

        let user = self
            .users
            .set_active(id, is_active)
            .await?
            .ok_or(QueueError::UserNotFound)?;

        if !is_active {
            if let Some(session) = self.sessions.end_open_for_user(id).await? {
                info!(
                    user_id = id,
                    session_id = session.id,
                    "Open session closed by user deactivation"
                );
            }
        }

        info!(user_id = id, is_active, "Staff user activation changed");
        Ok(user.into())
    }

    pub async fn reset_password(&self, id: i64, password: &str) -> Result<(), ApiError> {
        require_positive("userId", id)?;
        check_password(password)?;

        let password_hash = hash_password(password)
            .map_err(|e| ApiError::Internal(format!("Password error: {}", e)))?;

        if !self.users.update_password(id, &password_hash).await? {
            return Err(QueueError::UserNotFound.into());
        }

        info!(user_id = id, "Staff password reset");
        Ok(())
    }

    pub async fn update_assignment(
        &self,
        id: i64,
        role: Role,
        branch_id: Option<i64>,
    ) -> Result<StaffUser, ApiError> {
        require_positive("userId", id)?;
        check_assignment(role, branch_id)?;

        if let Some(branch_id) = branch_id {
            if self.branches.find_active(branch_id).await?.is_none() {
                return Err(QueueError::BranchNotFound.into());
            }
        }

        let user = self
            .users
            .update_assignment(id, UserRoleDb::from(role), branch_id)
            .await?
            .ok_or(QueueError::UserNotFound)?;

        info!(user_id = id, role = %role, branch_id = ?branch_id, "Staff assignment changed");
        Ok(user.into())
    }

    // Corrections

    pub async fn delete_ticket(&self, id: i64) -> Result<(), ApiError> {
        require_positive("ticketId", id)?;

        if !self.queue.delete(id).await? {
            return Err(QueueError::TicketNotFound.into());
        }

        info!(ticket_id = id, "Ticket deleted");
        Ok(())
    }

    pub async fn force_end_session(
        &self,
        acting_user_id: i64,
        session_id: i64,
    ) -> Result<CounterSession, ApiError> {
        require_positive("sessionId", session_id)?;

        let existing = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(QueueError::SessionNotFound)?;
        if existing.end_time.is_some() {
            return Err(QueueError::SessionAlreadyEnded.into());
        }

        let ended = self
            .sessions
            .end_session(session_id)
            .await?
            .ok_or(QueueError::SessionAlreadyEnded)?;

        info!(
            session_id,
            user_id = ended.user_id,
            ended_by = acting_user_id,
            "Counter session force-ended"
        );
        Ok(ended.into())
    }
}
