//! Role and store-scoped authorization
//!
//! Every handler asks a single question through [`authorize`]: may this user
//! perform this action on this scope?

use hr_core::error::HrError;
use hr_core::traits::Id;
use hr_models::Role;

// ============================================================================
// Actions and scopes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewExpenses,
    SubmitExpense,
    ViewPayslip,
    ManagePayroll,
    ViewAttendance,
    RecordAttendance,
    ViewStoreSettings,
    ManageHolidays,
    ManageCalendar,
    ViewProfile,
    EditProfile,
    ManageEmployment,
    ApplyLeave,
    ReviewLeave,
    RequestOvertime,
    ReviewOvertime,
}

impl Action {
    /// Actions an employee may take on their own records
    fn is_self_service(&self) -> bool {
        matches!(
            self,
            Action::ViewExpenses
                | Action::SubmitExpense
                | Action::ViewPayslip
                | Action::ViewAttendance
                | Action::RecordAttendance
                | Action::ViewProfile
                | Action::EditProfile
                | Action::ApplyLeave
                | Action::RequestOvertime
        )
    }

    /// Actions an hr_coordinator may take for anyone in their store
    fn is_coordinator_action(&self) -> bool {
        matches!(
            self,
            Action::ViewExpenses
                | Action::ViewAttendance
                | Action::RecordAttendance
                | Action::ViewStoreSettings
                | Action::ManageCalendar
                | Action::ViewProfile
                | Action::ReviewLeave
                | Action::ReviewOvertime
        )
    }

    /// Actions that approve or pay out, never allowed on one's own records
    fn is_sign_off(&self) -> bool {
        matches!(
            self,
            Action::ReviewLeave | Action::ReviewOvertime | Action::ManagePayroll
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewExpenses => "view expenses",
            Action::SubmitExpense => "submit expenses",
            Action::ViewPayslip => "view payslips",
            Action::ManagePayroll => "manage payroll",
            Action::ViewAttendance => "view attendance",
            Action::RecordAttendance => "record attendance",
            Action::ViewStoreSettings => "view store settings",
            Action::ManageHolidays => "manage holidays",
            Action::ManageCalendar => "manage the calendar",
            Action::ViewProfile => "view profiles",
            Action::EditProfile => "edit profiles",
            Action::ManageEmployment => "change role, store or salary",
            Action::ApplyLeave => "apply for leave",
            Action::ReviewLeave => "review leave",
            Action::RequestOvertime => "request overtime",
            Action::ReviewOvertime => "review overtime",
        }
    }
}

/// What an action is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every store at once
    Global,
    Store(Id),
    /// One employee's records
    Employee { user_id: Id, store_id: Option<Id> },
}

// ============================================================================
// User Context
// ============================================================================

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Id,
    pub role: Role,
    pub store_id: Option<Id>,
}

impl CurrentUser {
    pub fn new(id: Id, role: Role, store_id: Option<Id>) -> Self {
        Self { id, role, store_id }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// HR or MD
    pub fn is_admin(&self) -> bool {
        self.role.is_global()
    }

    fn in_store(&self, store_id: Option<Id>) -> bool {
        store_id.is_some() && self.store_id == store_id
    }

    /// Scope of the caller's own records
    pub fn own_scope(&self) -> Scope {
        Scope::Employee {
            user_id: self.id,
            store_id: self.store_id,
        }
    }

    pub fn can(&self, action: Action, scope: Scope) -> bool {
        if self.role.is_global() {
            return true;
        }

        let (own, store) = match scope {
            Scope::Global => return false,
            Scope::Store(store_id) => (false, Some(store_id)),
            Scope::Employee { user_id, store_id } => (user_id == self.id, store_id),
        };

        if own {
            // Nobody below HR/MD signs off their own requests
            if action.is_sign_off() {
                return false;
            }
            if action.is_self_service() {
                return true;
            }
        }

        if !self.in_store(store) {
            return false;
        }

        match self.role {
            Role::StoreDirector => true,
            Role::HrCoordinator => action.is_coordinator_action(),
            Role::Employee => action == Action::ViewStoreSettings,
            Role::Hr | Role::Md => true,
        }
    }
}

/// The authorization guard
pub fn authorize(user: &CurrentUser, action: Action, scope: Scope) -> Result<(), HrError> {
    if user.can(action, scope) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = user.id,
            role = %user.role,
            action = action.as_str(),
            ?scope,
            "authorization denied"
        );
        Err(HrError::forbidden(format!(
            "not allowed to {}",
            action.as_str()
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
