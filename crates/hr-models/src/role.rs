//! Role names gating every permission check

text_enum! {
    /// Role assigned to a user account
    pub enum Role {
        Hr => "HR",
        Md => "MD",
        StoreDirector => "store_director",
        HrCoordinator => "hr_coordinator",
        Employee => "employee",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

impl Role {
    /// HR and MD act across every store
    pub fn is_global(&self) -> bool {
        matches!(self, Role::Hr | Role::Md)
    }

    /// Roles that manage other employees within a store
    pub fn is_store_manager(&self) -> bool {
        matches!(self, Role::StoreDirector | Role::HrCoordinator)
    }
}
