/// Domain models and their database operations
///
/// Each model owns its table: the struct mirrors the row, and associated
/// functions cover the queries the API needs. Workflow operations that span
/// tables (shift assignment, application review) live with the model that
/// anchors them.
pub mod application;
pub mod event;
pub mod role;
pub mod shift;
pub mod user;

pub use application::{
    ApplicationError, ApplicationStatus, ApplyToShift, ReviewDecision, ShiftApplication,
};
pub use event::{CreateEvent, Event, EventFilter, EventStats, EventStatus, SortOrder, UpdateEvent};
pub use role::{Role, RoleName, UnknownRole};
pub use shift::{
    CreateShift, Shift, ShiftFilter, ShiftStats, ShiftStatus, ShiftWorkflowError, UpdateShift,
    ASSIGNED_ELSEWHERE_NOTE,
};
pub use user::{CreateUser, UpdateUser, User};

use serde::{Deserialize, Serialize};

/// One page of a paginated listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page
    pub data: Vec<T>,

    /// Total rows matching the filter
    pub total: i64,

    /// 1-based page number
    pub page: u32,

    /// Last page number for this total and page size (at least 1)
    pub last_page: u32,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let last_page = if total <= 0 {
            1
        } else {
            ((total as u64).div_ceil(limit.max(1) as u64)) as u32
        };

        Self {
            data,
            total,
            page,
            last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 25, 1, 10);
        assert_eq!(page.last_page, 3);

        let page: Page<u8> = Page::new(vec![], 30, 1, 10);
        assert_eq!(page.last_page, 3);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page: Page<u8> = Page::new(vec![], 0, 1, 10);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.total, 0);
    }
}
