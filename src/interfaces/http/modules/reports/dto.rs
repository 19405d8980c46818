//! Report DTOs

use serde::Deserialize;
use validator::Validate;

use crate::domain::{NewReport, ReportType};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 64, message = "parking_lot_id is required"))]
    pub parking_lot_id: String,
    pub report_type: ReportType,
    #[validate(length(min = 10, max = 1000, message = "description must be 10–1000 characters"))]
    pub description: String,
    #[serde(default)]
    pub update_spot_status: bool,
}

impl From<CreateReportRequest> for NewReport {
    fn from(r: CreateReportRequest) -> Self {
        Self {
            user_id: r.user_id,
            parking_lot_id: r.parking_lot_id,
            report_type: r.report_type,
            description: r.description,
            update_spot_status: r.update_spot_status,
        }
    }
}
