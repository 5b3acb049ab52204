pub mod aggregate;
pub mod audit;
pub mod error;
pub mod model;
pub mod page;
pub mod recommend;
pub mod report;
pub mod score;

pub use audit::{
    AuditConfig, audit, audit_with_config, audit_with_progress, try_audit, validate_url,
};
pub use error::{AuditError, Result};
pub use model::{AuditDetails, AuditReport, CheckStatus, Priority, Recommendation, Severity};
pub use report::{ReportFormat, render_report, save_report};
pub use seoscope_scanner::{CrawlEvent, CrawlEventCallback};
