use datalist_core::{ParamMap, Paginator};
use datalist_frame::FrameRow;

#[derive(Debug)]
pub struct ListOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<FrameRow>,
    pub paginator: Paginator,
    pub order: Option<String>,
    /// Active filters as shown by their controls.
    pub filters: Vec<(String, String)>,
    /// Parameters that reproduce this page.
    pub outbound: ParamMap,
}

#[derive(Debug)]
pub struct ColumnInfoRow {
    pub column: String,
    pub order_name: String,
}
