use crate::core::walk::cell_text;
use crate::domain::model::{InspectionRow, WalkTrace};
use crate::domain::ports::Storage;
use crate::utils::error::{ResolverError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DOT_FILE: &str = "walk.dot";
pub const INSPECTION_FILE: &str = "inspection.csv";
pub const TRACE_FILE: &str = "walk.json";

/// 檢查表輸出為 CSV：hop,coord,lawfulness,score
pub fn inspection_csv(rows: &[InspectionRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["hop", "coord", "lawfulness", "score"])?;
    for row in rows {
        writer.write_record([
            row.hop.to_string(),
            row.coord.clone(),
            cell_text(&row.lawfulness),
            cell_text(&row.score),
        ])?;
    }
    let data = writer.into_inner().map_err(|e| ResolverError::IoError(e.into_error()))?;
    String::from_utf8(data).map_err(|e| ResolverError::ValidationError {
        message: format!("Inspection table is not valid UTF-8: {}", e),
    })
}

/// walk.json 的外層：附上匯出時間
#[derive(Debug, Serialize)]
struct ExportedWalk<'a> {
    exported_at: DateTime<Utc>,
    trace: &'a WalkTrace,
}

/// 將遊走結果寫成 DOT、CSV 與 JSON 三個檔案
pub struct WalkExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> WalkExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn export(&self, trace: &WalkTrace) -> Result<Vec<&'static str>> {
        tracing::debug!("💾 Writing walk artifacts for {}", trace.start);

        self.storage
            .write_file(DOT_FILE, trace.to_dot().as_bytes())
            .await?;

        let csv_output = inspection_csv(&trace.inspection)?;
        self.storage
            .write_file(INSPECTION_FILE, csv_output.as_bytes())
            .await?;

        let json_data = serde_json::to_string_pretty(&ExportedWalk {
            exported_at: Utc::now(),
            trace,
        })?;
        self.storage
            .write_file(TRACE_FILE, json_data.as_bytes())
            .await?;

        Ok(vec![DOT_FILE, INSPECTION_FILE, TRACE_FILE])
    }
}
