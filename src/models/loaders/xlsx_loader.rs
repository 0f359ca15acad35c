use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info};

use crate::error::SourceError;
use crate::models::loaders::RecordSource;
use crate::models::record::{Cell, RawRow};

/// 从 Excel 工作簿读取原始行
///
/// 只读取第一个工作表，表头行原样返回，由批处理器负责跳过。
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for XlsxSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, SourceError> {
        let path_str = self.path.display().to_string();
        info!("📁 正在读取表格: {}", path_str);

        let mut workbook = open_workbook_auto(&self.path).map_err(|e| SourceError::Open {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SourceError::NoSheet {
                path: path_str.clone(),
            })?;
        debug!("使用工作表: {}", sheet_name);

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SourceError::Sheet {
                sheet: sheet_name.clone(),
                reason: e.to_string(),
            })?;

        let rows: Vec<RawRow> = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        info!("✓ 读取到 {} 行（含表头）", rows.len());
        Ok(rows)
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}
