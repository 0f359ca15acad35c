//! 记录模型
//!
//! 一行表格数据对应一条 `Record`，即一次表单提交。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// 无法识别记录时使用的标签
pub const UNKNOWN_LABEL: &str = "unknown";

/// 表格中的单元格值（与具体表格库无关）
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 转为去除首尾空白的字符串
    pub fn to_trimmed_string(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if is_integral(*f) => format!("{}", *f as i64),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }

    /// 转为整数；小数部分非零的数值视为无效
    pub fn to_integer(&self) -> Result<i64, RecordError> {
        let invalid = || RecordError::InvalidQuantity {
            value: self.to_trimmed_string(),
        };
        match self {
            Cell::Int(i) => Ok(*i),
            Cell::Float(f) if is_integral(*f) => Ok(*f as i64),
            Cell::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

/// 有限、无小数部分且在 i64 范围内
fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// 表格中的一行原始数据
pub type RawRow = Vec<Cell>;

/// 第一列为空的行视为空行，直接跳过
pub fn is_blank(row: &[Cell]) -> bool {
    row.first().map_or(true, Cell::is_empty)
}

/// 行的标识标签：第二列（商品名），否则为 "unknown"
pub fn row_label(row: &[Cell]) -> String {
    row.get(1)
        .map(Cell::to_trimmed_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// 一条待提交的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub customer: String,
    pub item: String,
    pub quantity: i64,
    /// 下拉框的 value，是否合法由目标页面决定
    pub category: String,
}

impl Record {
    /// 从原始行构建记录
    ///
    /// 只读取前四列，多余的列忽略。
    pub fn parse(row: &[Cell]) -> Result<Self, RecordError> {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();

        let customer = required_text(&cell(0), "customer")?;
        let item = required_text(&cell(1), "item")?;

        let quantity_cell = cell(2);
        if quantity_cell.to_trimmed_string().is_empty() {
            return Err(RecordError::MissingField { field: "quantity" });
        }
        let quantity = quantity_cell.to_integer()?;

        let category = required_text(&cell(3), "category")?;

        Ok(Self {
            customer,
            item,
            quantity,
            category,
        })
    }

    /// 进度消息中显示的标签
    pub fn label(&self) -> String {
        format!("{} - {}", self.customer, self.item)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.customer, self.item, self.quantity, self.category
        )
    }
}

fn required_text(cell: &Cell, field: &'static str) -> Result<String, RecordError> {
    let value = cell.to_trimmed_string();
    if value.is_empty() {
        return Err(RecordError::MissingField { field });
    }
    Ok(value)
}
