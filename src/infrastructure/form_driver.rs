//! 表单驱动能力接口
//!
//! 批处理器只依赖这个 trait，不认识任何具体的浏览器自动化库。

use async_trait::async_trait;

use crate::error::DriverError;

/// 驱动目标表单的能力
///
/// 每个操作都会等待到完成或超时。一次 `run` 期间由批处理器独占。
#[async_trait]
pub trait FormDriver: Send {
    /// 打开目标页面
    async fn navigate_to_form(&mut self, url: &str) -> Result<(), DriverError>;

    /// 重置表单状态，失败不影响当前记录
    async fn clear_form(&mut self) -> Result<(), DriverError>;

    /// 填写文本输入框
    async fn fill_text(&mut self, field_id: &str, value: &str) -> Result<(), DriverError>;

    /// 按 option 的 value（而非显示文本）选择下拉项
    async fn select_option(&mut self, field_id: &str, value: &str) -> Result<(), DriverError>;

    /// 点击保存
    async fn submit(&mut self) -> Result<(), DriverError>;

    /// 释放底层会话，可重复调用
    async fn release(&mut self);
}

#[async_trait]
impl<D: FormDriver + ?Sized> FormDriver for Box<D> {
    async fn navigate_to_form(&mut self, url: &str) -> Result<(), DriverError> {
        (**self).navigate_to_form(url).await
    }

    async fn clear_form(&mut self) -> Result<(), DriverError> {
        (**self).clear_form().await
    }

    async fn fill_text(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
        (**self).fill_text(field_id, value).await
    }

    async fn select_option(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
        (**self).select_option(field_id, value).await
    }

    async fn submit(&mut self) -> Result<(), DriverError> {
        (**self).submit().await
    }

    async fn release(&mut self) {
        (**self).release().await
    }
}
