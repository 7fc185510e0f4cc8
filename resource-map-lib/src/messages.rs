//! Fixed user-facing strings.

use crate::services::ServiceStatus;

pub const GEOLOCATION_UNSUPPORTED: &str = "您的瀏覽器不支持地理定位功能，請使用自訂出發地。";
pub const GEOLOCATION_FAILED: &str = "無法獲取您的當前位置，請使用自訂出發地。";
pub const ORIGIN_PROMPT: &str = "請輸入您的出發地點：";
pub const ORIGIN_MISSING: &str = "未提供出發地點，無法規劃路線。";

pub const DEPART_FROM_CURRENT: &str = "從目前位置出發";
pub const DEPART_FROM_CUSTOM: &str = "自訂出發地";

pub const SHOW_ROUTE: &str = "顯示路線";
pub const HIDE_ROUTE: &str = "隱藏路線";

const ROUTING_FAILED_PREFIX: &str = "無法規劃路線";

pub fn origin_unrecognised(origin: &str) -> String {
    format!("無法識別出發地址「{}」，請提供更精確的地址。", origin)
}

pub fn routing_failed(status: &ServiceStatus) -> String {
    let reason = match status {
        ServiceStatus::ZeroResults => "找不到可行駛的路線。",
        ServiceStatus::NotFound => "找不到起點或終點位置。",
        ServiceStatus::OverQueryLimit => "API使用超出限制，請稍後再試。",
        ServiceStatus::RequestDenied => "請求被拒絕，可能需要API金鑰。",
        ServiceStatus::InvalidRequest => "請求無效，請檢查參數。",
        other => other.code(),
    };
    format!("{}：{}", ROUTING_FAILED_PREFIX, reason)
}
