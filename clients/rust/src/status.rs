use crate::{APIResponse, BaseClient};
use reqwest::StatusCode;
use std::sync::Arc;
use studio_booking_api_structs::get_service_health;

#[derive(Clone)]
pub struct StatusClient {
    base: Arc<BaseClient>,
}

impl StatusClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn check_health(&self) -> APIResponse<get_service_health::APIResponse> {
        self.base.get("", &(), StatusCode::OK).await
    }
}
