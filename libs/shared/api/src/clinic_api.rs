use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentDraft, AppointmentQuery, AppointmentStatus, AppError, AppResult,
    Doctor, DoctorQuery, Service, UpdateStatusRequest,
};

use crate::ports::{AppointmentGateway, DoctorDirectory, ServiceCatalog};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// HTTP client for the clinic REST backend.
///
/// Built once from [`AppConfig`] and handed to the cells behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ClinicApiClient {
    client: Client,
    base_url: String,
}

impl ClinicApiClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        if !config.is_configured() {
            return Err(AppError::Configuration(format!(
                "clinic API base URL must be an absolute http(s) URL, got {:?}",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_headers(&self, idempotency_key: Option<&str>) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = idempotency_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| AppError::Validation(format!("invalid idempotency key: {key:?}")))?;
            headers.insert(HeaderName::from_static(IDEMPOTENCY_KEY_HEADER), value);
        }

        Ok(headers)
    }

    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency_key: Option<&str>,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(idempotency_key)?;

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(AppError::from_status(status.as_u16(), text));
        }

        let data = serde_json::from_str::<T>(&text)?;
        Ok(data)
    }
}

/// Appends percent-encoded `params` to `path`, omitting the `?` when there are none.
fn with_query<V: AsRef<str>>(path: &str, params: &[(&str, V)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query = params
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value.as_ref())))
        .collect::<Vec<_>>()
        .join("&");

    format!("{path}?{query}")
}

fn appointment_path(id: &str) -> String {
    format!("/appointments/{}", urlencoding::encode(id))
}

#[async_trait]
impl DoctorDirectory for ClinicApiClient {
    async fn list_doctors(&self, query: &DoctorQuery) -> AppResult<Vec<Doctor>> {
        let path = with_query("/doctors", &query.params());
        self.request::<Vec<Doctor>, ()>(Method::GET, &path, None, None)
            .await
    }
}

#[async_trait]
impl ServiceCatalog for ClinicApiClient {
    async fn list_services(&self) -> AppResult<Vec<Service>> {
        self.request::<Vec<Service>, ()>(Method::GET, "/services", None, None)
            .await
    }
}

#[async_trait]
impl AppointmentGateway for ClinicApiClient {
    async fn create_appointment(
        &self,
        draft: &AppointmentDraft,
        idempotency_key: Option<&str>,
    ) -> AppResult<Appointment> {
        self.request(Method::POST, "/appointments", Some(draft), idempotency_key)
            .await
    }

    async fn list_appointments(&self, query: &AppointmentQuery) -> AppResult<Vec<Appointment>> {
        let path = with_query("/appointments", &query.params());
        self.request::<Vec<Appointment>, ()>(Method::GET, &path, None, None)
            .await
    }

    async fn get_appointment(&self, id: &str) -> AppResult<Appointment> {
        self.request::<Appointment, ()>(Method::GET, &appointment_path(id), None, None)
            .await
    }

    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let body = UpdateStatusRequest { status };
        self.request(Method::PATCH, &appointment_path(id), Some(&body), None)
            .await
    }
}
