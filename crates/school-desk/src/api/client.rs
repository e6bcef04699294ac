use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::error::ApiError;
use super::models::{
    BulkCreateReceipt, BulkStudentsRequest, Campus, CheckExistingRequest, CreateResultsRequest,
    Envelope, ErrorBody, ExistingCount, LoginResponse, ParentCredentials, Student, Subject,
    UserCredentials,
};
use crate::config::ApiConfig;
use crate::ingest::dates::canonical;
use crate::ingest::StudentRecord;
use crate::scoring::{Report, Solution, TestResult};
use crate::session::{LoginType, Role, Session, SessionStore};
use crate::submission::{GatewayError, ResultKey, ResultsGateway, SubmissionReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Anonymous,
    Bearer,
}

/// Typed client for the dashboard REST API.
///
/// Every request goes through [`ApiClient::execute`], which attaches the bearer token and clears
/// the stored session when the server answers 401.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ApiConfig, sessions: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            sessions,
        })
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    fn url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))
    }

    /// Send one request and decode the body as `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let request = match auth {
            Auth::Anonymous => request,
            Auth::Bearer => request.header(AUTHORIZATION, self.sessions.require()?.bearer()),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "api response");

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            warn!(endpoint, "session rejected by server, clearing stored session");
            self.sessions.clear()?;
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|payload| payload.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| {
                    format!("{endpoint} failed with status {}", status.as_u16())
                });
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.url(endpoint)?).query(query);
        let envelope: Envelope<T> = self.execute(endpoint, request, Auth::Bearer).await?;
        Ok(envelope.data)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn students(&self) -> Result<Vec<Student>, ApiError> {
        self.get_data("/api/getstudents", &[]).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn campuses(&self) -> Result<Vec<Campus>, ApiError> {
        self.get_data("/api/getcampuses", &[]).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.get_data("/api/getsubjects", &[]).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn solution_bank(&self, test_name: &str) -> Result<Vec<Solution>, ApiError> {
        self.get_data(
            "/api/getsolutionbank",
            &[("testName", test_name.to_string())],
        )
        .await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn report_bank(
        &self,
        test_name: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Report>, ApiError> {
        let mut query = vec![("testName", test_name.to_string())];
        if let Some(from) = from {
            query.push(("fromDate", canonical(from)));
        }
        if let Some(to) = to {
            query.push(("toDate", canonical(to)));
        }

        let mut reports: Vec<Report> = self.get_data("/api/getreportbank", &query).await?;
        for report in reports.iter_mut().filter(|report| report.test_name.is_empty()) {
            report.test_name = test_name.to_string();
        }
        Ok(reports)
    }

    pub async fn check_existing_results(&self, keys: &[ResultKey]) -> Result<usize, ApiError> {
        let endpoint = "/api/checkexistingtestresults";
        let request = self
            .http
            .post(self.url(endpoint)?)
            .json(&CheckExistingRequest { results: keys });
        let envelope: Envelope<ExistingCount> =
            self.execute(endpoint, request, Auth::Bearer).await?;
        Ok(envelope.data.existing_count)
    }

    pub async fn create_test_results(
        &self,
        results: &[TestResult],
    ) -> Result<SubmissionReceipt, ApiError> {
        let endpoint = "/api/createtestresults";
        let request = self
            .http
            .post(self.url(endpoint)?)
            .json(&CreateResultsRequest { results });
        let envelope: Envelope<SubmissionReceipt> =
            self.execute(endpoint, request, Auth::Bearer).await?;
        Ok(envelope.data)
    }

    pub async fn bulk_create_students(
        &self,
        students: &[StudentRecord],
    ) -> Result<BulkCreateReceipt, ApiError> {
        let endpoint = "/api/bulkcreatestudents";
        let request = self
            .http
            .post(self.url(endpoint)?)
            .json(&BulkStudentsRequest { students });
        let envelope: Envelope<BulkCreateReceipt> =
            self.execute(endpoint, request, Auth::Bearer).await?;
        Ok(envelope.data)
    }

    /// Staff and admin sign-in. The new session replaces any stored one.
    pub async fn login_user(&self, credentials: &UserCredentials) -> Result<Session, ApiError> {
        let endpoint = "/api/user/login";
        let request = self.http.post(self.url(endpoint)?).json(credentials);
        let response: LoginResponse = self.execute(endpoint, request, Auth::Anonymous).await?;
        self.store_login(response, LoginType::User, None)
    }

    /// Parent sign-in by the child's registration number.
    pub async fn login_parent(
        &self,
        credentials: &ParentCredentials,
    ) -> Result<Session, ApiError> {
        let endpoint = "/api/parent/login";
        let request = self.http.post(self.url(endpoint)?).json(credentials);
        let response: LoginResponse = self.execute(endpoint, request, Auth::Anonymous).await?;
        self.store_login(
            response,
            LoginType::Parent,
            Some(credentials.reg_number.clone()),
        )
    }

    fn store_login(
        &self,
        response: LoginResponse,
        login_type: LoginType,
        reg_number: Option<String>,
    ) -> Result<Session, ApiError> {
        let role = Role::parse(&response.role).ok_or(ApiError::UnknownRole(response.role))?;
        let session = Session {
            token: response.token,
            role,
            login_type,
            reg_number: response.reg_number.or(reg_number),
            student_data: response.student_data,
        };
        self.sessions.save(&session)?;
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.sessions.clear()?;
        Ok(())
    }
}

#[async_trait]
impl ResultsGateway for ApiClient {
    async fn count_existing(&self, keys: &[ResultKey]) -> Result<usize, GatewayError> {
        self.check_existing_results(keys)
            .await
            .map_err(gateway_error)
    }

    async fn submit(&self, results: &[TestResult]) -> Result<SubmissionReceipt, GatewayError> {
        self.create_test_results(results)
            .await
            .map_err(gateway_error)
    }
}

fn gateway_error(err: ApiError) -> GatewayError {
    match err {
        ApiError::Status { message, .. } => GatewayError::Rejected(message),
        expired @ ApiError::SessionExpired => GatewayError::Rejected(expired.to_string()),
        other => GatewayError::Unavailable(other.to_string()),
    }
}
